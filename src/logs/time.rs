//! Resolution of human time expressions into epoch milliseconds.
//!
//! Accepts either a relative expression such as `5m ago`, `2 hours` or `1week ago`,
//! or an absolute date/time. A bare time of day such as `10:30` means today in UTC,
//! and an all-digit value is a compact date (`20240301`), never epoch seconds.
//! Relative units are keyed on their first letter only,
//! so `m`, `minute` and `minutes` are interchangeable.
//!
//! Results are whole seconds scaled to milliseconds; sub-second precision is dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::error::LogsError;

const ONE_MINUTE: i64 = 60;
const ONE_HOUR: i64 = 60 * ONE_MINUTE;
const ONE_DAY: i64 = 24 * ONE_HOUR;
const ONE_WEEK: i64 = 7 * ONE_DAY;

const TIME_AGO_PATTERN: &str =
    r"^(\d+)\s?(m|minute|minutes|h|hour|hours|d|day|days|w|week|weeks)(\s?ago)?$";

static TIME_AGO: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(TIME_AGO_PATTERN).expect("relative time pattern compiles")
});

/// Formats tried, in order, for date-times carrying a numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%d %H:%M %z",
];

/// Formats tried for naive date-times, which are taken to be UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%d%H%M%S",
    "%Y%m%dT%H%M",
    "%Y%m%d%H%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%b %d, %Y %H:%M:%S",
    "%b %d, %Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
];

/// Formats tried for bare dates, resolved to midnight UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Formats tried for a time of day, placed on the current UTC date.
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Resolves `expression` against the current wall-clock time.
///
/// Each call captures "now" independently; a start and an end bound resolved
/// for the same request may therefore differ by the time between the calls.
pub fn resolve_now(expression: Option<&str>) -> Result<Option<i64>, LogsError> {
    resolve(expression, Utc::now())
}

/// Resolves a time expression into epoch milliseconds.
///
/// # Arguments
/// * `expression` - `None` for no bound, a relative expression, or an absolute date
/// * `now` - The instant relative expressions are measured back from
///
/// # Returns
/// `Ok(None)` when no expression was given, otherwise the instant in whole
/// seconds multiplied by 1000.
///
/// # Errors
/// Returns [`LogsError::InvalidTimeExpression`] when the expression matches
/// neither the relative grammar nor any supported date format.
pub fn resolve(expression: Option<&str>, now: DateTime<Utc>) -> Result<Option<i64>, LogsError> {
    let Some(raw) = expression else {
        return Ok(None);
    };

    let text = raw.trim();
    let instant = match parse_relative(text, now)? {
        Some(instant) => instant,
        None => parse_absolute(text, now)
            .ok_or_else(|| LogsError::InvalidTimeExpression(raw.to_string()))?,
    };

    Ok(Some(epoch_millis(instant)))
}

/// Whole seconds since the epoch, truncated toward zero, scaled to milliseconds.
fn epoch_millis(instant: DateTime<Utc>) -> i64 {
    let secs = instant.timestamp();
    let whole = if secs < 0 && instant.timestamp_subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    };
    whole * 1000
}

/// Parses `<n><unit>[ ago]`. Returns `Ok(None)` if the text is not relative.
fn parse_relative(text: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, LogsError> {
    let Some(captures) = TIME_AGO.captures(text) else {
        return Ok(None);
    };

    let invalid = || LogsError::InvalidTimeExpression(text.to_string());

    let amount: i64 = captures[1].parse().map_err(|_| invalid())?;
    let unit_seconds = match captures[2].chars().next() {
        Some('m') => ONE_MINUTE,
        Some('h') => ONE_HOUR,
        Some('d') => ONE_DAY,
        Some('w') => ONE_WEEK,
        _ => return Err(invalid()),
    };

    let offset = amount
        .checked_mul(unit_seconds)
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(invalid)?;

    now.checked_sub_signed(offset).map(Some).ok_or_else(invalid)
}

/// Parses an absolute date/time. Offsets are normalized to UTC; naive values are UTC already.
fn parse_absolute(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = strip_utc_suffix(text);
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(naive, format) {
            return Some(now.date_naive().and_time(time).and_utc());
        }
    }

    None
}

fn strip_utc_suffix(text: &str) -> &str {
    text.strip_suffix(" UTC")
        .or_else(|| text.strip_suffix("UTC"))
        .or_else(|| text.strip_suffix('Z'))
        .unwrap_or(text)
        .trim_end()
}
