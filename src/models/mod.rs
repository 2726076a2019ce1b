//! ECS resource models.
//!
//! Plain, serializable snapshots of the SDK's describe responses. Each model
//! knows which of its fields make up its table view via [`Tabular`].

pub mod cluster;
pub mod instance;
pub mod service;
pub mod task;
pub mod task_definition;

use aws_sdk_ecs::primitives::DateTime as SdkDateTime;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

pub use cluster::Cluster;
pub use instance::Instance;
pub use service::{Deployment, Service, ServiceEvent};
pub use task::{Container, Task};
pub use task_definition::{ContainerDefinition, LogConfiguration, LogTarget, TaskDefinition};

/// Display format used for date-times in tables.
pub const TABLE_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A model that can be rendered as one row of a table.
pub trait Tabular {
    /// Field names shown as columns, in order.
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per entry in [`Tabular::COLUMNS`].
    fn row(&self) -> Vec<String>;
}

/// Last path segment of an ARN, e.g. the task id of a task ARN.
pub fn arn_id(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

/// Converts an SDK timestamp to a chrono UTC date-time.
pub fn to_chrono(dt: &SdkDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
}

/// Renders an optional date-time for a table cell.
pub fn date_cell(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format(TABLE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Renders an optional value for a table cell.
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Sorts `items` descending by the named column.
///
/// Cells that both parse as integers compare numerically; everything else
/// compares as text. Empty cells sort last.
///
/// # Errors
/// Returns an error naming the valid columns if `column` is unknown.
pub fn sort_by_column<T: Tabular>(items: &mut [T], column: &str) -> anyhow::Result<()> {
    let index = T::COLUMNS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(column))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown sort column '{column}'. Expected one of: {}",
                T::COLUMNS.join(", ")
            )
        })?;

    let mut keyed: Vec<(String, usize)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.row().swap_remove(index), i))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_cells(b, a));

    let order: Vec<usize> = keyed.into_iter().map(|(_, i)| i).collect();
    apply_order(items, &order);
    Ok(())
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Permutes `items` in place so that position `i` holds the element previously at `order[i]`.
fn apply_order<T>(items: &mut [T], order: &[usize]) {
    let mut placed = vec![false; items.len()];
    for start in 0..items.len() {
        if placed[start] {
            continue;
        }
        let mut current = start;
        loop {
            placed[current] = true;
            let source = order[current];
            if source == start {
                break;
            }
            items.swap(current, source);
            current = source;
        }
    }
}
