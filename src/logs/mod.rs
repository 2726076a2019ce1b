//! Log retrieval engine.
//!
//! Turns a log group, a set of streams and an optional time window into a lazy,
//! de-duplicated sequence of [`LogEvent`]s, optionally polling for new events
//! forever ("tail" mode).
//!
//! The engine is a pull-based state machine:
//! - [`time`] resolves start/end expressions once per request
//! - [`paginator::EventPaginator`] follows continuation cursors
//! - [`dedup::DedupWindow`] suppresses events repeated across pages
//! - [`tail::TailScheduler`] ends the stream or sleeps and re-polls
//!
//! Nothing runs in the background. Dropping a [`LogStream`] (or the future
//! returned by [`LogStream::next`]) cancels any in-flight query or sleep.

pub mod cloudwatch;
pub mod dedup;
pub mod error;
pub mod event;
pub mod paginator;
pub mod tail;
pub mod time;

use futures::Stream;
use std::collections::VecDeque;
use std::time::Duration;

pub use cloudwatch::CloudWatchLogQuery;
pub use dedup::{DedupWindow, MAX_EVENTS_PER_CALL};
pub use error::LogsError;
pub use event::LogEvent;
pub use paginator::{EventPaginator, LogPage, LogQuery, LogQueryRequest, PageOutcome};
pub use tail::{Sleeper, TailScheduler, TailState, TokioSleeper, DEFAULT_TAIL_INTERVAL};

/// Tunables for one log stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStreamOptions {
    /// Keep polling after the window is exhausted
    pub tail: bool,
    /// Delay between polls in tail mode
    pub tail_interval: Duration,
    /// Number of recent event ids remembered for de-duplication
    pub dedup_capacity: usize,
}

impl Default for LogStreamOptions {
    fn default() -> Self {
        Self {
            tail: false,
            tail_interval: DEFAULT_TAIL_INTERVAL,
            dedup_capacity: MAX_EVENTS_PER_CALL,
        }
    }
}

impl LogStreamOptions {
    pub fn tail(mut self, tail: bool) -> Self {
        self.tail = tail;
        self
    }
}

/// Starts a log stream request.
///
/// Both bounds are resolved up front, each against its own reading of the
/// clock, so an invalid expression fails before any query is issued.
///
/// # Arguments
/// * `client` - Log query API, owned by the returned stream
/// * `group` - Log group name
/// * `streams` - Stream names within the group
/// * `start` / `end` - Optional time expressions ("5m ago", ISO-8601, ...)
/// * `options` - Tail flag, poll interval and de-duplication capacity
///
/// # Errors
/// Returns [`LogsError::InvalidTimeExpression`] if either bound cannot be parsed.
pub fn query_logs<Q: LogQuery>(
    client: Q,
    group: &str,
    streams: Vec<String>,
    start: Option<&str>,
    end: Option<&str>,
    options: LogStreamOptions,
) -> Result<LogStream<Q, TokioSleeper>, LogsError> {
    let start = time::resolve_now(start)?;
    let end = time::resolve_now(end)?;

    tracing::debug!(group, ?start, ?end, tail = options.tail, "Resolved log window");

    Ok(LogStream::new(
        EventPaginator::new(client, group, streams, start, end),
        TokioSleeper,
        &options,
    ))
}

/// Lazy, de-duplicated sequence of log events for one request.
///
/// Finite and single-pass without tail mode; unbounded with it. After a
/// query error the error is yielded once and the stream ends.
pub struct LogStream<Q, S = TokioSleeper> {
    paginator: EventPaginator<Q>,
    dedup: DedupWindow,
    scheduler: TailScheduler,
    sleeper: S,
    pending: VecDeque<LogEvent>,
}

impl<Q: LogQuery, S: Sleeper> LogStream<Q, S> {
    /// Assembles a stream from an already-bounded paginator.
    pub fn new(paginator: EventPaginator<Q>, sleeper: S, options: &LogStreamOptions) -> Self {
        Self {
            paginator,
            dedup: DedupWindow::new(options.dedup_capacity),
            scheduler: TailScheduler::new(options.tail, options.tail_interval),
            sleeper,
            pending: VecDeque::new(),
        }
    }

    /// Pulls the next event, querying or sleeping as needed.
    ///
    /// Returns `None` once the stream has terminated.
    pub async fn next(&mut self) -> Option<Result<LogEvent, LogsError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }

            match self.scheduler.state() {
                TailState::Terminal => return None,
                TailState::Waiting => {
                    tracing::trace!(interval = ?self.scheduler.interval(), "Waiting for new log events");
                    self.sleeper.sleep(self.scheduler.interval()).await;
                    self.paginator.rewind();
                    self.scheduler.resume();
                }
                TailState::Draining => match self.paginator.next_page().await {
                    Ok(outcome) => {
                        let exhausted = outcome.is_exhausted();
                        for event in outcome.into_events() {
                            if self.dedup.should_emit(&event.event_id) {
                                self.pending.push_back(event);
                            }
                        }
                        self.scheduler.on_page(exhausted);
                    }
                    Err(err) => {
                        self.scheduler.halt();
                        return Some(Err(err));
                    }
                },
            }
        }
    }

    pub fn state(&self) -> TailState {
        self.scheduler.state()
    }

    /// Adapts the stream to a [`futures::Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<LogEvent, LogsError>> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|item| (item, stream))
        })
    }
}
