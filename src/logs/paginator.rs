//! Cursor-driven page loop over a log query API.
//!
//! The paginator reports exactly what the API returned, in API order.
//! De-duplication is layered on top by the stream.

use async_trait::async_trait;
use std::sync::Arc;

use super::error::LogsError;
use super::event::LogEvent;

/// One call's worth of query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQueryRequest {
    /// Log group to query
    pub group: String,
    /// Streams within the group
    pub streams: Vec<String>,
    /// Inclusive lower bound, epoch milliseconds
    pub start: Option<i64>,
    /// Upper bound, epoch milliseconds
    pub end: Option<i64>,
    /// Continuation cursor from the previous page
    pub next_token: Option<String>,
    /// Merge events across streams by time rather than per stream
    pub interleaved: bool,
}

/// A page of events plus the cursor for the next one, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    pub next_token: Option<String>,
}

/// The log query API consumed by the engine.
#[async_trait]
pub trait LogQuery: Send + Sync {
    /// Runs a single filtered query and returns one page.
    async fn filter_events(&self, request: &LogQueryRequest) -> Result<LogPage, LogsError>;
}

#[async_trait]
impl<T: LogQuery + ?Sized> LogQuery for Arc<T> {
    async fn filter_events(&self, request: &LogQueryRequest) -> Result<LogPage, LogsError> {
        (**self).filter_events(request).await
    }
}

#[async_trait]
impl<T: LogQuery + ?Sized> LogQuery for Box<T> {
    async fn filter_events(&self, request: &LogQueryRequest) -> Result<LogPage, LogsError> {
        (**self).filter_events(request).await
    }
}

/// Result of pulling one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A continuation cursor was returned; more pages remain.
    More(Vec<LogEvent>),
    /// No cursor was returned; this was the last page of the window.
    Exhausted(Vec<LogEvent>),
}

impl PageOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }

    pub fn into_events(self) -> Vec<LogEvent> {
        match self {
            Self::More(events) | Self::Exhausted(events) => events,
        }
    }
}

/// Drives repeated queries for a fixed group, stream set and time window.
///
/// Bounds are fixed at construction and never re-resolved.
pub struct EventPaginator<Q> {
    client: Q,
    request: LogQueryRequest,
    pages: u64,
}

impl<Q: LogQuery> EventPaginator<Q> {
    pub fn new(
        client: Q,
        group: impl Into<String>,
        streams: Vec<String>,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Self {
        Self {
            client,
            request: LogQueryRequest {
                group: group.into(),
                streams,
                start,
                end,
                next_token: None,
                interleaved: true,
            },
            pages: 0,
        }
    }

    /// Fetches the next page, advancing the cursor when one is returned.
    ///
    /// # Errors
    /// Propagates the query error unchanged. The cursor is left as it was,
    /// so the caller may retry the same page.
    pub async fn next_page(&mut self) -> Result<PageOutcome, LogsError> {
        tracing::debug!(
            group = %self.request.group,
            streams = self.request.streams.len(),
            has_token = self.request.next_token.is_some(),
            page = self.pages,
            "Querying log events"
        );

        let page = self.client.filter_events(&self.request).await?;
        self.pages += 1;

        match page.next_token {
            Some(token) => {
                self.request.next_token = Some(token);
                Ok(PageOutcome::More(page.events))
            }
            None => Ok(PageOutcome::Exhausted(page.events)),
        }
    }

    /// Drops the cursor so the next call re-issues the initial bounded query.
    pub fn rewind(&mut self) {
        self.request.next_token = None;
    }

    pub fn request(&self) -> &LogQueryRequest {
        &self.request
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> u64 {
        self.pages
    }
}
