//! CloudWatch Logs implementation of [`LogQuery`].

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::FilteredLogEvent;
use aws_sdk_cloudwatchlogs::Client as LogsClient;

use super::error::LogsError;
use super::event::LogEvent;
use super::paginator::{LogPage, LogQuery, LogQueryRequest};

/// Issues `FilterLogEvents` calls on a client owned by one stream request.
#[derive(Debug, Clone)]
pub struct CloudWatchLogQuery {
    client: LogsClient,
}

impl CloudWatchLogQuery {
    pub fn new(client: LogsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogQuery for CloudWatchLogQuery {
    async fn filter_events(&self, request: &LogQueryRequest) -> Result<LogPage, LogsError> {
        // `interleaved` is deprecated upstream but still honored
        #[allow(deprecated)]
        let builder = self
            .client
            .filter_log_events()
            .log_group_name(&request.group)
            .set_log_stream_names(Some(request.streams.clone()))
            .set_start_time(request.start)
            .set_end_time(request.end)
            .set_next_token(request.next_token.clone())
            .interleaved(request.interleaved);

        let resp = builder
            .send()
            .await
            .map_err(|e| LogsError::Query(DisplayErrorContext(&e).to_string()))?;

        let events = resp
            .events()
            .iter()
            .filter_map(|event| {
                let converted = log_event_from_filtered(event);
                if converted.is_none() {
                    tracing::warn!(
                        group = %request.group,
                        "Skipping log event without an id or stream name"
                    );
                }
                converted
            })
            .collect();

        Ok(LogPage {
            events,
            next_token: resp.next_token().map(str::to_string),
        })
    }
}

/// Maps an SDK event to a [`LogEvent`].
///
/// Returns `None` when the event id or stream name is missing, since such an
/// event can be neither de-duplicated nor attributed. Missing timestamps
/// become 0 and a missing message becomes empty.
pub fn log_event_from_filtered(event: &FilteredLogEvent) -> Option<LogEvent> {
    Some(LogEvent {
        log_stream_name: event.log_stream_name()?.to_string(),
        timestamp: event.timestamp().unwrap_or(0),
        message: event.message().unwrap_or_default().to_string(),
        ingestion_time: event.ingestion_time().unwrap_or(0),
        event_id: event.event_id()?.to_string(),
    })
}
