//! The log event record yielded by a [`LogStream`](super::LogStream).

use serde::{Deserialize, Serialize};

/// A single event returned by the log query API.
///
/// Wire names follow the CloudWatch Logs JSON shape so an event can be
/// read from and written back to that representation without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Stream the event was written to
    pub log_stream_name: String,
    /// Event time in epoch milliseconds
    pub timestamp: i64,
    /// Raw message text
    pub message: String,
    /// Time the service ingested the event, epoch milliseconds
    pub ingestion_time: i64,
    /// Unique event identifier, used for de-duplication
    pub event_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_reads_cloudwatch_shape() {
        let raw = r#"{
            "logStreamName": "ecs/web/abc123",
            "timestamp": 12345,
            "message": "log message",
            "ingestionTime": 12399,
            "eventId": "3701234"
        }"#;

        let event: LogEvent = serde_json::from_str(raw).unwrap();

        assert_eq!(
            event,
            LogEvent {
                log_stream_name: "ecs/web/abc123".to_string(),
                timestamp: 12345,
                message: "log message".to_string(),
                ingestion_time: 12399,
                event_id: "3701234".to_string(),
            }
        );
    }

    #[test]
    fn test_log_event_serialized_back_keeps_every_field() {
        let raw = serde_json::json!({
            "logStreamName": "name",
            "timestamp": 1_700_000_000_123_i64,
            "message": "multi\nline \"quoted\"",
            "ingestionTime": 1_700_000_000_456_i64,
            "eventId": "evt-1",
        });

        let event: LogEvent = serde_json::from_value(raw.clone()).unwrap();
        let back = serde_json::to_value(&event).unwrap();

        assert_eq!(back, raw);
    }

    #[test]
    fn test_log_event_missing_field_is_rejected() {
        let raw = r#"{"logStreamName": "name", "timestamp": 1, "message": "m", "ingestionTime": 1}"#;
        assert!(serde_json::from_str::<LogEvent>(raw).is_err());
    }
}
