//! End-to-end behavior of the log streaming engine through its public API.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ecsctl::logs::{
    query_logs, LogEvent, LogPage, LogQuery, LogQueryRequest, LogStreamOptions, LogsError,
    TailState,
};

fn event(stream: &str, id: &str, timestamp: i64) -> LogEvent {
    LogEvent {
        log_stream_name: stream.to_string(),
        timestamp,
        message: format!("message {id}"),
        ingestion_time: timestamp + 10,
        event_id: id.to_string(),
    }
}

/// Serves one scripted page per call, then empty exhausted pages.
#[derive(Default)]
struct FakeLogs {
    pages: Mutex<VecDeque<Result<LogPage, LogsError>>>,
    requests: Mutex<Vec<LogQueryRequest>>,
}

impl FakeLogs {
    fn with_pages(pages: Vec<Result<LogPage, LogsError>>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<LogQueryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogQuery for FakeLogs {
    async fn filter_events(&self, request: &LogQueryRequest) -> Result<LogPage, LogsError> {
        self.requests.lock().unwrap().push(request.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(LogPage::default()))
    }
}

#[tokio::test]
async fn test_bounded_window_is_drained_across_pages_without_duplicates() {
    let logs = FakeLogs::with_pages(vec![
        Ok(LogPage {
            events: vec![event("web", "1", 100), event("web", "2", 200)],
            next_token: Some("page-2".to_string()),
        }),
        Ok(LogPage {
            events: vec![event("web", "2", 200), event("worker", "3", 300)],
            next_token: None,
        }),
    ]);

    let stream = query_logs(
        Arc::clone(&logs),
        "/ecs/app",
        vec!["web".to_string(), "worker".to_string()],
        Some("2023-11-14T22:13:20Z"),
        Some("2023-11-14T22:23:20Z"),
        LogStreamOptions::default(),
    )
    .unwrap();

    let events: Vec<LogEvent> = stream
        .into_stream()
        .map(|item| item.unwrap())
        .collect()
        .await;

    let ids: Vec<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let requests = logs.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].start, Some(1_700_000_000_000));
    assert_eq!(requests[0].end, Some(1_700_000_600_000));
    assert_eq!(requests[0].next_token, None);
    assert_eq!(requests[1].next_token.as_deref(), Some("page-2"));
    assert!(requests.iter().all(|r| r.interleaved));
}

#[tokio::test(start_paused = true)]
async fn test_follow_mode_repolls_the_same_window_after_the_interval() {
    let logs = FakeLogs::with_pages(vec![
        Ok(LogPage {
            events: vec![event("web", "1", 100)],
            next_token: None,
        }),
        Ok(LogPage {
            events: vec![event("web", "1", 100), event("web", "2", 150)],
            next_token: None,
        }),
    ]);

    let mut stream = query_logs(
        Arc::clone(&logs),
        "/ecs/app",
        vec!["web".to_string()],
        Some("2023-11-14T22:13:20Z"),
        None,
        LogStreamOptions::default().tail(true),
    )
    .unwrap();

    let start = tokio::time::Instant::now();
    assert_eq!(stream.next().await.unwrap().unwrap().event_id, "1");
    assert_eq!(start.elapsed(), Duration::ZERO);

    assert_eq!(stream.next().await.unwrap().unwrap().event_id, "2");
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(stream.state(), TailState::Waiting);

    let requests = logs.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
}

#[tokio::test]
async fn test_invalid_time_expression_fails_before_querying() {
    let logs = FakeLogs::with_pages(Vec::new());

    let result = query_logs(
        Arc::clone(&logs),
        "/ecs/app",
        vec!["web".to_string()],
        Some("yesterday-ish"),
        None,
        LogStreamOptions::default(),
    );

    let Err(err) = result else {
        panic!("expected an invalid time expression");
    };
    assert!(err.is_invalid_time());
    assert!(logs.requests().is_empty());
}

#[tokio::test]
async fn test_query_failure_surfaces_once_and_ends_the_stream() {
    let logs = FakeLogs::with_pages(vec![
        Ok(LogPage {
            events: vec![event("web", "1", 100)],
            next_token: Some("next".to_string()),
        }),
        Err(LogsError::Query("ThrottlingException".to_string())),
    ]);

    let items: Vec<Result<LogEvent, LogsError>> = query_logs(
        Arc::clone(&logs),
        "/ecs/app",
        vec!["web".to_string()],
        None,
        None,
        LogStreamOptions::default().tail(true),
    )
    .unwrap()
    .into_stream()
    .collect()
    .await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(&items[1], Err(LogsError::Query(msg)) if msg.contains("Throttling")));
    assert_eq!(logs.requests().len(), 2);
}
