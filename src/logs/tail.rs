//! Tail scheduling: what to do once a time window has been drained.

use async_trait::async_trait;
use std::time::Duration;

/// Default delay between polls in tail mode.
pub const DEFAULT_TAIL_INTERVAL: Duration = Duration::from_secs(5);

/// State of a log stream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// Requesting pages
    Draining,
    /// Window exhausted in tail mode; sleep, then re-issue the query
    Waiting,
    /// Stream ended; absorbing
    Terminal,
}

/// Delay primitive used between tail polls.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer. Dropping the future cancels the sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Decides between continuing, waiting to re-poll and terminating.
#[derive(Debug, Clone)]
pub struct TailScheduler {
    state: TailState,
    tail: bool,
    interval: Duration,
}

impl TailScheduler {
    pub fn new(tail: bool, interval: Duration) -> Self {
        Self {
            state: TailState::Draining,
            tail,
            interval,
        }
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Records that a page was consumed and returns the new state.
    ///
    /// A page with a cursor keeps draining. A page without one either
    /// moves to `Waiting` (tail mode) or ends the stream.
    pub fn on_page(&mut self, exhausted: bool) -> TailState {
        if self.state != TailState::Draining {
            return self.state;
        }
        self.state = match (exhausted, self.tail) {
            (false, _) => TailState::Draining,
            (true, true) => TailState::Waiting,
            (true, false) => TailState::Terminal,
        };
        self.state
    }

    /// Leaves `Waiting` after the poll interval has elapsed.
    pub fn resume(&mut self) -> TailState {
        if self.state == TailState::Waiting {
            self.state = TailState::Draining;
        }
        self.state
    }

    /// Ends the stream unconditionally.
    pub fn halt(&mut self) {
        self.state = TailState::Terminal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_draining() {
        let scheduler = TailScheduler::new(false, DEFAULT_TAIL_INTERVAL);
        assert_eq!(scheduler.state(), TailState::Draining);
        assert_eq!(scheduler.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_page_with_cursor_keeps_draining() {
        let mut scheduler = TailScheduler::new(false, DEFAULT_TAIL_INTERVAL);
        assert_eq!(scheduler.on_page(false), TailState::Draining);
        assert_eq!(scheduler.on_page(false), TailState::Draining);
    }

    #[test]
    fn test_exhaustion_without_tail_terminates() {
        let mut scheduler = TailScheduler::new(false, DEFAULT_TAIL_INTERVAL);
        assert_eq!(scheduler.on_page(true), TailState::Terminal);
    }

    #[test]
    fn test_exhaustion_with_tail_waits_then_resumes() {
        let mut scheduler = TailScheduler::new(true, Duration::from_secs(2));
        assert_eq!(scheduler.on_page(true), TailState::Waiting);
        assert_eq!(scheduler.resume(), TailState::Draining);
        assert_eq!(scheduler.on_page(true), TailState::Waiting);
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let mut scheduler = TailScheduler::new(true, DEFAULT_TAIL_INTERVAL);
        scheduler.halt();
        assert_eq!(scheduler.on_page(false), TailState::Terminal);
        assert_eq!(scheduler.resume(), TailState::Terminal);
    }

    #[test]
    fn test_resume_outside_waiting_is_a_no_op() {
        let mut scheduler = TailScheduler::new(true, DEFAULT_TAIL_INTERVAL);
        assert_eq!(scheduler.resume(), TailState::Draining);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits_the_interval() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
