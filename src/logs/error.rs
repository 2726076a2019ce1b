//! Error types for the log streaming engine.

use thiserror::Error;

/// Errors produced while resolving a log window or pulling pages.
#[derive(Debug, Error)]
pub enum LogsError {
    /// A start or end expression was neither relative ("5m ago") nor a parseable date.
    #[error("Unknown date: {0}")]
    InvalidTimeExpression(String),

    /// The underlying log query call failed. Not retried by the engine.
    #[error("Log query failed: {0}")]
    Query(String),
}

impl LogsError {
    /// Returns `true` if the error was raised before any network call.
    pub fn is_invalid_time(&self) -> bool {
        matches!(self, Self::InvalidTimeExpression(_))
    }
}
