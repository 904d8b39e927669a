//! Error types for the agenda core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur in agenda operations.
///
/// `EmptyTitle`, `InvalidRange` and `Conflict` are raised locally before any
/// store call is issued. Everything else comes back from the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Event title must not be empty")]
    EmptyTitle,

    #[error("Event must start before it ends (start {start}, end {end})")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Event overlaps existing event '{event_id}'")]
    Conflict { event_id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AgendaError {
    /// True when the error was produced without touching the store.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AgendaError::EmptyTitle
                | AgendaError::InvalidRange { .. }
                | AgendaError::Conflict { .. }
                | AgendaError::InvalidInput(_)
        )
    }
}

impl From<reqwest::Error> for AgendaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgendaError::Serialization(err.to_string())
        } else {
            AgendaError::Store(err.to_string())
        }
    }
}

/// Result type alias for agenda operations.
pub type AgendaResult<T> = Result<T, AgendaError>;
