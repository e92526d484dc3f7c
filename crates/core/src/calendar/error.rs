use thiserror::Error;

/// Errors that can occur when validating an event payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Event title cannot be empty")]
    EmptyTitle,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("End time must be after start time")]
    InvalidTimeRange,
    #[error("User ID is required")]
    MissingUserId,
}
