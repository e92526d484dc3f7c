//! Client error types.

use eventsync_core::storage::{status_code_to_repository_error, RepositoryError};
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    /// A delete matched no visible row.
    #[error("Event not found: {id}")]
    NotFound { id: String },

    /// A write returned an empty representation.
    #[error("No data returned after {0} event.")]
    NoData(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for RepositoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) if e.is_timeout() || e.is_connect() => {
                RepositoryError::ConnectionFailed(e.to_string())
            }
            ClientError::Request(e) if e.is_decode() => RepositoryError::Serialization(e.to_string()),
            ClientError::Request(e) => RepositoryError::QueryFailed(e.to_string()),
            ClientError::ServerError { status, message } => {
                status_code_to_repository_error(status, message)
            }
            ClientError::NotFound { id } => RepositoryError::NotFound {
                entity_type: "Event",
                id,
            },
            ClientError::NoData(action) => RepositoryError::NoData(action),
            ClientError::InvalidInput(message) => RepositoryError::InvalidData(message),
            ClientError::Json(e) => RepositoryError::Serialization(e.to_string()),
        }
    }
}
