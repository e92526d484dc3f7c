use thiserror::Error;

/// Errors reported by an event repository.
///
/// The engine never branches on the variant; it shows the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// Authorization or row-level policy failure, message as sent by the server.
    #[error("{0}")]
    Rejected(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Non-success response from a remote store. Only the server's message is shown.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// A write succeeded but returned no row, e.g. `NoData("adding")`.
    #[error("No data returned after {0} event.")]
    NoData(&'static str),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
