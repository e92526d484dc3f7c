use std::fmt;

use thiserror::Error;

use crate::storage::RepositoryError;

/// The three write operations of the event cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Add,
    Update,
    Remove,
}

impl MutationKind {
    pub(crate) fn index(self) -> usize {
        match self {
            MutationKind::Add => 0,
            MutationKind::Update => 1,
            MutationKind::Remove => 2,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::Add => write!(f, "add"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Remove => write!(f, "remove"),
        }
    }
}

/// Errors that can occur during event cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Repository failure, message passed through verbatim.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("Mutation already in progress: {0}")]
    MutationPending(MutationKind),
    #[error("User not identified. Please log in again.")]
    NotAuthenticated,
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
