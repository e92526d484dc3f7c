use thiserror::Error;

use crate::cache::{CacheError, MutationKind};

/// Client-side validation failures. At most one is shown at a time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("User not identified. Please log in again.")]
    NotAuthenticated,
    #[error("Title, start time, end time, and a selected date are required.")]
    MissingFields,
    #[error("Invalid time format. Please use HH:mm.")]
    InvalidTimeFormat,
    #[error("End time must be after start time.")]
    EndNotAfterStart,
    /// The local time falls in a daylight-saving gap.
    #[error("Selected time does not exist in time zone {0}.")]
    NonexistentTime(String),
}

/// Failure of a form submission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("Failed to {kind} event: {source}")]
    Mutation {
        kind: MutationKind,
        source: CacheError,
    },
}
