//! Pure functions for mapping HTTP failures to repository errors.

use super::RepositoryError;

/// Maps a non-success HTTP status and its message to a [`RepositoryError`].
///
/// The message always reaches the user unchanged. 401 and 403 become
/// `Rejected` (authorization, row-level policy); every other status becomes
/// `Server` and keeps the code for logging.
///
/// # Examples
///
/// ```
/// use eventsync_core::storage::{status_code_to_repository_error, RepositoryError};
///
/// let error = status_code_to_repository_error(403, "permission denied".to_string());
/// assert_eq!(error, RepositoryError::Rejected("permission denied".to_string()));
///
/// let error = status_code_to_repository_error(500, "boom".to_string());
/// assert_eq!(error.to_string(), "boom");
/// ```
pub fn status_code_to_repository_error(status: u16, message: String) -> RepositoryError {
    match status {
        401 | 403 => RepositoryError::Rejected(message),
        _ => RepositoryError::Server { status, message },
    }
}
