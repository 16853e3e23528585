//! Unified error handling
//!
//! Application-level error taxonomy shared by all services:
//! - [`AppError`] - service error enum
//! - [`AppResult`] - result alias
//!
//! Notification failures are deliberately absent: the notify module absorbs
//! its own errors and only logs them.

use crate::db::repository::RepoError;

/// Service-level error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Business logic errors ==========
    #[error("Resource not found: {0}")]
    /// Referenced entity does not exist (404)
    NotFound(String),

    #[error("Validation failed: {0}")]
    /// Malformed input to an operation (400)
    Validation(String),

    #[error("Boundary reached: {0}")]
    /// Step-move past the first/last position of a group (409)
    Boundary(String),

    #[error("Conflict: {0}")]
    /// Concurrent writers raced on a sequence value or a rank (409)
    Conflict(String),

    // ========== System errors ==========
    #[error("Database error: {0}")]
    /// Storage failure (500)
    Database(String),

    #[error("Internal error: {0}")]
    /// Anything else (500)
    Internal(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(target: "database", error = %msg, "Database error occurred");
                AppError::Database(msg)
            }
        }
    }
}

// Services issuing raw queries get the same duplicate-detection pass
// as the repositories.
impl From<surrealdb::Error> for AppError {
    fn from(err: surrealdb::Error) -> Self {
        AppError::from(RepoError::from(err))
    }
}

impl AppError {
    /// True when retrying the operation may succeed (lost a write race)
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

/// Result type for service operations
pub type AppResult<T> = Result<T, AppError>;
