//! Error types for roomrelay.

use thiserror::Error;

/// Common error type for roomrelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Persistence failure.
    ///
    /// Errors from sqlx are converted automatically. These are fatal for the
    /// request that hit them, never for the process.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed user input (empty room name, non-numeric id).
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller is not allowed to perform an admin-only action.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Telegram transport error (startup or polling setup).
    #[error("telegram error: {0}")]
    Telegram(String),
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        RelayError::Storage(e.to_string())
    }
}

/// Result type alias for roomrelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
