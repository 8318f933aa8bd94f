//! Error types for chainnote.

use thiserror::Error;

/// Result type alias using chainnote's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for chainnote operations.
///
/// Repository lookups that find nothing (missing row or a row owned by another
/// user) return `Ok(None)` rather than `Error::NotFound`; the variant is kept
/// for callers that need to turn an absent result into a failure.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique constraint collision (duplicate email, duplicate tag name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error, including an unrecognised `notes` table shape
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// Map a unique-constraint violation to `Conflict`, passing every other
    /// database error through unchanged.
    pub fn conflict_on_unique(err: sqlx::Error, message: impl Into<String>) -> Self {
        let is_unique = err
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);
        if is_unique {
            Error::Conflict(message.into())
        } else {
            Error::Database(err)
        }
    }
}
