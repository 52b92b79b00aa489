//! Common error types for WatchQ

use thiserror::Error;

/// Common result type for WatchQ operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WatchQ crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested item or tag does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input: unrecognized URL, bad reorder payload, unknown tag
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unique-name collision in the tag registry
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Video metadata could not be resolved
    #[error("Metadata resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure modes of the metadata resolver
///
/// The variants carry the distinction the HTTP layer needs: a missing video
/// is a 404, an upstream refusal is a 400, a transport problem is a 500.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Video does not exist, is private, or was deleted
    #[error("video unavailable: {0}")]
    Unavailable(String),

    /// Upstream refused the request (bad API key, quota exceeded, bad id)
    #[error("rejected by upstream: {0}")]
    Rejected(String),

    /// Network failure or unreadable upstream response
    #[error("transport failure: {0}")]
    Transport(String),
}

impl Error {
    /// True when the error is a unique-constraint violation from SQLite
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
