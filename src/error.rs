//! Error types for exif-harvest
//!
//! Run-level failures (the catalog cannot be fetched, the store is unreachable,
//! the filesystem misbehaves) are [`Error`] values and abort the run. Failures
//! scoped to a single catalog entry never become an [`Error`]; they are reported
//! as [`FailureReason`](crate::types::FailureReason) inside the item's outcome.

use thiserror::Error;

/// Result type alias for exif-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for exif-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent")
        key: Option<String>,
    },

    /// Metadata store operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// The catalog could not be retrieved
    #[error("transport error: {0}")]
    Transport(String),

    /// The catalog document could not be parsed
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// Embedded metadata could not be read from an image
    #[error("metadata error: {0}")]
    Metadata(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A worker task panicked or was cancelled
    #[error("worker task failed: {0}")]
    Task(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

impl Error {
    /// Shorthand for a configuration error on a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Whether this error originated in the metadata store
    pub fn is_database(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Sqlx(_))
    }
}
