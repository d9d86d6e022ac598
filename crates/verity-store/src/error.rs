//! Error types for the store module.

use thiserror::Error;
use verity_core::PostId;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Event or row serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The post a transaction targets does not exist.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// The transaction no longer matches committed state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding in-process state was poisoned.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking storage task failed to complete.
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
