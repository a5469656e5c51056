//! Store error types.

use thiserror::Error;

/// Store-specific errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open the database.
    #[error("failed to open store: {0}")]
    Open(String),

    /// A named collection does not exist in the store.
    #[error("collection '{name}' does not exist")]
    UnknownCollection {
        /// Name of the missing collection
        name: String,
    },

    /// A document with the given id was not found.
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound {
        /// Collection that was queried
        collection: String,
        /// Document id that was requested
        id: String,
    },

    /// Failed to decode a stored document body.
    #[error("decode error: {0}")]
    Decode(String),

    /// Underlying `SQLx` error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during store operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
