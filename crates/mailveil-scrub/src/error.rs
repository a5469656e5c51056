//! Scrub pipeline error types.

use thiserror::Error;

/// Errors raised while building the identity map or rewriting collections.
#[derive(Debug, Error)]
pub enum ScrubError {
    /// A configured collection does not exist in the store.
    ///
    /// Raised before any write happens; a partially-configured run risks
    /// inconsistent anonymization.
    #[error("collection '{name}' does not exist in the store")]
    UnknownCollection {
        /// Name of the missing collection
        name: String,
    },

    /// The registry scan produced no usable address-to-identity entries.
    #[error("no usable email addresses could be loaded from '{collection}.{field}'")]
    EmptyMapping {
        /// Registry collection that was scanned
        collection: String,
        /// Email field that was read
        field: String,
    },

    /// Underlying store error.
    #[error("store error: {0}")]
    Store(#[from] mailveil_store::StoreError),
}

/// Result type alias for scrub operations.
pub type Result<T> = std::result::Result<T, ScrubError>;
