//! Mailveil Store - document collection access for the anonymizer.
//!
//! The anonymization pipeline consumes storage through the [`DocumentStore`]
//! trait: ordered id listing, batched fetches by id set, and single-field
//! write-back. Two backends are provided:
//!
//! - [`SqliteStore`] - `SQLite` via `SQLx`, one `(id, data)` table per
//!   collection with the document body as a JSON object
//! - [`MemoryStore`] - insertion-ordered in-memory collections for tests
//!   and small snapshots
//!
//! # Example
//!
//! ```rust,ignore
//! use mailveil_core::CollectionName;
//! use mailveil_store::{DocumentStore, SqliteStore};
//!
//! let store = SqliteStore::open("snapshot.db").await?;
//! let people = CollectionName::new("people")?;
//! let ids = store.list_ids(&people).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod document;
pub mod error;
pub mod memory;
pub mod sqlite;

// Re-export commonly used types
pub use document::Document;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use mailveil_core::{CollectionName, FieldName};

/// Paginated reader/writer over named document collections.
///
/// All methods are object-safe so the pipeline can run against `&dyn
/// DocumentStore`. Implementations must report ids in a stable storage
/// order; the pipeline's batching and statistics depend on it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check whether a collection exists in the store.
    async fn collection_exists(&self, collection: &CollectionName) -> Result<bool>;

    /// List every document id in the collection, in storage order.
    async fn list_ids(&self, collection: &CollectionName) -> Result<Vec<String>>;

    /// Fetch the documents for exactly the given id set.
    ///
    /// Ids with no matching document are silently omitted from the result.
    async fn fetch_by_ids(
        &self,
        collection: &CollectionName,
        ids: &[String],
    ) -> Result<Vec<Document>>;

    /// Overwrite a single text field of a single document.
    async fn update_field(
        &self,
        collection: &CollectionName,
        id: &str,
        field: &FieldName,
        value: &str,
    ) -> Result<()>;
}
