//! In-memory document store.
//!
//! Collections keep their documents in insertion order so scan order (and
//! with it identity-map accumulation order) is deterministic. Used by tests
//! and for anonymizing small snapshots loaded wholesale into memory.

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::DocumentStore;
use async_trait::async_trait;
use mailveil_core::{CollectionName, FieldName};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::RwLock;

/// Insertion-ordered in-memory collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection if it does not already exist.
    pub fn create_collection(&self, collection: &CollectionName) {
        let mut collections = self.collections.write().expect("acquire write lock");
        collections.entry(collection.to_string()).or_default();
    }

    /// Insert a document with an explicit id.
    pub fn insert_document(&self, collection: &CollectionName, doc: Document) {
        let mut collections = self.collections.write().expect("acquire write lock");
        collections.entry(collection.to_string()).or_default().push(doc);
    }

    /// Fetch a single document by id, for assertions in tests.
    #[must_use]
    pub fn document(&self, collection: &CollectionName, id: &str) -> Option<Document> {
        let collections = self.collections.read().expect("acquire read lock");
        collections
            .get(collection.as_str())
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn collection_exists(&self, collection: &CollectionName) -> Result<bool> {
        let collections = self.collections.read().expect("acquire read lock");
        Ok(collections.contains_key(collection.as_str()))
    }

    async fn list_ids(&self, collection: &CollectionName) -> Result<Vec<String>> {
        let collections = self.collections.read().expect("acquire read lock");
        let docs = collections
            .get(collection.as_str())
            .ok_or_else(|| StoreError::UnknownCollection {
                name: collection.to_string(),
            })?;

        Ok(docs.iter().map(|d| d.id.clone()).collect())
    }

    async fn fetch_by_ids(
        &self,
        collection: &CollectionName,
        ids: &[String],
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().expect("acquire read lock");
        let docs = collections
            .get(collection.as_str())
            .ok_or_else(|| StoreError::UnknownCollection {
                name: collection.to_string(),
            })?;

        Ok(docs
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn update_field(
        &self,
        collection: &CollectionName,
        id: &str,
        field: &FieldName,
        value: &str,
    ) -> Result<()> {
        let mut collections = self.collections.write().expect("acquire write lock");
        let docs = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| StoreError::UnknownCollection {
                name: collection.to_string(),
            })?;

        let doc = docs
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        doc.fields
            .insert(field.to_string(), JsonValue::String(value.to_string()));

        Ok(())
    }
}
