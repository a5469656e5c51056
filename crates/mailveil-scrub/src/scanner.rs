//! Windowed iteration over large, unordered document collections.
//!
//! The scanner retrieves the full id list for a collection once up front
//! (one pass, no long-lived cursor to time out), then issues one batched
//! fetch per fixed-size id window. Document bodies are only ever held for
//! the current window, which bounds memory and per-call load.

use crate::error::Result;
use mailveil_core::CollectionName;
use mailveil_store::{Document, DocumentStore};

/// Default number of document ids fetched per batched request.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Paginates a collection in fixed-size id windows.
#[derive(Debug, Clone, Copy)]
pub struct BatchScanner<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    window_size: usize,
}

impl<'a, S: DocumentStore + ?Sized> BatchScanner<'a, S> {
    /// Create a scanner over the given store.
    #[must_use]
    pub fn new(store: &'a S, window_size: usize) -> Self {
        debug_assert!(window_size > 0, "window size must be positive");
        Self { store, window_size }
    }

    /// Start a scan of `collection`.
    ///
    /// Fetches the complete id list immediately; documents are fetched
    /// lazily, one window at a time, through [`DocumentWindows`].
    pub async fn scan(&self, collection: &CollectionName) -> Result<DocumentWindows<'a, S>> {
        let ids = self.store.list_ids(collection).await?;

        Ok(DocumentWindows {
            store: self.store,
            collection: collection.clone(),
            ids,
            cursor: 0,
            window_size: self.window_size,
        })
    }
}

/// An in-progress scan: the frozen id list plus a window cursor.
///
/// No state is retained across windows besides the cursor, so a scan is
/// restartable in principle; the pipeline does not checkpoint progress
/// because replacement is idempotent and a crashed run is simply re-run.
#[derive(Debug)]
pub struct DocumentWindows<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collection: CollectionName,
    ids: Vec<String>,
    cursor: usize,
    window_size: usize,
}

impl<S: DocumentStore + ?Sized> DocumentWindows<'_, S> {
    /// Total number of document ids in the scan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.ids.len()
    }

    /// Fetch the next non-empty window of documents.
    ///
    /// Returns `Ok(None)` once every window has been visited. Windows whose
    /// ids no longer resolve to documents are skipped.
    pub async fn next_window(&mut self) -> Result<Option<Vec<Document>>> {
        while self.cursor < self.ids.len() {
            let end = usize::min(self.cursor + self.window_size, self.ids.len());
            let window = &self.ids[self.cursor..end];
            self.cursor = end;

            let docs = self.store.fetch_by_ids(&self.collection, window).await?;
            if !docs.is_empty() {
                return Ok(Some(docs));
            }
        }

        Ok(None)
    }
}
