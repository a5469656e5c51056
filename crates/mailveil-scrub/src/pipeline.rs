//! Orchestration of the rewrite across all configured targets.
//!
//! The pipeline validates every target collection before the first write,
//! then processes targets sequentially in configuration order: scan the
//! collection in windows, rewrite the target field of each document that
//! carries it, and write back only when at least one substitution happened.

use crate::error::{Result, ScrubError};
use crate::identity_map::IdentityMap;
use crate::report::{FieldReport, RunReport};
use crate::rewriter::rewrite;
use crate::scanner::{BatchScanner, DEFAULT_WINDOW_SIZE};
use chrono::Utc;
use mailveil_core::TargetField;
use mailveil_store::DocumentStore;
use std::time::Instant;

/// Runs the anonymization across a list of target fields.
pub struct ScrubPipeline<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    window_size: usize,
}

impl<'a, S: DocumentStore + ?Sized> ScrubPipeline<'a, S> {
    /// Create a pipeline over the given store.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Set the batch window size.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Anonymize every target field, in order.
    ///
    /// # Errors
    /// Returns [`ScrubError::UnknownCollection`] if any target names a
    /// collection absent from the store; validation happens for all targets
    /// up front so the failure aborts the run before a single write. Store
    /// failures during a scan abort the remaining windows of that field and
    /// the run.
    pub async fn run(&self, targets: &[TargetField], map: &IdentityMap) -> Result<RunReport> {
        for target in targets {
            if !self.store.collection_exists(&target.collection).await? {
                return Err(ScrubError::UnknownCollection {
                    name: target.collection.to_string(),
                });
            }
        }

        let started_at = Utc::now();
        let mut fields = Vec::with_capacity(targets.len());
        for target in targets {
            fields.push(self.scrub_target(target, map).await?);
        }

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            fields,
        })
    }

    async fn scrub_target(&self, target: &TargetField, map: &IdentityMap) -> Result<FieldReport> {
        let start = Instant::now();
        let scanner = BatchScanner::new(self.store, self.window_size);
        let mut windows = scanner.scan(&target.collection).await?;

        tracing::info!(
            collection = %target.collection,
            field = %target.field,
            total = windows.total(),
            "start replacing email addresses"
        );

        let mut report = FieldReport::new(target.clone());

        while let Some(docs) = windows.next_window().await? {
            for doc in &docs {
                let Some(text) = doc.field_str(target.field.as_str()) else {
                    continue;
                };

                report.documents_scanned += 1;
                let outcome = rewrite(text, map);
                report.addresses_found += outcome.found;
                report.addresses_replaced += outcome.replaced;

                // Unmodified text is never written back.
                if outcome.replaced > 0 {
                    self.write_back(target, &doc.id, &outcome.text, &mut report)
                        .await;
                }
            }
        }

        report.elapsed = start.elapsed();

        if report.documents_scanned == 0 {
            tracing::warn!(
                collection = %target.collection,
                field = %target.field,
                "no documents with the target field found"
            );
        }

        report.log();
        Ok(report)
    }

    /// Persist one rewritten value, retrying a failed write once.
    ///
    /// A document that fails twice is logged and skipped; one bad document
    /// must not abort thousands of good ones.
    async fn write_back(
        &self,
        target: &TargetField,
        id: &str,
        value: &str,
        report: &mut FieldReport,
    ) {
        let first = self
            .store
            .update_field(&target.collection, id, &target.field, value)
            .await;

        let Err(first_err) = first else { return };
        tracing::warn!(
            collection = %target.collection,
            document = id,
            error = %first_err,
            "write failed, retrying once"
        );

        if let Err(second_err) = self
            .store
            .update_field(&target.collection, id, &target.field, value)
            .await
        {
            tracing::warn!(
                collection = %target.collection,
                document = id,
                error = %second_err,
                "write failed again, skipping document"
            );
            report.write_failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailveil_core::{CollectionName, FieldName};
    use mailveil_store::{Document, MemoryStore, StoreError};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Delegates to a [`MemoryStore`] but fails `update_field` a configured
    /// number of times per document id.
    struct FlakyStore {
        inner: MemoryStore,
        write_failures_left: Mutex<HashMap<String, u32>>,
    }

    impl FlakyStore {
        fn new(inner: MemoryStore) -> Self {
            Self {
                inner,
                write_failures_left: Mutex::new(HashMap::new()),
            }
        }

        fn fail_writes(&self, id: &str, times: u32) {
            self.write_failures_left
                .lock()
                .expect("acquire lock")
                .insert(id.to_string(), times);
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn collection_exists(
            &self,
            collection: &CollectionName,
        ) -> mailveil_store::Result<bool> {
            self.inner.collection_exists(collection).await
        }

        async fn list_ids(&self, collection: &CollectionName) -> mailveil_store::Result<Vec<String>> {
            self.inner.list_ids(collection).await
        }

        async fn fetch_by_ids(
            &self,
            collection: &CollectionName,
            ids: &[String],
        ) -> mailveil_store::Result<Vec<Document>> {
            self.inner.fetch_by_ids(collection, ids).await
        }

        async fn update_field(
            &self,
            collection: &CollectionName,
            id: &str,
            field: &FieldName,
            value: &str,
        ) -> mailveil_store::Result<()> {
            {
                let mut budgets = self.write_failures_left.lock().expect("acquire lock");
                if let Some(left) = budgets.get_mut(id) {
                    if *left > 0 {
                        *left -= 1;
                        return Err(StoreError::Io(std::io::Error::other(
                            "simulated write failure",
                        )));
                    }
                }
            }
            self.inner.update_field(collection, id, field, value).await
        }
    }

    fn commits() -> CollectionName {
        CollectionName::new("commit").expect("valid name")
    }

    fn target(spec: &str) -> TargetField {
        TargetField::parse(spec).expect("valid target")
    }

    fn simple_map() -> IdentityMap {
        IdentityMap::from_entries([("p1@co.com", "P1")])
    }

    #[tokio::test]
    async fn test_unknown_target_collection_aborts_before_writes() {
        let store = MemoryStore::new();
        store.create_collection(&commits());
        store.insert_document(
            &commits(),
            Document::new("c1").with_field("message", "by p1@co.com"),
        );

        let pipeline = ScrubPipeline::new(&store);
        let result = pipeline
            .run(&[target("commit.message"), target("bogus.field")], &simple_map())
            .await;

        assert!(matches!(
            result.unwrap_err(),
            ScrubError::UnknownCollection { .. }
        ));

        // The valid first target must not have been touched.
        let doc = store.document(&commits(), "c1").expect("document exists");
        assert_eq!(doc.field_str("message"), Some("by p1@co.com"));
    }

    #[tokio::test]
    async fn test_field_absent_everywhere_is_non_fatal() {
        let store = MemoryStore::new();
        store.create_collection(&commits());
        store.insert_document(&commits(), Document::new("c1").with_field("title", "no text"));

        let pipeline = ScrubPipeline::new(&store);
        let report = pipeline
            .run(&[target("commit.message")], &simple_map())
            .await
            .expect("run pipeline");

        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].documents_scanned, 0);
    }

    #[tokio::test]
    async fn test_only_modified_documents_are_written() {
        let store = MemoryStore::new();
        store.create_collection(&commits());
        store.insert_document(
            &commits(),
            Document::new("c1").with_field("message", "by p1@co.com"),
        );
        store.insert_document(
            &commits(),
            Document::new("c2").with_field("message", "by stranger@other.org"),
        );
        store.insert_document(&commits(), Document::new("c3").with_field("message", "no mail"));

        let pipeline = ScrubPipeline::new(&store);
        let report = pipeline
            .run(&[target("commit.message")], &simple_map())
            .await
            .expect("run pipeline");

        let field = &report.fields[0];
        assert_eq!(field.documents_scanned, 3);
        assert_eq!(field.addresses_found, 2);
        assert_eq!(field.addresses_replaced, 1);
        assert_eq!(field.write_failures, 0);

        let c1 = store.document(&commits(), "c1").expect("document exists");
        assert_eq!(c1.field_str("message"), Some("by [email:P1]"));
        let c2 = store.document(&commits(), "c2").expect("document exists");
        assert_eq!(c2.field_str("message"), Some("by stranger@other.org"));
    }

    #[tokio::test]
    async fn test_transient_write_failure_is_retried() {
        let inner = MemoryStore::new();
        inner.create_collection(&commits());
        inner.insert_document(
            &commits(),
            Document::new("c1").with_field("message", "by p1@co.com"),
        );

        let store = FlakyStore::new(inner);
        store.fail_writes("c1", 1);

        let report = ScrubPipeline::new(&store)
            .run(&[target("commit.message")], &simple_map())
            .await
            .expect("run pipeline");

        // The retry succeeded, so the failure is not reported.
        assert_eq!(report.fields[0].addresses_replaced, 1);
        assert_eq!(report.fields[0].write_failures, 0);

        let doc = store.inner.document(&commits(), "c1").expect("document exists");
        assert_eq!(doc.field_str("message"), Some("by [email:P1]"));
    }

    #[tokio::test]
    async fn test_persistent_write_failure_skips_document_and_continues() {
        let inner = MemoryStore::new();
        inner.create_collection(&commits());
        inner.insert_document(
            &commits(),
            Document::new("c1").with_field("message", "by p1@co.com"),
        );
        inner.insert_document(
            &commits(),
            Document::new("c2").with_field("message", "cc p1@co.com"),
        );

        let store = FlakyStore::new(inner);
        store.fail_writes("c1", 2);

        let report = ScrubPipeline::new(&store)
            .run(&[target("commit.message")], &simple_map())
            .await
            .expect("run pipeline");

        assert_eq!(report.fields[0].write_failures, 1);

        // The failed document keeps its original text; the one after it is
        // still written.
        let c1 = store.inner.document(&commits(), "c1").expect("document exists");
        assert_eq!(c1.field_str("message"), Some("by p1@co.com"));
        let c2 = store.inner.document(&commits(), "c2").expect("document exists");
        assert_eq!(c2.field_str("message"), Some("cc [email:P1]"));
    }
}
