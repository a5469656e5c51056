//! Identity mapping built from the people registry.
//!
//! The map associates each canonical (lower-cased) email address with the
//! identity ids that own it, comma-joined in registry scan order. Addresses
//! shared by more than the configured number of identities are treated as
//! non-personal (team aliases, role accounts) and excluded permanently.

use crate::error::{Result, ScrubError};
use crate::scanner::{BatchScanner, DEFAULT_WINDOW_SIZE};
use mailveil_core::{find_addresses, CollectionName, FieldName};
use mailveil_store::DocumentStore;
use std::collections::{HashMap, HashSet};

/// Default maximum number of distinct identities an address may be shared by.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Read-only mapping from canonical address to owning identity ids.
///
/// Built once per run, held fully in memory, discarded at process exit.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: HashMap<String, String>,
}

impl IdentityMap {
    /// Construct a map from pre-canonicalized entries.
    ///
    /// Keys must already be lower-cased; values are the exact id lists that
    /// will appear inside replacement tokens.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up the id list for a canonical (lower-cased) address.
    #[must_use]
    pub fn ids_for(&self, address: &str) -> Option<&str> {
        self.entries.get(address).map(String::as_str)
    }

    /// Number of mapped addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no addresses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Diagnostics from an identity map build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    /// Registry records visited
    pub records_scanned: u64,
    /// Records whose email field was absent or held no grammar match
    pub records_without_address: u64,
    /// Addresses retained in the map
    pub mapped_addresses: usize,
    /// Addresses excluded as over-shared
    pub excluded_addresses: usize,
}

/// Builds an [`IdentityMap`] from a paginated registry scan.
#[derive(Debug, Clone)]
pub struct IdentityMapBuilder {
    registry: CollectionName,
    email_field: FieldName,
    threshold: usize,
    window_size: usize,
}

impl IdentityMapBuilder {
    /// Create a builder reading `registry` records' `email_field`.
    #[must_use]
    pub fn new(registry: CollectionName, email_field: FieldName) -> Self {
        Self {
            registry,
            email_field,
            threshold: DEFAULT_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Set the duplicate-identity threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the registry pagination window.
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Scan the registry and build the mapping.
    ///
    /// Accumulation rules, in registry scan order with no sorting applied:
    /// - the email field is lower-cased and the first grammar match wins;
    ///   records without a match are skipped silently;
    /// - an address already mapped to fewer than `threshold` identities gets
    ///   the new id appended, comma-joined;
    /// - the moment an address would exceed `threshold` identities it is
    ///   removed and blacklisted for the rest of the build, never re-added.
    ///
    /// # Errors
    /// Returns [`ScrubError::UnknownCollection`] if the registry collection
    /// is absent and [`ScrubError::EmptyMapping`] if the scan yields zero
    /// usable entries; both abort the run before any write.
    pub async fn build<S>(&self, store: &S) -> Result<(IdentityMap, BuildStats)>
    where
        S: DocumentStore + ?Sized,
    {
        if !store.collection_exists(&self.registry).await? {
            return Err(ScrubError::UnknownCollection {
                name: self.registry.to_string(),
            });
        }

        let mut entries: HashMap<String, String> = HashMap::new();
        let mut excluded: HashSet<String> = HashSet::new();
        let mut stats = BuildStats::default();

        let scanner = BatchScanner::new(store, self.window_size);
        let mut windows = scanner.scan(&self.registry).await?;
        tracing::info!(
            collection = %self.registry,
            total = windows.total(),
            "start loading email addresses"
        );

        while let Some(docs) = windows.next_window().await? {
            for doc in &docs {
                stats.records_scanned += 1;

                let Some(raw) = doc.field_str(self.email_field.as_str()) else {
                    stats.records_without_address += 1;
                    continue;
                };

                let lowered = raw.to_lowercase();
                // First match wins when the field text carries several addresses.
                let Some(address) = find_addresses(&lowered).into_iter().next() else {
                    stats.records_without_address += 1;
                    continue;
                };

                if excluded.contains(address) {
                    continue;
                }

                if let Some(ids) = entries.get_mut(address) {
                    if ids.matches(',').count() + 1 >= self.threshold {
                        entries.remove(address);
                        excluded.insert(address.to_string());
                        tracing::debug!(address, "excluded over-shared address");
                    } else {
                        ids.push(',');
                        ids.push_str(&doc.id);
                    }
                } else {
                    entries.insert(address.to_string(), doc.id.clone());
                }
            }
        }

        if entries.is_empty() {
            return Err(ScrubError::EmptyMapping {
                collection: self.registry.to_string(),
                field: self.email_field.to_string(),
            });
        }

        stats.mapped_addresses = entries.len();
        stats.excluded_addresses = excluded.len();
        tracing::info!(
            mapped = stats.mapped_addresses,
            excluded = stats.excluded_addresses,
            scanned = stats.records_scanned,
            "loaded identity mapping"
        );

        Ok((IdentityMap { entries }, stats))
    }
}
