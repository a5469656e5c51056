//! Run statistics, accumulated per target field and returned to the caller.
//!
//! Purely observational: reports are logged at the end of each field and at
//! run end, never persisted.

use chrono::{DateTime, Utc};
use mailveil_core::TargetField;
use std::time::Duration;

/// Statistics for one (collection, field) target.
#[derive(Debug, Clone)]
pub struct FieldReport {
    /// The target this report describes
    pub target: TargetField,
    /// Documents that carried the target field
    pub documents_scanned: u64,
    /// Address-like substrings found, duplicates included
    pub addresses_found: u64,
    /// Substrings actually replaced (found and mapped)
    pub addresses_replaced: u64,
    /// Single-document writes that failed twice and were skipped
    pub write_failures: u64,
    /// Wall-clock time spent on this target
    pub elapsed: Duration,
}

impl FieldReport {
    pub(crate) fn new(target: TargetField) -> Self {
        Self {
            target,
            documents_scanned: 0,
            addresses_found: 0,
            addresses_replaced: 0,
            write_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Log the per-field summary lines.
    pub fn log(&self) {
        tracing::info!(target = %self.target, "replacement statistics:");
        tracing::info!("searched fields: {}", self.documents_scanned);
        tracing::info!("found emails:    {}", self.addresses_found);
        tracing::info!("replaced emails: {}", self.addresses_replaced);
        if self.write_failures > 0 {
            tracing::info!("failed writes:   {}", self.write_failures);
        }
        tracing::info!("time needed:     {:.3} s", self.elapsed.as_secs_f64());
    }
}

/// Statistics for a whole run, one entry per configured target.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// When the pipeline started processing targets
    pub started_at: DateTime<Utc>,
    /// When the last target finished
    pub finished_at: DateTime<Utc>,
    /// Per-target reports, in configuration order
    pub fields: Vec<FieldReport>,
}

impl RunReport {
    /// Total documents scanned across all targets.
    #[must_use]
    pub fn total_documents(&self) -> u64 {
        self.fields.iter().map(|f| f.documents_scanned).sum()
    }

    /// Total addresses found across all targets.
    #[must_use]
    pub fn total_found(&self) -> u64 {
        self.fields.iter().map(|f| f.addresses_found).sum()
    }

    /// Total addresses replaced across all targets.
    #[must_use]
    pub fn total_replaced(&self) -> u64 {
        self.fields.iter().map(|f| f.addresses_replaced).sum()
    }

    /// Total writes skipped after a failed retry.
    #[must_use]
    pub fn total_write_failures(&self) -> u64 {
        self.fields.iter().map(|f| f.write_failures).sum()
    }
}
