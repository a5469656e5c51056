//! Mailveil Scrub - the email anonymization pipeline.
//!
//! This crate holds the two-stage core: building a collision-safe
//! email-to-identity mapping from a people registry, and rewriting free-text
//! fields across document collections with batched retrieval.
//!
//! # Stages
//!
//! 1. [`IdentityMapBuilder`] scans the registry and produces a read-only
//!    [`IdentityMap`] held in memory for the run.
//! 2. [`ScrubPipeline`] walks each configured target field using
//!    [`BatchScanner`] windows, applies [`rewrite`] to every document
//!    carrying the field, and writes back only modified values.
//!
//! # Example
//!
//! ```rust,ignore
//! use mailveil_core::{CollectionName, FieldName, TargetField};
//! use mailveil_scrub::{IdentityMapBuilder, ScrubPipeline};
//!
//! let builder = IdentityMapBuilder::new(
//!     CollectionName::new("people")?,
//!     FieldName::new("email")?,
//! );
//! let (map, stats) = builder.build(&store).await?;
//!
//! let targets = vec![TargetField::parse("commit.message")?];
//! let report = ScrubPipeline::new(&store).run(&targets, &map).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod identity_map;
pub mod pipeline;
pub mod report;
pub mod rewriter;
pub mod scanner;

// Re-export commonly used types
pub use error::{Result, ScrubError};
pub use identity_map::{BuildStats, IdentityMap, IdentityMapBuilder, DEFAULT_THRESHOLD};
pub use pipeline::ScrubPipeline;
pub use report::{FieldReport, RunReport};
pub use rewriter::{rewrite, RewriteOutcome};
pub use scanner::{BatchScanner, DocumentWindows, DEFAULT_WINDOW_SIZE};
