//! Mailveil Core - Foundation crate for the Mailveil anonymizer.
//!
//! This crate provides shared types, error handling, configuration management,
//! and the email address matcher that all other Mailveil crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Validated newtypes (`CollectionName`, `FieldName`, `TargetField`)
//! - [`email`] - The fixed email address grammar and matcher
//!
//! # Example
//!
//! ```rust
//! use mailveil_core::{find_addresses, TargetField};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let target = TargetField::parse("commit.message")?;
//! assert_eq!(target.collection.as_str(), "commit");
//!
//! let found = find_addresses("ping jane@example.org about the release");
//! assert_eq!(found, vec!["jane@example.org"]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod email;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, RegistryConfig, RunConfig};
pub use email::find_addresses;
pub use error::{ConfigError, ConfigResult, MailveilError, Result};
pub use types::{CollectionName, FieldName, TargetField};
