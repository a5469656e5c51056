//! Validated newtypes shared across the Mailveil workspace.
//!
//! Collection and field names are interpolated into SQL identifiers by the
//! SQLite store backend, so both are restricted to a conservative identifier
//! charset at construction time rather than at the query site.

use crate::error::MailveilError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("valid identifier regex"));

/// Newtype for collection names with validation.
///
/// Collection names must be identifiers: a letter or underscore followed by
/// up to 63 letters, digits, or underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionName(String);

impl CollectionName {
    /// Create a new `CollectionName` from a string.
    ///
    /// # Errors
    /// Returns error if the name is not a valid identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, MailveilError> {
        let name = name.into();
        if IDENTIFIER_REGEX.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(MailveilError::Validation(format!(
                "invalid collection name: must be an identifier, got '{name}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for document field names with validation.
///
/// Field names follow the same identifier rules as collection names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldName(String);

impl FieldName {
    /// Create a new `FieldName` from a string.
    ///
    /// # Errors
    /// Returns error if the name is not a valid identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, MailveilError> {
        let name = name.into();
        if IDENTIFIER_REGEX.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(MailveilError::Validation(format!(
                "invalid field name: must be an identifier, got '{name}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A (collection, field) pair naming where rewriting must occur.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetField {
    /// Collection holding the documents to rewrite
    pub collection: CollectionName,
    /// Free-text field within each document
    pub field: FieldName,
}

impl TargetField {
    /// Parse a `collection.field` specification string.
    ///
    /// # Errors
    /// Returns error if the string is not exactly two identifiers joined
    /// by a single dot.
    pub fn parse(spec: &str) -> Result<Self, MailveilError> {
        let (collection, field) = spec.split_once('.').ok_or_else(|| {
            MailveilError::Validation(format!(
                "invalid target field '{spec}': expected 'collection.field'"
            ))
        })?;

        Ok(Self {
            collection: CollectionName::new(collection)?,
            field: FieldName::new(field)?,
        })
    }

    /// Parse a comma-separated list of `collection.field` specifications.
    ///
    /// # Errors
    /// Returns error on the first malformed entry.
    pub fn parse_list(specs: &str) -> Result<Vec<Self>, MailveilError> {
        specs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.collection, self.field)
    }
}
