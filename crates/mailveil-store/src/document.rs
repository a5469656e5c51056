//! The opaque document record exchanged with a store backend.

use serde_json::{Map, Value as JsonValue};

/// A record in a collection: an identifier plus a JSON field map.
///
/// Mailveil never interprets fields beyond the one it is asked to rewrite;
/// everything else passes through the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier of the document within its collection
    pub id: String,
    /// Field map as stored
    pub fields: Map<String, JsonValue>,
}

impl Document {
    /// Create an empty document with the given id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field assignment.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field as text, if it is present and a non-null string.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(JsonValue::as_str)
    }
}
