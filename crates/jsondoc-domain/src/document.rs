//! Document module - the unit handed to downstream indexing

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered metadata mapping.
///
/// Keys keep insertion order (serde_json is built with `preserve_order`),
/// so configured metadata fields come out in the order they were declared.
pub type Meta = Map<String, Value>;

/// A converted document
///
/// Documents are immutable once created: fields are private and only
/// exposed through accessors. Ownership moves to the caller with the
/// conversion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    #[serde(default)]
    meta: Meta,
}

impl Document {
    /// Create a new document
    ///
    /// # Examples
    ///
    /// ```
    /// use jsondoc_domain::{Document, Meta};
    ///
    /// let doc = Document::new("fiction", Meta::new());
    /// assert_eq!(doc.content(), "fiction");
    /// assert!(doc.meta().is_empty());
    /// ```
    pub fn new(content: impl Into<String>, meta: Meta) -> Self {
        Self {
            content: content.into(),
            meta,
        }
    }

    /// Textual content of the document
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Metadata attached to the document
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Look up a single metadata value
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Consume the document, returning content and metadata
    pub fn into_parts(self) -> (String, Meta) {
        (self.content, self.meta)
    }
}
