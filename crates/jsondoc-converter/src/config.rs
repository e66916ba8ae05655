//! Configuration for the converter

use crate::error::ConverterError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a content selector or metadata field is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorMode {
    /// Plain key lookup on the matched object
    #[default]
    Key,
    /// Query expression evaluated against the matched item
    Query,
}

/// Configuration for the converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Query selecting the items that become documents
    pub query: String,

    /// Where each item's content comes from (the whole item when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,

    /// Interpretation of `content_key`
    #[serde(default)]
    pub content_mode: SelectorMode,

    /// Flatten object and array content to single-level `a_b_0` keys
    #[serde(default)]
    pub flatten: bool,

    /// Metadata fields resolved per item, in output order
    #[serde(default)]
    pub meta_fields: Vec<String>,

    /// Interpretation of `meta_fields`
    #[serde(default)]
    pub meta_mode: SelectorMode,

    /// Parse input as JSON Lines instead of a single document
    #[serde(default)]
    pub json_lines: bool,

    /// Metadata key receiving the zero-based item index within its source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_key: Option<String>,

    /// Metadata key receiving the source descriptor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,
}

impl ConverterConfig {
    /// Create a configuration for the given query with everything else defaulted
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Take content from a plain key of each item
    pub fn with_content_key(mut self, key: impl Into<String>) -> Self {
        self.content_key = Some(key.into());
        self.content_mode = SelectorMode::Key;
        self
    }

    /// Take content from the first result of a query run on each item
    pub fn with_content_query(mut self, expression: impl Into<String>) -> Self {
        self.content_key = Some(expression.into());
        self.content_mode = SelectorMode::Query;
        self
    }

    /// Toggle flattening of structured content
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Resolve metadata fields as plain keys
    pub fn with_meta_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_fields = fields.into_iter().map(Into::into).collect();
        self.meta_mode = SelectorMode::Key;
        self
    }

    /// Resolve metadata fields as query expressions (`name=expr` or `expr`)
    pub fn with_meta_queries<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_fields = fields.into_iter().map(Into::into).collect();
        self.meta_mode = SelectorMode::Query;
        self
    }

    /// Toggle JSON Lines parsing
    pub fn with_json_lines(mut self, json_lines: bool) -> Self {
        self.json_lines = json_lines;
        self
    }

    /// Inject the item index under `key`
    pub fn with_sequence_key(mut self, key: impl Into<String>) -> Self {
        self.sequence_key = Some(key.into());
        self
    }

    /// Inject the source descriptor under `key`
    pub fn with_source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }
        if let Some(key) = &self.content_key {
            if key.trim().is_empty() {
                return Err("content_key must not be empty when set".to_string());
            }
        }

        let mut seen = HashSet::new();
        for field in &self.meta_fields {
            if field.trim().is_empty() {
                return Err("meta_fields must not contain empty names".to_string());
            }
            if !seen.insert(field.as_str()) {
                return Err(format!("meta field '{}' is listed more than once", field));
            }
        }

        for (name, key) in [("sequence_key", &self.sequence_key), ("source_key", &self.source_key)] {
            if matches!(key, Some(k) if k.trim().is_empty()) {
                return Err(format!("{} must not be empty when set", name));
            }
        }
        if self.sequence_key.is_some() && self.sequence_key == self.source_key {
            return Err("sequence_key and source_key must differ".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConverterError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConverterError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&contents).map_err(ConverterError::Config)?;
        config.validate().map_err(ConverterError::Config)?;
        Ok(config)
    }
}

impl Default for ConverterConfig {
    /// Whole input as a single item, content is the serialized item
    fn default() -> Self {
        Self {
            query: ".".to_string(),
            content_key: None,
            content_mode: SelectorMode::Key,
            flatten: false,
            meta_fields: Vec::new(),
            meta_mode: SelectorMode::Key,
            json_lines: false,
            sequence_key: None,
            source_key: None,
        }
    }
}
