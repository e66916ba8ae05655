//! Input sources and their normalized byte form

use crate::document::Meta;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Raw bytes plus the metadata attached to them
///
/// This is what every kind of input is reduced to before parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ByteSource {
    /// Raw payload
    pub data: Vec<u8>,

    /// Metadata describing the payload (e.g. `file_path`)
    pub meta: Meta,
}

impl ByteSource {
    /// Create a byte source without metadata
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            meta: Meta::new(),
        }
    }

    /// Create a byte source from UTF-8 text
    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }

    /// Attach metadata, replacing whatever was there
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Attach a single metadata entry
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A reference to an input, as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRef {
    /// Local filesystem path
    Path(PathBuf),

    /// URI with an explicit scheme (e.g. `file:///data/a.json`)
    Uri(String),

    /// Bytes already in memory
    Stream(ByteSource),
}

impl SourceRef {
    /// Classify a string: `scheme://...` becomes a URI, anything else a path
    pub fn parse(s: &str) -> Self {
        match s.split_once("://") {
            Some((scheme, _)) if is_scheme(scheme) => SourceRef::Uri(s.to_string()),
            _ => SourceRef::Path(PathBuf::from(s)),
        }
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Path(path) => write!(f, "{}", path.display()),
            SourceRef::Uri(uri) => write!(f, "{}", uri),
            SourceRef::Stream(bytes) => match bytes.meta.get("file_path").and_then(Value::as_str) {
                Some(path) => write!(f, "<bytes from {}>", path),
                None => write!(f, "<{} bytes>", bytes.len()),
            },
        }
    }
}

impl From<&str> for SourceRef {
    fn from(s: &str) -> Self {
        SourceRef::parse(s)
    }
}

impl From<String> for SourceRef {
    fn from(s: String) -> Self {
        SourceRef::parse(&s)
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        SourceRef::Path(path)
    }
}

impl From<&std::path::Path> for SourceRef {
    fn from(path: &std::path::Path) -> Self {
        SourceRef::Path(path.to_path_buf())
    }
}

impl From<ByteSource> for SourceRef {
    fn from(bytes: ByteSource) -> Self {
        SourceRef::Stream(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_path() {
        assert_eq!(
            SourceRef::parse("data/prize.json"),
            SourceRef::Path(PathBuf::from("data/prize.json"))
        );
    }

    #[test]
    fn test_parse_uri() {
        assert!(matches!(SourceRef::parse("file:///tmp/a.json"), SourceRef::Uri(_)));
        assert!(matches!(SourceRef::parse("https://example.com/a.json"), SourceRef::Uri(_)));
    }

    #[test]
    fn test_windows_like_path_is_not_uri() {
        // "C:" is not followed by "//", so this stays a path
        assert!(matches!(SourceRef::parse("C:\\data\\a.json"), SourceRef::Path(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(SourceRef::from("a.json").to_string(), "a.json");

        let stream = ByteSource::from_text("{}");
        assert_eq!(SourceRef::from(stream).to_string(), "<2 bytes>");

        let named = ByteSource::from_text("{}").with_meta_entry("file_path", "b.json");
        assert_eq!(SourceRef::from(named).to_string(), "<bytes from b.json>");
    }

    #[test]
    fn test_byte_source_meta() {
        let source = ByteSource::from_text("[1]").with_meta_entry("origin", json!("test"));
        assert_eq!(source.len(), 3);
        assert!(!source.is_empty());
        assert_eq!(source.meta.get("origin"), Some(&json!("test")));
    }
}
