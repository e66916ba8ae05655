//! Byte-source resolution for paths, `file://` URIs and in-memory streams

use jsondoc_domain::{ByteSource, SourceRef, SourceResolver};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file could not be read
    #[error("failed to read {path}: {error}")]
    Read {
        /// Path that was attempted
        path: String,
        /// Underlying I/O error
        #[source]
        error: std::io::Error,
    },

    /// The URI scheme has no reader
    #[error("unsupported URI scheme in '{0}'")]
    Unsupported(String),
}

/// Resolver for local files and in-memory bytes
///
/// Files get a `file_path` metadata entry. Streams are passed through with
/// whatever metadata they already carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl FileResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    fn read_path(&self, path: &Path) -> Result<ByteSource, SourceError> {
        let data = std::fs::read(path).map_err(|error| SourceError::Read {
            path: path.display().to_string(),
            error,
        })?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(ByteSource::new(data)
            .with_meta_entry("file_path", Value::String(path.display().to_string())))
    }
}

impl SourceResolver for FileResolver {
    type Error = SourceError;

    fn resolve(&self, source: &SourceRef) -> Result<ByteSource, SourceError> {
        match source {
            SourceRef::Path(path) => self.read_path(path),
            SourceRef::Uri(uri) => match uri.strip_prefix("file://") {
                Some(rest) => self.read_path(&PathBuf::from(rest)),
                None => Err(SourceError::Unsupported(uri.clone())),
            },
            SourceRef::Stream(bytes) => Ok(bytes.clone()),
        }
    }
}
