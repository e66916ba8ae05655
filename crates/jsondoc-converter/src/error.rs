//! Error types for the converter

use thiserror::Error;

/// Errors that can occur during conversion
///
/// Only `Config` ever escapes `JsonConverter::new` / `JsonConverter::run`.
/// The other kinds are caught at their scope, logged and recorded as
/// `ConversionFailure`s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConverterError {
    /// Invalid configuration or arguments; fatal for the whole call
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source could not be read
    #[error("Could not read {origin}: {message}")]
    SourceRead {
        /// Source descriptor
        origin: String,
        /// Underlying error
        message: String,
    },

    /// A source was read but is not valid JSON / JSON Lines
    #[error("Could not parse {origin}: {message}")]
    Parse {
        /// Source descriptor
        origin: String,
        /// Underlying error
        message: String,
    },

    /// A single matched item could not be turned into a document
    #[error("Item resolution error: {0}")]
    ItemResolution(String),

    /// A single metadata field could not be resolved
    #[error("Metadata field '{field}' failed: {message}")]
    MetadataField {
        /// Field name or expression
        field: String,
        /// Underlying error
        message: String,
    },
}
