//! jsondoc Converter
//!
//! Turns JSON and JSON Lines sources into `Document`s using a query.
//!
//! # Overview
//!
//! A `JsonConverter` is built once from a `ConverterConfig`. The main query
//! selects items from every parsed source; each item becomes one document whose
//! content comes from the whole item, a key, or a nested query, and whose
//! metadata is layered from the source, the caller and the item itself.
//!
//! # Architecture
//!
//! ```text
//! SourceRef → SourceResolver → bytes → JSON → query → items
//!     → content + metadata → merge → Document
//! ```
//!
//! # Failure Isolation
//!
//! - **Source**: unreadable or unparsable sources are skipped
//! - **Item**: an item whose content or metadata cannot be resolved is dropped
//! - **Metadata field**: a failing query field becomes `null`
//!
//! Every skip is logged with `tracing` and recorded in
//! `ConversionResult::failures`.
//!
//! # Example Usage
//!
//! ```
//! use jsondoc_converter::{ConverterConfig, JsonConverter, MetaInput};
//! use jsondoc_domain::{ByteSource, SourceRef};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConverterConfig::new(".store.book[]")
//!     .with_content_key("title")
//!     .with_meta_fields(["author"]);
//! let converter = JsonConverter::with_defaults(config)?;
//!
//! let source = SourceRef::from(ByteSource::from_text(
//!     r#"{"store": {"book": [{"title": "Sayings", "author": "Nigel Rees"}]}}"#,
//! ));
//! let result = converter.run(&[source], MetaInput::None)?;
//!
//! assert_eq!(result.documents[0].content(), "Sayings");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod content;
mod converter;
mod error;
mod merge;
mod metadata;
mod parser;
mod selector;
pub mod source;
mod types;


pub use config::{ConverterConfig, SelectorMode};
pub use content::{coerce_to_text, flatten_value, resolve_content};
pub use converter::JsonConverter;
pub use error::ConverterError;
pub use merge::{merge_layers, positional_fields};
pub use metadata::resolve_metadata;
pub use parser::{parse_payload, PayloadError};
pub use selector::{compile_fields, Selector};
pub use source::{FileResolver, SourceError};
pub use types::{ConversionFailure, ConversionResult, ConversionStats, FailureStage, MetaInput};
