//! jsondoc Domain Layer
//!
//! This crate contains the shared vocabulary of jsondoc: the `Document` record
//! produced by conversion, the normalized `ByteSource` form of an input, and the
//! trait interfaces behind which the query engine and the byte-source resolver live.
//!
//! ## Key Concepts
//!
//! - **Document**: content string plus an ordered metadata mapping
//! - **ByteSource**: raw bytes with attached metadata, independent of storage
//! - **SourceRef**: what a caller hands in (path, URI, or in-memory bytes)
//! - **QueryEngine / CompiledQuery**: compile once, evaluate many times
//! - **SourceResolver**: turns a `SourceRef` into a `ByteSource`
//!
//! ## Architecture
//!
//! - Only `serde` / `serde_json` as external dependencies
//! - No I/O in this crate
//! - Implementations of the traits live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use document::{Document, Meta};
pub use source::{ByteSource, SourceRef};
pub use traits::{CompiledQuery, Evaluation, QueryEngine, SourceResolver};
