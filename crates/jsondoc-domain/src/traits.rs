//! Trait definitions for external interactions
//!
//! These traits define the boundaries between conversion logic and the
//! capabilities it consumes. Implementations live in other crates.

use crate::{ByteSource, SourceRef};
use serde_json::Value;

/// Trait for JSON query backends
///
/// Implemented by the query layer (jsondoc-query)
pub trait QueryEngine {
    /// Compiled form produced by this engine
    type Query: CompiledQuery;

    /// Error type for compilation failures
    type Error;

    /// Compile an expression into a reusable query
    fn compile(&self, expression: &str) -> Result<Self::Query, Self::Error>;
}

/// A compiled, immutable query
///
/// Evaluating never mutates the query, so one instance can be applied to
/// any number of values.
pub trait CompiledQuery {
    /// Error type for evaluation failures
    type Error;

    /// Evaluate against a value, keeping every result produced before an error
    fn evaluate_partial(&self, input: &Value) -> Evaluation<Self::Error>;

    /// Evaluate against a value, returning every result in order
    fn evaluate(&self, input: &Value) -> Result<Vec<Value>, Self::Error> {
        self.evaluate_partial(input).into_result()
    }

    /// Evaluate and keep only the first result
    ///
    /// An error raised after the first result has been produced is ignored.
    fn first(&self, input: &Value) -> Result<Option<Value>, Self::Error> {
        let Evaluation { values, error } = self.evaluate_partial(input);
        match (values.into_iter().next(), error) {
            (Some(value), _) => Ok(Some(value)),
            (None, Some(err)) => Err(err),
            (None, None) => Ok(None),
        }
    }

    /// The expression this query was compiled from
    fn expression(&self) -> &str;
}

/// Results of one query evaluation, in order
///
/// When `error` is set, evaluation stopped early and `values` holds what was
/// produced before the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<E> {
    /// Results produced, in order
    pub values: Vec<Value>,
    /// The error that ended evaluation, if any
    pub error: Option<E>,
}

impl<E> Evaluation<E> {
    /// An evaluation that ran to completion
    pub fn complete(values: Vec<Value>) -> Self {
        Self { values, error: None }
    }

    /// Discard partial results if evaluation failed
    pub fn into_result(self) -> Result<Vec<Value>, E> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.values),
        }
    }
}

/// Trait for turning caller-supplied sources into bytes
///
/// Implemented by the converter layer (jsondoc-converter)
pub trait SourceResolver {
    /// Error type for read failures
    type Error;

    /// Read a source into a normalized byte buffer with metadata
    fn resolve(&self, source: &SourceRef) -> Result<ByteSource, Self::Error>;
}
