//! Error types for query compilation and evaluation

use thiserror::Error;

/// Errors raised by the query engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Expression could not be parsed
    #[error("parse error at position {position}: {message}")]
    Parse {
        /// What went wrong
        message: String,
        /// Byte offset into the expression
        position: usize,
    },

    /// Expression is not applicable to the value it was run against
    #[error("evaluation error: {0}")]
    Eval(String),
}

impl QueryError {
    pub(crate) fn parse(message: impl Into<String>, position: usize) -> Self {
        QueryError::Parse {
            message: message.into(),
            position,
        }
    }

    pub(crate) fn eval(message: impl Into<String>) -> Self {
        QueryError::Eval(message.into())
    }
}
