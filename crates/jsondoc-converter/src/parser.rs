//! Payload parsing: JSON documents and JSON Lines

use serde_json::Value;
use thiserror::Error;

/// Why a payload could not be parsed
#[derive(Error, Debug)]
pub enum PayloadError {
    /// Payload bytes are not UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Payload is not a single JSON document
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// A JSON Lines line is not valid JSON
    #[error("line {line}: {error}")]
    Line {
        /// One-based line number
        line: usize,
        /// Parser error for that line
        #[source]
        error: serde_json::Error,
    },
}

/// Parse raw bytes into one or more root values
///
/// A single document yields exactly one value. JSON Lines yields one value per
/// non-blank line; any bad line fails the whole payload.
pub fn parse_payload(data: &[u8], json_lines: bool) -> Result<Vec<Value>, PayloadError> {
    let text = std::str::from_utf8(data)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if !json_lines {
        return Ok(vec![serde_json::from_str(text)?]);
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|error| PayloadError::Line { line: idx + 1, error })
        })
        .collect()
}
