//! Request and response types for conversion

use crate::error::ConverterError;
use jsondoc_domain::{Document, Meta};
use serde::Serialize;
use std::fmt;

/// Caller-supplied metadata for a `run` call
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MetaInput {
    /// No caller metadata
    #[default]
    None,

    /// One mapping applied to every source
    Shared(Meta),

    /// One mapping per source, zipped with the sources in order
    PerSource(Vec<Meta>),
}

impl MetaInput {
    /// Expand into exactly one mapping per source
    ///
    /// A per-source list whose length differs from `source_count` is a
    /// configuration error for the whole call.
    pub fn normalize(self, source_count: usize) -> Result<Vec<Meta>, ConverterError> {
        match self {
            MetaInput::None => Ok(vec![Meta::new(); source_count]),
            MetaInput::Shared(meta) => Ok(vec![meta; source_count]),
            MetaInput::PerSource(list) => {
                if list.len() != source_count {
                    return Err(ConverterError::Config(format!(
                        "meta list has {} entries but {} sources were given",
                        list.len(),
                        source_count
                    )));
                }
                Ok(list)
            }
        }
    }
}

impl From<Meta> for MetaInput {
    fn from(meta: Meta) -> Self {
        MetaInput::Shared(meta)
    }
}

impl From<Vec<Meta>> for MetaInput {
    fn from(list: Vec<Meta>) -> Self {
        MetaInput::PerSource(list)
    }
}

impl From<Option<Meta>> for MetaInput {
    fn from(meta: Option<Meta>) -> Self {
        meta.map_or(MetaInput::None, MetaInput::Shared)
    }
}

/// Result of a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    /// Documents in source order, then item order
    pub documents: Vec<Document>,

    /// Every recoverable failure that was skipped over
    pub failures: Vec<ConversionFailure>,

    /// Counters describing the run
    pub stats: ConversionStats,
}

/// Stage at which a unit of work was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Bytes could not be obtained; the source was skipped
    SourceRead,
    /// Bytes were not valid JSON; the source was skipped
    Parse,
    /// The main query failed on a parsed value; its items were skipped
    Query,
    /// One item failed content or metadata resolution
    ItemResolution,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::SourceRead => "source read",
            FailureStage::Parse => "parse",
            FailureStage::Query => "query",
            FailureStage::ItemResolution => "item resolution",
        };
        f.write_str(name)
    }
}

/// Information about a unit of work that was dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionFailure {
    /// Source descriptor
    pub source: String,

    /// Where it failed
    pub stage: FailureStage,

    /// Index of the item within its source, for item failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,

    /// Reason for failure
    pub reason: String,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_index {
            Some(index) => write!(
                f,
                "{} failed for item {} of {}: {}",
                self.stage, index, self.source, self.reason
            ),
            None => write!(f, "{} failed for {}: {}", self.stage, self.source, self.reason),
        }
    }
}

/// Counters about a conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Sources passed to `run`
    pub sources_total: usize,

    /// Sources skipped at read or parse time
    pub sources_skipped: usize,

    /// Items produced by the query across all parsed sources
    pub items_matched: usize,

    /// Matched items that failed resolution
    pub items_dropped: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}
