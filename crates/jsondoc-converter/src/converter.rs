//! Core converter implementation

use crate::config::ConverterConfig;
use crate::content::resolve_content;
use crate::error::ConverterError;
use crate::merge::{merge_layers, positional_fields};
use crate::metadata::resolve_metadata;
use crate::parser::parse_payload;
use crate::selector::{compile_fields, Selector};
use crate::source::FileResolver;
use crate::types::{ConversionFailure, ConversionResult, ConversionStats, FailureStage, MetaInput};
use jsondoc_domain::{
    CompiledQuery, Document, Evaluation, Meta, QueryEngine, SourceRef, SourceResolver,
};
use jsondoc_query::{JqEngine, JqQuery};
use serde_json::Value;
use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Turns JSON sources into `Document`s
///
/// All queries are compiled once in `new` and reused for every source of
/// every `run`.
#[derive(Debug)]
pub struct JsonConverter<Q, R> {
    query: Q,
    content: Option<Selector<Q>>,
    meta_fields: Vec<(String, Selector<Q>)>,
    resolver: R,
    config: ConverterConfig,
}

impl JsonConverter<JqQuery, FileResolver> {
    /// Create a converter with the built-in query engine and file resolver
    pub fn with_defaults(config: ConverterConfig) -> Result<Self, ConverterError> {
        Self::new(&JqEngine::new(), FileResolver::new(), config)
    }
}

impl<Q, R> JsonConverter<Q, R>
where
    Q: CompiledQuery,
    Q::Error: Display,
    R: SourceResolver,
    R::Error: Display,
{
    /// Create a new converter
    ///
    /// Validates the configuration and compiles every expression in it. Any
    /// problem is a `ConverterError::Config`.
    pub fn new<E>(engine: &E, resolver: R, config: ConverterConfig) -> Result<Self, ConverterError>
    where
        E: QueryEngine<Query = Q>,
        E::Error: Display,
    {
        config.validate().map_err(ConverterError::Config)?;

        let query = engine
            .compile(&config.query)
            .map_err(|e| ConverterError::Config(format!("invalid query '{}': {}", config.query, e)))?;
        let content = config
            .content_key
            .as_deref()
            .map(|key| Selector::compile(engine, config.content_mode, key))
            .transpose()?;
        let meta_fields = compile_fields(engine, config.meta_mode, &config.meta_fields)?;

        debug!(
            "Converter ready: query '{}', {} metadata fields",
            config.query,
            meta_fields.len()
        );

        Ok(Self {
            query,
            content,
            meta_fields,
            resolver,
            config,
        })
    }

    /// The configuration this converter was built from
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// The source resolver in use
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Convert every source into documents
    ///
    /// Unreadable or unparsable sources and unresolvable items are logged,
    /// recorded in `failures` and skipped. The only error returned is a
    /// `ConverterError::Config` for a per-source meta list whose length does
    /// not match `sources`, raised before anything is read.
    pub fn run(
        &self,
        sources: &[SourceRef],
        meta: impl Into<MetaInput>,
    ) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        let metas = meta.into().normalize(sources.len())?;

        info!(
            "Starting conversion of {} sources with query '{}'",
            sources.len(),
            self.config.query
        );

        let mut state = RunState::default();
        for (source, caller_meta) in sources.iter().zip(&metas) {
            self.convert_source(source, caller_meta, &mut state);
        }

        let stats = ConversionStats {
            sources_total: sources.len(),
            sources_skipped: state.sources_skipped,
            items_matched: state.items_matched,
            items_dropped: state.items_dropped,
            processing_time_ms: elapsed_ms(start.elapsed()),
        };

        info!(
            "Conversion complete: {} documents, {} sources skipped, {} items dropped",
            state.documents.len(),
            stats.sources_skipped,
            stats.items_dropped
        );

        Ok(ConversionResult {
            documents: state.documents,
            failures: state.failures,
            stats,
        })
    }

    /// Process one source; failures are recorded in `state`
    fn convert_source(&self, source: &SourceRef, caller_meta: &Meta, state: &mut RunState) {
        let descriptor = source.to_string();

        let bytes = match self.resolver.resolve(source) {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = ConverterError::SourceRead {
                    origin: descriptor.clone(),
                    message: e.to_string(),
                };
                warn!("Skipping source: {}", err);
                state.skip_source(descriptor, FailureStage::SourceRead, err);
                return;
            }
        };

        let roots = match parse_payload(&bytes.data, self.config.json_lines) {
            Ok(roots) => roots,
            Err(e) => {
                let err = ConverterError::Parse {
                    origin: descriptor.clone(),
                    message: e.to_string(),
                };
                warn!("Skipping source: {}", err);
                state.skip_source(descriptor, FailureStage::Parse, err);
                return;
            }
        };

        debug!("Parsed {} root values from {}", roots.len(), descriptor);

        let mut index = 0;
        for root in &roots {
            let Evaluation { values: items, error } = self.query.evaluate_partial(root);

            for item in &items {
                state.items_matched += 1;
                match self.build_document(item, &bytes.meta, caller_meta, index, &descriptor) {
                    Ok(document) => state.documents.push(document),
                    Err(e) => {
                        warn!("Dropping item {} of {}: {}", index, descriptor, e);
                        state.items_dropped += 1;
                        state.failures.push(ConversionFailure {
                            source: descriptor.clone(),
                            stage: FailureStage::ItemResolution,
                            item_index: Some(index),
                            reason: e.to_string(),
                        });
                    }
                }
                index += 1;
            }

            // Items produced before the error were kept above; the rest of this root is lost.
            if let Some(e) = error {
                warn!(
                    "Query '{}' failed at item {} of {}: {}",
                    self.query.expression(),
                    index,
                    descriptor,
                    e
                );
                state.failures.push(ConversionFailure {
                    source: descriptor.clone(),
                    stage: FailureStage::Query,
                    item_index: Some(index),
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Resolve one item into a document; all-or-nothing
    fn build_document(
        &self,
        item: &Value,
        source_meta: &Meta,
        caller_meta: &Meta,
        index: usize,
        descriptor: &str,
    ) -> Result<Document, ConverterError> {
        let content = resolve_content(item, self.content.as_ref(), self.config.flatten)?;
        let resolved = resolve_metadata(item, &self.meta_fields)?;
        let positional = positional_fields(
            self.config.sequence_key.as_deref(),
            index,
            self.config.source_key.as_deref(),
            descriptor,
        );

        let meta = merge_layers([source_meta, caller_meta, &resolved, &positional]);
        Ok(Document::new(content, meta))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
pub(crate) fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Per-call accumulator for `run`
#[derive(Default)]
struct RunState {
    documents: Vec<Document>,
    failures: Vec<ConversionFailure>,
    sources_skipped: usize,
    items_matched: usize,
    items_dropped: usize,
}

impl RunState {
    fn skip_source(&mut self, source: String, stage: FailureStage, err: ConverterError) {
        self.sources_skipped += 1;
        self.failures.push(ConversionFailure {
            source,
            stage,
            item_index: None,
            reason: err.to_string(),
        });
    }
}
