//! Convert command implementation.

use crate::cli::ConvertArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use jsondoc_converter::{ConversionResult, JsonConverter};
use jsondoc_domain::{ByteSource, Meta, SourceRef};
use serde_json::Value;
use std::io::Read;

const STDIN_SOURCE: &str = "-";

/// Execute the convert command.
///
/// `stdin` is only read when one of the sources is `-`.
pub fn execute_convert<I: Read>(
    args: ConvertArgs,
    config: &Config,
    mut stdin: I,
) -> Result<ConversionResult> {
    let converter_config = config.converter_config(&args.converter)?;
    let meta = parse_meta_pairs(&args.meta)?;

    let stdin_count = args.sources.iter().filter(|s| *s == STDIN_SOURCE).count();
    if stdin_count > 1 {
        return Err(CliError::InvalidInput(
            "stdin ('-') can only be given once".to_string(),
        ));
    }

    let mut sources = Vec::with_capacity(args.sources.len());
    for source in &args.sources {
        if source == STDIN_SOURCE {
            let mut buffer = Vec::new();
            stdin.read_to_end(&mut buffer)?;
            sources.push(SourceRef::Stream(ByteSource::new(buffer)));
        } else {
            sources.push(SourceRef::parse(source));
        }
    }

    let converter = JsonConverter::with_defaults(converter_config)?;
    Ok(converter.run(&sources, meta)?)
}

/// Parse `KEY=VALUE` pairs; values are read as JSON when possible, else as text.
pub fn parse_meta_pairs(pairs: &[String]) -> Result<Meta> {
    let mut meta = Meta::new();
    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            CliError::InvalidInput(format!("metadata '{}' must be KEY=VALUE", pair))
        })?;
        if key.is_empty() {
            return Err(CliError::InvalidInput(format!(
                "metadata '{}' has an empty key",
                pair
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        meta.insert(key.to_string(), value);
    }
    Ok(meta)
}
