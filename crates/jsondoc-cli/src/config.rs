//! Configuration management for the CLI.

use crate::cli::ConverterArgs;
use crate::error::{CliError, Result};
use jsondoc_converter::ConverterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Converter settings
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// One JSON document per line
    Jsonl,
    /// Table format
    Table,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".jsondoc").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(&path)
            .map_err(|e| CliError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply command-line overrides to the file's converter settings.
    pub fn converter_config(&self, args: &ConverterArgs) -> Result<ConverterConfig> {
        let mut config = self.converter.clone();

        if let Some(query) = &args.query {
            config.query = query.clone();
        }
        if let Some(key) = &args.content_key {
            config = config.with_content_key(key.clone());
        }
        if let Some(expr) = &args.content_query {
            config = config.with_content_query(expr.clone());
        }
        if !args.meta_fields.is_empty() {
            config = config.with_meta_fields(args.meta_fields.iter().cloned());
        }
        if !args.meta_queries.is_empty() {
            config = config.with_meta_queries(args.meta_queries.iter().cloned());
        }
        if args.flatten {
            config.flatten = true;
        }
        if args.json_lines {
            config.json_lines = true;
        }
        if let Some(key) = &args.sequence_key {
            config = config.with_sequence_key(key.clone());
        }
        if let Some(key) = &args.source_key {
            config = config.with_source_key(key.clone());
        }

        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Json,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}
