//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// jsondoc - Turn JSON and JSON Lines files into documents.
#[derive(Debug, Parser)]
#[command(name = "jsondoc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JSONDOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Pretty-printed JSON array (default)
    Json,
    /// One JSON document per line
    Jsonl,
    /// Table format
    Table,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert sources into documents
    Convert(ConvertArgs),

    /// Check that a query expression compiles
    Check(CheckArgs),

    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Converter settings that can be given on the command line.
///
/// Anything set here overrides the configuration file.
#[derive(Debug, Default, Args)]
pub struct ConverterArgs {
    /// Query selecting the items that become documents
    #[arg(short, long)]
    pub query: Option<String>,

    /// Take content from this key of each item
    #[arg(long, conflicts_with = "content_query")]
    pub content_key: Option<String>,

    /// Take content from the first result of this query on each item
    #[arg(long)]
    pub content_query: Option<String>,

    /// Metadata key to copy from each item (repeatable)
    #[arg(long = "meta-field", conflicts_with = "meta_queries")]
    pub meta_fields: Vec<String>,

    /// Metadata query, `name=expr` or `expr` (repeatable)
    #[arg(long = "meta-query")]
    pub meta_queries: Vec<String>,

    /// Flatten object and array content to single-level keys
    #[arg(long)]
    pub flatten: bool,

    /// Parse sources as JSON Lines
    #[arg(long)]
    pub json_lines: bool,

    /// Store each item's index under this metadata key
    #[arg(long)]
    pub sequence_key: Option<String>,

    /// Store each item's source under this metadata key
    #[arg(long)]
    pub source_key: Option<String>,
}

/// Arguments for the convert command.
#[derive(Debug, Parser)]
pub struct ConvertArgs {
    /// Files or `file://` URIs to read; `-` reads stdin
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Extra metadata for every document, as KEY=VALUE (repeatable)
    #[arg(short, long = "meta")]
    pub meta: Vec<String>,

    #[command(flatten)]
    pub converter: ConverterArgs,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// Query expression to compile
    #[arg(short, long)]
    pub query: String,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub converter: ConverterArgs,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Jsonl => crate::config::OutputFormat::Jsonl,
            CliFormat::Table => crate::config::OutputFormat::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_command() {
        let cli = Cli::parse_from([
            "jsondoc",
            "convert",
            "prize.json",
            "-",
            "--query",
            ".prizes[].laureates[]?",
            "--content-key",
            "motivation",
            "--meta-field",
            "id",
            "--meta-field",
            "surname",
            "--meta",
            "collection=nobel",
        ]);
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.sources, vec!["prize.json", "-"]);
                assert_eq!(args.converter.meta_fields, vec!["id", "surname"]);
                assert_eq!(args.meta, vec!["collection=nobel"]);
            }
            _ => panic!("Expected Convert command"),
        }
    }

    #[test]
    fn test_content_selectors_conflict() {
        let result = Cli::try_parse_from([
            "jsondoc",
            "convert",
            "a.json",
            "--content-key",
            "body",
            "--content-query",
            ".body",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["jsondoc", "-vv", "--format", "table", "check", "-q", "."]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, Some(CliFormat::Table)));
        assert!(matches!(cli.command, Command::Check(_)));
    }
}
