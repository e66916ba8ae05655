//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use jsondoc_converter::ConversionStats;
use jsondoc_domain::Document;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const CONTENT_PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format documents output.
    pub fn format_documents(&self, documents: &[Document]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
            OutputFormat::Jsonl => self.format_documents_jsonl(documents),
            OutputFormat::Table => self.format_documents_table(documents),
        }
    }

    /// Format documents as JSON Lines.
    fn format_documents_jsonl(&self, documents: &[Document]) -> Result<String> {
        let lines = documents
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    /// Format documents as a table.
    fn format_documents_table(&self, documents: &[Document]) -> Result<String> {
        if documents.is_empty() {
            return Ok(self.colorize("No documents produced.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Content", "Metadata"]);

        for (idx, document) in documents.iter().enumerate() {
            let meta = serde_json::to_string(document.meta())?;
            builder.push_record([
                idx.to_string(),
                preview(document.content(), CONTENT_PREVIEW_CHARS),
                meta,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        Ok(table.to_string())
    }

    /// Format the end-of-run summary.
    pub fn summary(&self, documents: usize, stats: &ConversionStats) -> String {
        let msg = format!(
            "{} document(s) from {} source(s); {} source(s) skipped, {} item(s) dropped in {} ms",
            documents,
            stats.sources_total,
            stats.sources_skipped,
            stats.items_dropped,
            stats.processing_time_ms
        );
        if stats.sources_skipped == 0 && stats.items_dropped == 0 {
            self.success(&msg)
        } else {
            self.warning(&msg)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Shorten text to at most `max` characters, marking the cut with an ellipsis.
fn preview(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let cut: String = single_line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondoc_domain::Meta;
    use serde_json::json;

    fn create_test_document() -> Document {
        let mut meta = Meta::new();
        meta.insert("id".to_string(), json!(1));
        meta.insert("author".to_string(), json!("Nigel Rees"));
        Document::new("Sayings of the Century", meta)
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_documents(&[create_test_document()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["content"], json!("Sayings of the Century"));
        assert_eq!(parsed[0]["meta"]["author"], json!("Nigel Rees"));
    }

    #[test]
    fn test_jsonl_format() {
        let formatter = Formatter::new(OutputFormat::Jsonl, false);
        let documents = vec![create_test_document(), create_test_document()];
        let output = formatter.format_documents(&documents).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"content":"Sayings of the Century""#));
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_documents(&[create_test_document()]).unwrap();
        assert!(output.contains("Content"));
        assert!(output.contains("Nigel Rees"));
    }

    #[test]
    fn test_empty_documents() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_documents(&[]).unwrap();
        assert!(output.contains("No documents produced"));

        let formatter = Formatter::new(OutputFormat::Json, false);
        assert_eq!(formatter.format_documents(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("line\nbreak", 20), "line break");
        assert_eq!(preview("abcdefghij", 5), "abcd…");
        assert_eq!(preview("ééééé", 3), "éé…");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }

    #[test]
    fn test_summary() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let clean = ConversionStats {
            sources_total: 1,
            ..ConversionStats::default()
        };
        assert!(formatter.summary(2, &clean).starts_with("✓ 2 document(s)"));

        let stats = ConversionStats {
            sources_total: 2,
            sources_skipped: 1,
            ..ConversionStats::default()
        };
        assert!(formatter.summary(3, &stats).starts_with("⚠ 3 document(s) from 2 source(s)"));
    }
}
