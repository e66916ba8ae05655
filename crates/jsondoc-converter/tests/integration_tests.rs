//! Integration tests for jsondoc-converter
//!
//! These tests read real files from disk through the default `FileResolver`.

use jsondoc_converter::{ConverterConfig, FailureStage, JsonConverter, MetaInput};
use jsondoc_domain::{Meta, SourceRef};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with warnings captured, returning its result and the log text
fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

fn laureate_config() -> ConverterConfig {
    ConverterConfig::new(".prizes[].laureates[]?")
        .with_content_key("motivation")
        .with_meta_fields(["id", "firstname", "surname", "born"])
}

#[test]
fn test_prize_fixture() {
    let converter = JsonConverter::with_defaults(laureate_config()).unwrap();
    let path = fixture("prize.json");

    let result = converter
        .run(&[SourceRef::from(path.as_path())], MetaInput::None)
        .unwrap();

    assert_eq!(result.documents.len(), 4);
    assert!(result.failures.is_empty());

    let first = &result.documents[0];
    assert_eq!(
        first.content(),
        "for groundbreaking experiments regarding entangled quantum states"
    );
    assert_eq!(
        Value::Object(first.meta().clone()),
        json!({
            "file_path": path.display().to_string(),
            "id": "1",
            "firstname": "John",
            "surname": "Williams",
            "born": "1975-03-15"
        })
    );

    let surnames: Vec<_> = result
        .documents
        .iter()
        .map(|d| d.meta_value("surname").cloned().unwrap_or(Value::Null))
        .collect();
    assert_eq!(
        surnames,
        vec![json!("Williams"), json!("Johnson"), json!("Smith"), json!("Garcia")]
    );
}

#[test]
fn test_prize_fixture_without_optional() {
    // The literature prize has no laureates, so iterating it fails
    let config = ConverterConfig::new(".prizes[].laureates[]").with_content_key("motivation");
    let converter = JsonConverter::with_defaults(config).unwrap();

    let result = converter
        .run(&[SourceRef::from(fixture("prize.json"))], MetaInput::None)
        .unwrap();

    // Laureates of the earlier prizes are still converted
    assert_eq!(result.documents.len(), 4);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].stage, FailureStage::Query);
    assert_eq!(result.failures[0].item_index, Some(4));
}

#[test]
fn test_category_query_fields() {
    let config = ConverterConfig::new(".prizes[] | select(.category == \"physics\") | .laureates[]")
        .with_content_query(".firstname")
        .with_meta_queries(["name=.surname", "solo=.share == \"1\""]);
    let converter = JsonConverter::with_defaults(config).unwrap();

    let result = converter
        .run(&[SourceRef::from(fixture("prize.json"))], MetaInput::None)
        .unwrap();

    let contents: Vec<_> = result.documents.iter().map(|d| d.content()).collect();
    assert_eq!(contents, vec!["John", "Susan"]);
    assert_eq!(result.documents[1].meta_value("name"), Some(&json!("Johnson")));
    assert_eq!(result.documents[1].meta_value("solo"), Some(&json!(false)));
}

#[test]
fn test_unreadable_source_among_readable() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"[{"text": "hello"}]"#).unwrap();
    let missing = dir.path().join("missing.json");

    let config = ConverterConfig::new(".[]").with_content_key("text");
    let converter = JsonConverter::with_defaults(config).unwrap();

    let (result, logs) = capture_warnings(|| {
        converter
            .run(
                &[SourceRef::from(missing.as_path()), SourceRef::from(good.as_path())],
                MetaInput::None,
            )
            .unwrap()
    });

    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.documents[0].content(), "hello");
    assert_eq!(result.stats.sources_skipped, 1);

    let failure = &result.failures[0];
    assert_eq!(failure.stage, FailureStage::SourceRead);
    assert_eq!(failure.source, missing.display().to_string());

    let warning = logs
        .lines()
        .find(|line| line.contains("WARN"))
        .expect("a warning for the unreadable source");
    assert!(warning.contains(&missing.display().to_string()), "{}", warning);
}

#[test]
fn test_json_lines_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{"id": 1, "body": "first"}}"#).unwrap();
    writeln!(file).unwrap();
    writeln!(file, r#"{{"id": 2, "body": "second"}}"#).unwrap();

    let config = ConverterConfig::new(".")
        .with_json_lines(true)
        .with_content_key("body")
        .with_sequence_key("line");
    let converter = JsonConverter::with_defaults(config).unwrap();

    let result = converter
        .run(&[SourceRef::from(file.path())], MetaInput::None)
        .unwrap();

    assert_eq!(result.documents.len(), 2);
    assert_eq!(result.documents[1].content(), "second");
    assert_eq!(result.documents[1].meta_value("line"), Some(&json!(1)));
}

#[test]
fn test_file_uri_and_unsupported_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.json");
    std::fs::write(&path, r#""from uri""#).unwrap();

    let converter = JsonConverter::with_defaults(ConverterConfig::default()).unwrap();
    let sources = [
        SourceRef::from(format!("file://{}", path.display())),
        SourceRef::from("https://example.com/a.json"),
    ];

    let result = converter.run(&sources, MetaInput::None).unwrap();

    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.documents[0].content(), "from uri");
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].reason.contains("unsupported URI scheme"));
}

#[test]
fn test_caller_meta_does_not_override_file_fields() {
    let converter = JsonConverter::with_defaults(laureate_config()).unwrap();

    let mut caller = Meta::new();
    caller.insert("id".to_string(), json!("overridden"));
    caller.insert("collection".to_string(), json!("nobel"));

    let result = converter
        .run(&[SourceRef::from(fixture("prize.json"))], caller)
        .unwrap();

    for document in &result.documents {
        assert_eq!(document.meta_value("collection"), Some(&json!("nobel")));
        assert_ne!(document.meta_value("id"), Some(&json!("overridden")));
    }
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jsondoc.toml");
    std::fs::write(
        &path,
        r#"
query = ".prizes[].laureates[]?"
content_key = "motivation"
meta_fields = ["id"]
source_key = "origin"
"#,
    )
    .unwrap();

    let config = ConverterConfig::from_file(&path).unwrap();
    let converter = JsonConverter::with_defaults(config).unwrap();
    let source = fixture("prize.json");

    let result = converter
        .run(&[SourceRef::from(source.as_path())], MetaInput::None)
        .unwrap();

    assert_eq!(result.documents.len(), 4);
    assert_eq!(
        result.documents[3].meta_value("origin"),
        Some(&json!(source.display().to_string()))
    );
}
