//! Layered metadata merging

use jsondoc_domain::Meta;
use serde_json::Value;

/// Merge metadata layers left to right; later layers overwrite earlier keys
///
/// Keys keep the position of their first appearance.
pub fn merge_layers<'a, I>(layers: I) -> Meta
where
    I: IntoIterator<Item = &'a Meta>,
{
    let mut merged = Meta::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Positional fields injected after everything else
pub fn positional_fields(
    sequence_key: Option<&str>,
    index: usize,
    source_key: Option<&str>,
    source: &str,
) -> Meta {
    let mut meta = Meta::new();
    if let Some(key) = sequence_key {
        meta.insert(key.to_string(), Value::from(index));
    }
    if let Some(key) = source_key {
        meta.insert(key.to_string(), Value::String(source.to_string()));
    }
    meta
}
