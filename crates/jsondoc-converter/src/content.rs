//! Content resolution: one string per matched item

use crate::error::ConverterError;
use crate::selector::Selector;
use jsondoc_domain::CompiledQuery;
use jsondoc_query::type_name;
use serde_json::{Map, Value};
use std::fmt::Display;

/// Resolve the content string of `item`
///
/// Without a selector the item itself is the content. With `flatten`, object
/// and array content is flattened to `a_b_0`-style keys before it is written.
pub fn resolve_content<Q>(
    item: &Value,
    selector: Option<&Selector<Q>>,
    flatten: bool,
) -> Result<String, ConverterError>
where
    Q: CompiledQuery,
    Q::Error: Display,
{
    let value = match selector {
        None => item.clone(),
        Some(Selector::Key(key)) => {
            let object = item.as_object().ok_or_else(|| {
                ConverterError::ItemResolution(format!(
                    "cannot look up content key '{}' on a {} item",
                    key,
                    type_name(item)
                ))
            })?;
            object
                .get(key)
                .cloned()
                .ok_or_else(|| ConverterError::ItemResolution(format!("content key '{}' not found", key)))?
        }
        Some(Selector::Query(query)) => query
            .first(item)
            .map_err(|e| {
                ConverterError::ItemResolution(format!(
                    "content query '{}' failed: {}",
                    query.expression(),
                    e
                ))
            })?
            .unwrap_or(Value::Null),
    };

    if flatten {
        Ok(coerce_to_text(&flatten_value(&value)))
    } else {
        Ok(coerce_to_text(&value))
    }
}

/// Turn a JSON value into document text
///
/// Strings are kept verbatim, `null` and `{}` become empty, everything else
/// is written as compact JSON.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}

/// Flatten nested objects and arrays into a single-level object
///
/// Path segments are joined with `_`; array elements use their index.
/// Empty containers are kept as leaf values. Scalars are returned unchanged.
pub fn flatten_value(value: &Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let mut flat = Map::new();
            flatten_into(value, None, &mut flat);
            Value::Object(flat)
        }
        other => other.clone(),
    }
}

fn flatten_into(value: &Value, prefix: Option<&str>, out: &mut Map<String, Value>) {
    let join = |segment: &str| match prefix {
        Some(p) => format!("{}_{}", p, segment),
        None => segment.to_string(),
    };

    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(child, Some(&join(key)), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (idx, child) in items.iter().enumerate() {
                flatten_into(child, Some(&join(&idx.to_string())), out);
            }
        }
        leaf => {
            if let Some(p) = prefix {
                out.insert(p.to_string(), leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondoc_domain::QueryEngine;
    use jsondoc_query::{JqEngine, JqQuery};
    use serde_json::json;

    fn query(expr: &str) -> Selector<JqQuery> {
        Selector::Query(JqEngine::new().compile(expr).unwrap())
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce_to_text(&json!("plain")), "plain");
        assert_eq!(coerce_to_text(&json!(null)), "");
        assert_eq!(coerce_to_text(&json!({})), "");
        assert_eq!(coerce_to_text(&json!(8.95)), "8.95");
        assert_eq!(coerce_to_text(&json!(true)), "true");
        assert_eq!(coerce_to_text(&json!([1, 2])), "[1,2]");
        assert_eq!(coerce_to_text(&json!({"b": 1, "a": 2})), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_no_selector() {
        let item = json!({"title": "Sayings"});
        assert_eq!(
            resolve_content::<JqQuery>(&item, None, false).unwrap(),
            r#"{"title":"Sayings"}"#
        );
    }

    #[test]
    fn test_key_selector() {
        let item = json!({"title": "Sayings", "price": 8.95});
        let title = Selector::Key("title".to_string());
        let price = Selector::Key("price".to_string());
        assert_eq!(resolve_content::<JqQuery>(&item, Some(&title), false).unwrap(), "Sayings");
        assert_eq!(resolve_content::<JqQuery>(&item, Some(&price), false).unwrap(), "8.95");
    }

    #[test]
    fn test_key_selector_missing_key() {
        let item = json!({"title": "Sayings"});
        let selector = Selector::Key("motivation".to_string());
        assert!(matches!(
            resolve_content::<JqQuery>(&item, Some(&selector), false),
            Err(ConverterError::ItemResolution(_))
        ));
    }

    #[test]
    fn test_key_selector_non_object() {
        let selector = Selector::Key("title".to_string());
        let err = resolve_content::<JqQuery>(&json!([1]), Some(&selector), false).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_query_selector() {
        let item = json!({"tags": ["a", "b"], "n": 3});
        assert_eq!(resolve_content(&item, Some(&query(".tags[]")), false).unwrap(), "a");
        assert_eq!(resolve_content(&item, Some(&query(".missing")), false).unwrap(), "");
        assert_eq!(resolve_content(&item, Some(&query("empty")), false).unwrap(), "");
        assert_eq!(resolve_content(&item, Some(&query(".n")), false).unwrap(), "3");
    }

    #[test]
    fn test_flatten_value() {
        let nested = json!({
            "store": {
                "book": [
                    {"category": "fiction", "price": 8.95},
                    {"category": "non-fiction", "tags": []}
                ]
            }
        });
        assert_eq!(
            flatten_value(&nested),
            json!({
                "store_book_0_category": "fiction",
                "store_book_0_price": 8.95,
                "store_book_1_category": "non-fiction",
                "store_book_1_tags": []
            })
        );
        assert_eq!(flatten_value(&json!(["a", {"b": 1}])), json!({"0": "a", "1_b": 1}));
        assert_eq!(flatten_value(&json!("text")), json!("text"));
    }

    #[test]
    fn test_flattened_content() {
        let item = json!({"a": {"b": 1}, "c": "x"});
        let content = resolve_content::<JqQuery>(&item, None, true).unwrap();
        assert_eq!(content, r#"{"a_b":1,"c":"x"}"#);

        let selector = Selector::Key("c".to_string());
        assert_eq!(resolve_content::<JqQuery>(&item, Some(&selector), true).unwrap(), "x");
    }

    #[test]
    fn test_query_selector_error() {
        let item = json!({"n": 3});
        assert!(matches!(
            resolve_content(&item, Some(&query(".n[]")), false),
            Err(ConverterError::ItemResolution(_))
        ));
    }
}
