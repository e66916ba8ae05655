//! Metadata resolution: configured fields pulled from each item

use crate::error::ConverterError;
use crate::selector::Selector;
use jsondoc_domain::{CompiledQuery, Meta};
use jsondoc_query::type_name;
use serde_json::Value;
use std::fmt::Display;
use tracing::warn;

/// Resolve every configured field of `item`, preserving field order
///
/// Missing keys and empty query results become `null`. A failing query field
/// is logged and also becomes `null`; it never fails the item. Plain keys on
/// a non-object item do fail the item.
pub fn resolve_metadata<Q>(item: &Value, fields: &[(String, Selector<Q>)]) -> Result<Meta, ConverterError>
where
    Q: CompiledQuery,
    Q::Error: Display,
{
    let mut meta = Meta::new();

    for (name, selector) in fields {
        let value = match selector {
            Selector::Key(key) => {
                let object = item.as_object().ok_or_else(|| {
                    ConverterError::ItemResolution(format!(
                        "cannot look up metadata key '{}' on a {} item",
                        key,
                        type_name(item)
                    ))
                })?;
                object.get(key).cloned().unwrap_or(Value::Null)
            }
            Selector::Query(query) => match resolve_query_field(name, query, item) {
                Ok(value) => value,
                Err(e) => {
                    warn!("{}", e);
                    Value::Null
                }
            },
        };
        meta.insert(name.clone(), value);
    }

    Ok(meta)
}

fn resolve_query_field<Q>(name: &str, query: &Q, item: &Value) -> Result<Value, ConverterError>
where
    Q: CompiledQuery,
    Q::Error: Display,
{
    query
        .first(item)
        .map(|first| first.unwrap_or(Value::Null))
        .map_err(|e| ConverterError::MetadataField {
            field: name.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorMode;
    use crate::selector::compile_fields;
    use jsondoc_query::{JqEngine, JqQuery};
    use serde_json::json;

    fn fields(mode: SelectorMode, names: &[&str]) -> Vec<(String, Selector<JqQuery>)> {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        compile_fields(&JqEngine::new(), mode, &names).unwrap()
    }

    #[test]
    fn test_no_fields() {
        let meta = resolve_metadata::<JqQuery>(&json!({"id": 1}), &[]).unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn test_key_fields_absent_is_null() {
        let meta = resolve_metadata(&json!({"id": 1}), &fields(SelectorMode::Key, &["id", "name"])).unwrap();
        assert_eq!(Value::Object(meta), json!({"id": 1, "name": null}));
    }

    #[test]
    fn test_key_fields_preserve_order() {
        let item = json!({"a": 1, "b": 2, "c": 3});
        let meta = resolve_metadata(&item, &fields(SelectorMode::Key, &["c", "a"])).unwrap();
        let keys: Vec<_> = meta.keys().cloned().collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn test_key_fields_on_scalar_fail() {
        let result = resolve_metadata(&json!("text"), &fields(SelectorMode::Key, &["id"]));
        assert!(matches!(result, Err(ConverterError::ItemResolution(_))));
    }

    #[test]
    fn test_query_fields() {
        let item = json!({"author": {"name": "Nigel Rees"}, "tags": []});
        let meta = resolve_metadata(
            &item,
            &fields(SelectorMode::Query, &["author=.author.name", ".tags[]"]),
        )
        .unwrap();
        assert_eq!(
            Value::Object(meta),
            json!({"author": "Nigel Rees", ".tags[]": null})
        );
    }

    #[test]
    fn test_query_field_error_becomes_null() {
        let item = json!({"n": 3, "m": 4});
        let meta = resolve_metadata(&item, &fields(SelectorMode::Query, &["bad=.n[]", "m=.m"])).unwrap();
        assert_eq!(Value::Object(meta), json!({"bad": null, "m": 4}));
    }
}
