//! Selectors shared by content and metadata resolution

use crate::config::SelectorMode;
use crate::error::ConverterError;
use jsondoc_domain::QueryEngine;
use std::fmt::Display;

/// A compiled selector: plain key lookup or query
#[derive(Debug, Clone, PartialEq)]
pub enum Selector<Q> {
    /// Look up this key on the item
    Key(String),
    /// Evaluate this query against the item
    Query(Q),
}

impl<Q> Selector<Q> {
    /// Build a selector in the given mode, compiling queries up front
    pub fn compile<E>(engine: &E, mode: SelectorMode, text: &str) -> Result<Self, ConverterError>
    where
        E: QueryEngine<Query = Q>,
        E::Error: Display,
    {
        match mode {
            SelectorMode::Key => Ok(Selector::Key(text.to_string())),
            SelectorMode::Query => engine
                .compile(text)
                .map(Selector::Query)
                .map_err(|e| ConverterError::Config(format!("invalid query '{}': {}", text, e))),
        }
    }
}

/// Compile metadata fields into `(output key, selector)` pairs
///
/// In query mode a field may be written `name=expr`; otherwise the output key
/// is the field text itself.
pub fn compile_fields<E>(
    engine: &E,
    mode: SelectorMode,
    fields: &[String],
) -> Result<Vec<(String, Selector<E::Query>)>, ConverterError>
where
    E: QueryEngine,
    E::Error: Display,
{
    fields
        .iter()
        .map(|field| {
            let (name, text) = match mode {
                SelectorMode::Key => (field.as_str(), field.as_str()),
                SelectorMode::Query => split_named(field),
            };
            Ok((name.to_string(), Selector::compile(engine, mode, text)?))
        })
        .collect()
}

/// Split `name=expr` when the prefix is an identifier and the `=` is not `==`
fn split_named(field: &str) -> (&str, &str) {
    if let Some((name, rest)) = field.split_once('=') {
        let name = name.trim();
        if is_identifier(name) && !rest.starts_with('=') && !rest.trim().is_empty() {
            return (name, rest.trim());
        }
    }
    (field, field)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondoc_domain::CompiledQuery;
    use jsondoc_query::{JqEngine, JqQuery};

    #[test]
    fn test_key_selector() {
        let selector: Selector<JqQuery> =
            Selector::compile(&JqEngine::new(), SelectorMode::Key, ".not.a.query").unwrap();
        assert_eq!(selector, Selector::Key(".not.a.query".to_string()));
    }

    #[test]
    fn test_invalid_query_is_config_error() {
        let result = Selector::compile(&JqEngine::new(), SelectorMode::Query, ".a[");
        assert!(matches!(result, Err(ConverterError::Config(_))));
    }

    #[test]
    fn test_named_fields() {
        let fields = vec![
            "author=.author".to_string(),
            ".price".to_string(),
            ".a == 1".to_string(),
        ];
        let compiled = compile_fields(&JqEngine::new(), SelectorMode::Query, &fields).unwrap();
        let names: Vec<_> = compiled.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["author", ".price", ".a == 1"]);

        match &compiled[0].1 {
            Selector::Query(q) => assert_eq!(q.expression(), ".author"),
            other => panic!("expected query selector, got {:?}", other),
        }
    }

    #[test]
    fn test_key_mode_keeps_equals() {
        let fields = vec!["a=b".to_string()];
        let compiled = compile_fields(&JqEngine::new(), SelectorMode::Key, &fields).unwrap();
        assert_eq!(compiled[0].0, "a=b");
        assert_eq!(compiled[0].1, Selector::Key("a=b".to_string()));
    }
}
