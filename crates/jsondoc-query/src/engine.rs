//! `QueryEngine` implementation backed by the jq-subset evaluator

use crate::error::QueryError;
use crate::eval::eval_into;
use crate::expr::Expr;
use crate::parser::parse;
use jsondoc_domain::{CompiledQuery, Evaluation, QueryEngine};
use serde_json::Value;
use tracing::debug;

/// The default query backend
#[derive(Debug, Clone, Copy, Default)]
pub struct JqEngine;

impl JqEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }
}

impl QueryEngine for JqEngine {
    type Query = JqQuery;
    type Error = QueryError;

    fn compile(&self, expression: &str) -> Result<JqQuery, QueryError> {
        let expr = parse(expression)?;
        debug!("Compiled query '{}'", expression);
        Ok(JqQuery {
            source: expression.to_string(),
            expr,
        })
    }
}

/// A compiled jq-subset query
#[derive(Debug, Clone, PartialEq)]
pub struct JqQuery {
    source: String,
    expr: Expr,
}

impl JqQuery {
    /// Parsed expression tree
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl CompiledQuery for JqQuery {
    type Error = QueryError;

    fn evaluate_partial(&self, input: &Value) -> Evaluation<QueryError> {
        let mut values = Vec::new();
        let error = eval_into(&self.expr, input, &mut values).err();
        Evaluation { values, error }
    }

    fn expression(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_and_reuse() {
        let query = JqEngine::new().compile(".name").unwrap();
        assert_eq!(query.expression(), ".name");

        assert_eq!(query.evaluate(&json!({"name": "a"})).unwrap(), vec![json!("a")]);
        assert_eq!(query.evaluate(&json!({"name": "b"})).unwrap(), vec![json!("b")]);
    }

    #[test]
    fn test_first() {
        let query = JqEngine::new().compile(".[]").unwrap();
        assert_eq!(query.first(&json!([3, 4])).unwrap(), Some(json!(3)));
        assert_eq!(query.first(&json!([])).unwrap(), None);
        assert!(query.first(&json!(1)).is_err());
    }

    #[test]
    fn test_partial_results_before_error() {
        let query = JqEngine::new().compile(".[].a").unwrap();
        let input = json!([{"a": "x"}, 5, {"a": "y"}]);

        let partial = query.evaluate_partial(&input);
        assert_eq!(partial.values, vec![json!("x")]);
        assert!(matches!(partial.error, Some(QueryError::Eval(_))));

        assert!(query.evaluate(&input).is_err());
        assert_eq!(query.first(&input).unwrap(), Some(json!("x")));
    }

    #[test]
    fn test_compile_error() {
        let result = JqEngine::new().compile(".a[");
        assert!(matches!(result, Err(QueryError::Parse { .. })));
    }
}
