//! Evaluator for query expressions over `serde_json::Value`.
//!
//! Every expression maps one input to zero or more outputs. Outputs are
//! produced in document order so callers can rely on `first()`. An error ends
//! the output stream but does not retract what was produced before it, so
//! `.[].a` on `[{"a": 1}, 2]` yields `1` and then fails.

use crate::error::QueryError;
use crate::expr::{Builtin, CompareOp, Expr, ObjectEntry, ObjectKey};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluate an expression against a value.
pub fn eval(expr: &Expr, input: &Value) -> Result<Vec<Value>, QueryError> {
    let mut out = Vec::new();
    eval_into(expr, input, &mut out)?;
    Ok(out)
}

/// Evaluate an expression, appending outputs to `out`.
///
/// On error, `out` holds every output produced before the failure.
pub fn eval_into(expr: &Expr, input: &Value, out: &mut Vec<Value>) -> Result<(), QueryError> {
    match expr {
        Expr::Identity => out.push(input.clone()),

        Expr::Field(name) => out.push(match input {
            Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
            Value::Null => Value::Null,
            other => {
                return Err(QueryError::eval(format!(
                    "cannot index {} with \"{}\"",
                    type_name(other),
                    name
                )))
            }
        }),

        Expr::Index(idx) => out.push(match input {
            Value::Array(items) => resolve_index(items.len(), *idx)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null),
            Value::Null => Value::Null,
            other => {
                return Err(QueryError::eval(format!(
                    "cannot index {} with number",
                    type_name(other)
                )))
            }
        }),

        Expr::Slice { start, end } => out.push(match input {
            Value::Array(items) => {
                let (from, to) = slice_bounds(items.len(), *start, *end);
                Value::Array(items[from..to].to_vec())
            }
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (from, to) = slice_bounds(chars.len(), *start, *end);
                Value::String(chars[from..to].iter().collect())
            }
            Value::Null => Value::Null,
            other => return Err(QueryError::eval(format!("cannot slice {}", type_name(other)))),
        }),

        Expr::Iterate => match input {
            Value::Array(items) => out.extend(items.iter().cloned()),
            Value::Object(map) => out.extend(map.values().cloned()),
            other => {
                return Err(QueryError::eval(format!(
                    "cannot iterate over {}",
                    type_name(other)
                )))
            }
        },

        // The error stops the inner stream; earlier outputs stay.
        Expr::Optional(inner) => {
            let _ = eval_into(inner, input, out);
        }

        Expr::Pipe(stages) => eval_pipe(stages, input, out)?,

        Expr::Comma(branches) => {
            for branch in branches {
                eval_into(branch, input, out)?;
            }
        }

        Expr::Array(inner) => out.push(Value::Array(eval(inner, input)?)),

        Expr::Object(entries) => out.extend(eval_object(entries, input)?),

        Expr::Literal(value) => out.push(value.clone()),

        Expr::RecursiveDescent => descend(input, out),

        Expr::Compare { op, left, right } => {
            let lhs = eval(left, input)?;
            let rhs = eval(right, input)?;
            for l in &lhs {
                for r in &rhs {
                    out.push(Value::Bool(apply_compare(*op, l, r)));
                }
            }
        }

        Expr::And(left, right) => {
            for l in eval(left, input)? {
                if !is_truthy(&l) {
                    out.push(Value::Bool(false));
                    continue;
                }
                for r in eval(right, input)? {
                    out.push(Value::Bool(is_truthy(&r)));
                }
            }
        }

        Expr::Or(left, right) => {
            for l in eval(left, input)? {
                if is_truthy(&l) {
                    out.push(Value::Bool(true));
                    continue;
                }
                for r in eval(right, input)? {
                    out.push(Value::Bool(is_truthy(&r)));
                }
            }
        }

        Expr::Not => out.push(Value::Bool(!is_truthy(input))),

        Expr::Alternative(left, right) => {
            let mut produced = Vec::new();
            let _ = eval_into(left, input, &mut produced);
            let kept: Vec<Value> = produced.into_iter().filter(is_truthy).collect();
            if kept.is_empty() {
                eval_into(right, input, out)?;
            } else {
                out.extend(kept);
            }
        }

        Expr::Builtin(builtin) => eval_builtin(builtin, input, out)?,
    }
    Ok(())
}

/// Feed each output of the first stage through the remaining stages.
///
/// Outputs the first stage produced before failing still flow downstream
/// before its error is returned.
fn eval_pipe(stages: &[Expr], input: &Value, out: &mut Vec<Value>) -> Result<(), QueryError> {
    let Some((first, rest)) = stages.split_first() else {
        out.push(input.clone());
        return Ok(());
    };

    let mut produced = Vec::new();
    let result = eval_into(first, input, &mut produced);
    for value in &produced {
        eval_pipe(rest, value, out)?;
    }
    result
}

fn eval_object(entries: &[ObjectEntry], input: &Value) -> Result<Vec<Value>, QueryError> {
    // Each entry may produce several values; the result is their cross product.
    let mut partials = vec![Map::new()];
    for entry in entries {
        let keys = match &entry.key {
            ObjectKey::Literal(name) => vec![name.clone()],
            ObjectKey::Expr(key_expr) => eval(key_expr, input)?
                .into_iter()
                .map(|k| match k {
                    Value::String(s) => Ok(s),
                    other => Err(QueryError::eval(format!(
                        "object keys must be strings, got {}",
                        type_name(&other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let values = eval(&entry.value, input)?;

        let mut expanded = Vec::with_capacity(partials.len() * keys.len() * values.len());
        for partial in &partials {
            for key in &keys {
                for value in &values {
                    let mut map = partial.clone();
                    map.insert(key.clone(), value.clone());
                    expanded.push(map);
                }
            }
        }
        partials = expanded;
    }
    Ok(partials.into_iter().map(Value::Object).collect())
}

fn eval_builtin(builtin: &Builtin, input: &Value, out: &mut Vec<Value>) -> Result<(), QueryError> {
    match builtin {
        Builtin::Select(cond) => {
            let mut conditions = Vec::new();
            let result = eval_into(cond, input, &mut conditions);
            for c in &conditions {
                if is_truthy(c) {
                    out.push(input.clone());
                }
            }
            result?;
        }

        Builtin::Length => out.push(match input {
            Value::Null => Value::from(0),
            Value::Number(n) => n
                .as_i64()
                .map(|i| Value::from(i.unsigned_abs()))
                .or_else(|| n.as_f64().map(|f| Value::from(f.abs())))
                .unwrap_or(Value::Null),
            Value::String(s) => Value::from(s.chars().count()),
            Value::Array(items) => Value::from(items.len()),
            Value::Object(map) => Value::from(map.len()),
            Value::Bool(_) => return Err(QueryError::eval("boolean has no length")),
        }),

        Builtin::Keys => out.push(match input {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                Value::Array(keys.into_iter().map(|k| Value::String(k.clone())).collect())
            }
            Value::Array(items) => Value::Array((0..items.len()).map(Value::from).collect()),
            other => return Err(QueryError::eval(format!("{} has no keys", type_name(other)))),
        }),

        Builtin::Has(key) => {
            for k in eval(key, input)? {
                let found = match (input, &k) {
                    (Value::Object(map), Value::String(name)) => map.contains_key(name),
                    (Value::Array(items), Value::Number(n)) => n
                        .as_i64()
                        .is_some_and(|i| i >= 0 && (i as usize) < items.len()),
                    (container, key) => {
                        return Err(QueryError::eval(format!(
                            "cannot check whether {} has a {} key",
                            type_name(container),
                            type_name(key)
                        )));
                    }
                };
                out.push(Value::Bool(found));
            }
        }

        Builtin::Type => out.push(Value::String(type_name(input).to_string())),

        Builtin::ToString => out.push(match input {
            Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }),

        Builtin::Empty => {}
    }
    Ok(())
}

/// jq truthiness: everything except `null` and `false`.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// jq type name of a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn resolve_index(len: usize, idx: i64) -> Option<usize> {
    if idx < 0 {
        let back = idx.unsigned_abs() as usize;
        len.checked_sub(back)
    } else {
        Some(idx as usize)
    }
}

fn slice_bounds(len: usize, start: Option<i64>, end: Option<i64>) -> (usize, usize) {
    let clamp = |i: i64| -> usize {
        if i < 0 {
            len.saturating_sub(i.unsigned_abs() as usize)
        } else {
            (i as usize).min(len)
        }
    };
    let from = start.map(clamp).unwrap_or(0);
    let to = end.map(clamp).unwrap_or(len);
    (from, to.max(from))
}

fn descend(value: &Value, out: &mut Vec<Value>) {
    out.push(value.clone());
    match value {
        Value::Array(items) => items.iter().for_each(|item| descend(item, out)),
        Value::Object(map) => map.values().for_each(|item| descend(item, out)),
        _ => {}
    }
}

fn apply_compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    let ord = compare_values(left, right);
    match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Ne => ord != Ordering::Equal,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Le => ord != Ordering::Greater,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Ge => ord != Ordering::Less,
    }
}

/// Total order used by jq: null < false < true < numbers < strings < arrays < objects.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let mut a_keys: Vec<&String> = a.keys().collect();
            let mut b_keys: Vec<&String> = b.keys().collect();
            a_keys.sort();
            b_keys.sort();
            let by_keys = a_keys.cmp(&b_keys);
            if by_keys != Ordering::Equal {
                return by_keys;
            }
            for key in a_keys {
                let ord = compare_values(&a[key.as_str()], &b[key.as_str()]);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
        _ => rank(left).cmp(&rank(right)),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i32>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ]
    }

    proptest! {
        /// Property: the ordering is antisymmetric
        #[test]
        fn test_compare_antisymmetric(a in scalar(), b in scalar()) {
            prop_assert_eq!(compare_values(&a, &b), compare_values(&b, &a).reverse());
        }

        /// Property: identity returns its input unchanged
        #[test]
        fn test_identity(v in scalar()) {
            prop_assert_eq!(eval(&Expr::Identity, &v).unwrap(), vec![v.clone()]);
        }
    }
}
