//! jsondoc Query
//!
//! A jq-style query language over `serde_json::Value`, exposed to the rest of
//! jsondoc through the `QueryEngine` / `CompiledQuery` traits.
//!
//! # Supported Syntax
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `.` | Identity |
//! | `.foo`, `."foo"`, `.["foo"]` | Field access (null when missing) |
//! | `.[0]`, `.[-1]` | Array index (null when out of range) |
//! | `.[2:5]` | Slice |
//! | `.[]` | Iterate array elements or object values |
//! | `.foo?`, `.[]?` | Suppress errors from that step |
//! | `..` | Recursive descent |
//! | `a \| b` | Pipe |
//! | `a, b` | Comma |
//! | `[a]`, `{k: a}` | Array / object construction |
//! | `==`, `!=`, `<`, `<=`, `>`, `>=` | Comparison |
//! | `and`, `or`, `not` | Boolean logic |
//! | `a // b` | Alternative |
//! | `select(f)`, `length`, `keys`, `has(k)`, `type`, `tostring`, `empty` | Builtins |
//!
//! # Example
//!
//! ```
//! use jsondoc_domain::{CompiledQuery, QueryEngine};
//! use jsondoc_query::JqEngine;
//! use serde_json::json;
//!
//! let query = JqEngine::new().compile(".users[].name").unwrap();
//! let names = query
//!     .evaluate(&json!({"users": [{"name": "Alice"}, {"name": "Bob"}]}))
//!     .unwrap();
//! assert_eq!(names, vec![json!("Alice"), json!("Bob")]);
//! ```

mod engine;
mod error;
mod eval;
mod expr;
mod parser;

pub use engine::{JqEngine, JqQuery};
pub use error::QueryError;
pub use eval::{compare_values, eval, eval_into, is_truthy, type_name};
pub use expr::{Builtin, CompareOp, Expr, ObjectEntry, ObjectKey};
pub use parser::parse;
