//! Expression AST for jq-style queries.

use serde_json::Value;

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identity: `.`
    Identity,

    /// Field access: `.foo`, `."foo"`, `.["foo"]`
    Field(String),

    /// Array index: `.[0]`, `.[-1]`
    Index(i64),

    /// Array slice: `.[2:5]`, `.[2:]`, `.[:5]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
    },

    /// Iterate elements or object values: `.[]`
    Iterate,

    /// Error suppression: `term?`
    Optional(Box<Expr>),

    /// Each stage is fed every output of the previous one: `a | b`, `.a.b`
    Pipe(Vec<Expr>),

    /// Outputs of all branches in order: `a, b`
    Comma(Vec<Expr>),

    /// Collect all outputs into one array: `[a]`
    Array(Box<Expr>),

    /// Object construction: `{a: .x, (.k): .v}`
    Object(Vec<ObjectEntry>),

    /// Literal value
    Literal(Value),

    /// Recursive descent: `..`
    RecursiveDescent,

    /// Comparison: `a == b`, `a < b`, ...
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Boolean AND: `a and b`
    And(Box<Expr>, Box<Expr>),

    /// Boolean OR: `a or b`
    Or(Box<Expr>, Box<Expr>),

    /// Boolean NOT, applied to the input: `not`
    Not,

    /// Alternative: `a // b`
    Alternative(Box<Expr>, Box<Expr>),

    /// Builtin function
    Builtin(Builtin),
}

impl Expr {
    /// Build a pipe, flattening nested pipes and collapsing single stages.
    pub fn pipe(stages: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(stages.len());
        for stage in stages {
            match stage {
                Expr::Pipe(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Expr::Pipe(flat)
        }
    }

    /// Build a comma expression, collapsing a single branch.
    pub fn comma(mut branches: Vec<Expr>) -> Expr {
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            Expr::Comma(branches)
        }
    }
}

/// Builtin functions.
#[derive(Debug, Clone, PartialEq)]
pub enum Builtin {
    /// `select(f)` - emit the input when `f` is truthy
    Select(Box<Expr>),
    /// `length`
    Length,
    /// `keys` - sorted object keys or array indices
    Keys,
    /// `has(k)`
    Has(Box<Expr>),
    /// `type`
    Type,
    /// `tostring`
    ToString,
    /// `empty` - no output
    Empty,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// One `key: value` pair in object construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: ObjectKey,
    pub value: Expr,
}

/// Object construction key.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    /// `foo:` or `"foo":`
    Literal(String),
    /// `(expr):`
    Expr(Box<Expr>),
}
