//! Parser for jq-style query expressions.
//!
//! Precedence, lowest first: `|`, `,`, `//`, `or`, `and`, comparisons,
//! postfix terms (`.foo`, `[0]`, `[]`, `?`).

use crate::error::QueryError;
use crate::expr::{Builtin, CompareOp, Expr, ObjectEntry, ObjectKey};
use serde_json::{Number, Value};

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Character after the current one.
    fn peek_second(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    fn lookahead(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.next();
            } else {
                break;
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<(), QueryError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.next();
                Ok(())
            }
            Some(c) => Err(QueryError::parse(
                format!("expected '{}', found '{}'", expected, c),
                self.pos,
            )),
            None => Err(QueryError::parse(
                format!("expected '{}', found end of input", expected),
                self.pos,
            )),
        }
    }

    /// Keyword at the current position, not followed by an identifier character.
    fn matches_keyword(&self, keyword: &str) -> bool {
        if !self.lookahead(keyword) {
            return false;
        }
        let after = &self.input[self.pos + keyword.len()..];
        !matches!(after.chars().next(), Some(c) if is_ident_char(c))
    }

    fn consume_keyword(&mut self, keyword: &str) {
        self.pos += keyword.len();
    }

    fn parse_ident(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                self.next();
            }
            Some(c) => {
                return Err(QueryError::parse(
                    format!("expected identifier, found '{}'", c),
                    self.pos,
                ));
            }
            None => {
                return Err(QueryError::parse(
                    "expected identifier, found end of input",
                    self.pos,
                ));
            }
        }
        while matches!(self.peek(), Some(c) if is_ident_char(c)) {
            self.next();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn consume_digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.next();
        }
        self.pos - start
    }

    fn parse_number_literal(&mut self) -> Result<Value, QueryError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.next();
        }
        if self.consume_digits() == 0 {
            return Err(QueryError::parse("expected digit", self.pos));
        }

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) {
            self.next();
            self.consume_digits();
            is_float = true;
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.next();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.next();
            }
            if self.consume_digits() == 0 {
                return Err(QueryError::parse("expected exponent digits", self.pos));
            }
            is_float = true;
        }

        let text = &self.input[start..self.pos];
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::from(i));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| QueryError::parse("invalid number", start))
    }

    fn parse_integer(&mut self) -> Result<i64, QueryError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.next();
        }
        if self.consume_digits() == 0 {
            return Err(QueryError::parse("expected integer", self.pos));
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| QueryError::parse("invalid integer", start))
    }

    fn parse_string_literal(&mut self) -> Result<String, QueryError> {
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.next() {
                None => return Err(QueryError::parse("unterminated string", self.pos)),
                Some('"') => break,
                Some('\\') => {
                    let escaped = match self.next() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\x08',
                        Some('f') => '\x0C',
                        Some('u') => self.parse_unicode_escape()?,
                        Some(c) => {
                            return Err(QueryError::parse(
                                format!("invalid escape sequence '\\{}'", c),
                                self.pos,
                            ));
                        }
                        None => return Err(QueryError::parse("unterminated string", self.pos)),
                    };
                    result.push(escaped);
                }
                Some(c) => result.push(c),
            }
        }

        Ok(result)
    }

    fn parse_unicode_escape(&mut self) -> Result<char, QueryError> {
        let start = self.pos;
        let hex: String = self.rest().chars().take(4).collect();
        if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(QueryError::parse("invalid unicode escape", start));
        }
        self.pos += 4;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| QueryError::parse("invalid unicode code point", start))
    }

    /// Bracket suffix for indexing: `[]`, `[0]`, `["key"]`, `[1:3]`.
    fn parse_index_bracket(&mut self) -> Result<Expr, QueryError> {
        self.expect('[')?;
        self.skip_ws();

        match self.peek() {
            Some(']') => {
                self.next();
                Ok(Expr::Iterate)
            }
            Some('"') => {
                let key = self.parse_string_literal()?;
                self.expect(']')?;
                Ok(Expr::Field(key))
            }
            Some(':') => {
                self.next();
                self.skip_ws();
                let end = if self.peek() == Some(']') {
                    None
                } else {
                    Some(self.parse_integer()?)
                };
                self.expect(']')?;
                Ok(Expr::Slice { start: None, end })
            }
            _ => {
                let first = self.parse_integer()?;
                self.skip_ws();
                match self.next() {
                    Some(']') => Ok(Expr::Index(first)),
                    Some(':') => {
                        self.skip_ws();
                        let end = if self.peek() == Some(']') {
                            None
                        } else {
                            Some(self.parse_integer()?)
                        };
                        self.expect(']')?;
                        Ok(Expr::Slice {
                            start: Some(first),
                            end,
                        })
                    }
                    Some(c) => Err(QueryError::parse(
                        format!("expected ']' or ':', found '{}'", c),
                        self.pos,
                    )),
                    None => Err(QueryError::parse(
                        "expected ']' or ':', found end of input",
                        self.pos,
                    )),
                }
            }
        }
    }

    /// Field name after a dot: identifier or quoted string.
    fn parse_dot_field(&mut self) -> Result<Expr, QueryError> {
        if self.peek() == Some('"') {
            Ok(Expr::Field(self.parse_string_literal()?))
        } else {
            Ok(Expr::Field(self.parse_ident()?))
        }
    }

    fn parse_array_construction(&mut self) -> Result<Expr, QueryError> {
        self.expect('[')?;
        self.skip_ws();
        if self.peek() == Some(']') {
            self.next();
            return Ok(Expr::Array(Box::new(Expr::Comma(vec![]))));
        }
        let inner = self.parse_pipe()?;
        self.expect(']')?;
        Ok(Expr::Array(Box::new(inner)))
    }

    fn parse_object_construction(&mut self) -> Result<Expr, QueryError> {
        self.expect('{')?;
        self.skip_ws();

        let mut entries = Vec::new();
        if self.peek() == Some('}') {
            self.next();
            return Ok(Expr::Object(entries));
        }

        loop {
            self.skip_ws();
            let key = match self.peek() {
                Some('(') => {
                    self.next();
                    let key_expr = self.parse_pipe()?;
                    self.expect(')')?;
                    ObjectKey::Expr(Box::new(key_expr))
                }
                Some('"') => ObjectKey::Literal(self.parse_string_literal()?),
                _ => ObjectKey::Literal(self.parse_ident()?),
            };

            self.skip_ws();
            let value = if self.peek() == Some(':') {
                self.next();
                self.skip_ws();
                self.parse_object_value()?
            } else {
                // `{foo}` is shorthand for `{foo: .foo}`
                match &key {
                    ObjectKey::Literal(name) => Expr::Field(name.clone()),
                    ObjectKey::Expr(_) => {
                        return Err(QueryError::parse(
                            "dynamic key requires explicit value",
                            self.pos,
                        ));
                    }
                }
            };
            entries.push(ObjectEntry { key, value });

            self.skip_ws();
            match self.next() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => {
                    return Err(QueryError::parse(
                        format!("expected ',' or '}}', found '{}'", c),
                        self.pos,
                    ));
                }
                None => {
                    return Err(QueryError::parse(
                        "expected ',' or '}', found end of input",
                        self.pos,
                    ));
                }
            }
        }

        Ok(Expr::Object(entries))
    }

    /// Object values stop at `,` so entries can be separated.
    fn parse_object_value(&mut self) -> Result<Expr, QueryError> {
        let mut stages = vec![self.parse_alternative()?];
        self.skip_ws();
        while self.peek() == Some('|') {
            self.next();
            self.skip_ws();
            stages.push(self.parse_alternative()?);
            self.skip_ws();
        }
        Ok(Expr::pipe(stages))
    }

    fn parse_primary(&mut self) -> Result<Expr, QueryError> {
        self.skip_ws();

        match self.peek() {
            Some('(') => {
                self.next();
                let expr = self.parse_pipe()?;
                self.expect(')')?;
                Ok(expr)
            }
            Some('[') => self.parse_array_construction(),
            Some('{') => self.parse_object_construction(),
            Some('"') => Ok(Expr::Literal(Value::String(self.parse_string_literal()?))),
            Some(c) if c.is_ascii_digit() => Ok(Expr::Literal(self.parse_number_literal()?)),
            Some('-') if matches!(self.peek_second(), Some(c) if c.is_ascii_digit()) => {
                Ok(Expr::Literal(self.parse_number_literal()?))
            }
            Some('.') => {
                self.next();
                match self.peek() {
                    Some('.') => {
                        self.next();
                        Ok(Expr::RecursiveDescent)
                    }
                    Some('[') => self.parse_index_bracket(),
                    Some(c) if c == '"' || is_ident_start(c) => self.parse_dot_field(),
                    _ => Ok(Expr::Identity),
                }
            }
            Some(c) if is_ident_start(c) => self.parse_keyword_or_builtin(),
            Some(c) => Err(QueryError::parse(
                format!("unexpected character '{}', expected expression", c),
                self.pos,
            )),
            None => Err(QueryError::parse("unexpected end of input", self.pos)),
        }
    }

    fn parse_keyword_or_builtin(&mut self) -> Result<Expr, QueryError> {
        const NULLARY: &[&str] = &["null", "true", "false", "not", "length", "keys", "type", "tostring", "empty"];

        for &word in NULLARY {
            if self.matches_keyword(word) {
                self.consume_keyword(word);
                return Ok(match word {
                    "null" => Expr::Literal(Value::Null),
                    "true" => Expr::Literal(Value::Bool(true)),
                    "false" => Expr::Literal(Value::Bool(false)),
                    "not" => Expr::Not,
                    "length" => Expr::Builtin(Builtin::Length),
                    "keys" => Expr::Builtin(Builtin::Keys),
                    "type" => Expr::Builtin(Builtin::Type),
                    "tostring" => Expr::Builtin(Builtin::ToString),
                    _ => Expr::Builtin(Builtin::Empty),
                });
            }
        }

        if self.matches_keyword("select") {
            self.consume_keyword("select");
            let arg = self.parse_call_argument()?;
            return Ok(Expr::Builtin(Builtin::Select(Box::new(arg))));
        }
        if self.matches_keyword("has") {
            self.consume_keyword("has");
            let arg = self.parse_call_argument()?;
            return Ok(Expr::Builtin(Builtin::Has(Box::new(arg))));
        }

        let start = self.pos;
        let name = self.parse_ident()?;
        Err(QueryError::parse(format!("unknown function '{}'", name), start))
    }

    fn parse_call_argument(&mut self) -> Result<Expr, QueryError> {
        self.expect('(')?;
        let arg = self.parse_pipe()?;
        self.expect(')')?;
        Ok(arg)
    }

    /// Primary followed by any number of `.field`, `[..]` and `?` suffixes.
    fn parse_postfix(&mut self) -> Result<Expr, QueryError> {
        let mut chain = vec![self.parse_primary()?];

        loop {
            self.skip_ws();
            match self.peek() {
                Some('.') if matches!(self.peek_second(), Some(c) if c == '"' || c == '[' || is_ident_start(c)) => {
                    self.next();
                    if self.peek() == Some('[') {
                        chain.push(self.parse_index_bracket()?);
                    } else {
                        chain.push(self.parse_dot_field()?);
                    }
                }
                Some('[') => chain.push(self.parse_index_bracket()?),
                Some('?') => {
                    self.next();
                    if let Some(last) = chain.pop() {
                        chain.push(Expr::Optional(Box::new(last)));
                    }
                }
                _ => break,
            }
        }

        Ok(Expr::pipe(chain))
    }

    fn parse_comparison(&mut self) -> Result<Expr, QueryError> {
        let left = self.parse_postfix()?;
        self.skip_ws();

        let (op, width) = if self.lookahead("==") {
            (CompareOp::Eq, 2)
        } else if self.lookahead("!=") {
            (CompareOp::Ne, 2)
        } else if self.lookahead("<=") {
            (CompareOp::Le, 2)
        } else if self.lookahead(">=") {
            (CompareOp::Ge, 2)
        } else if self.lookahead("<") {
            (CompareOp::Lt, 1)
        } else if self.lookahead(">") {
            (CompareOp::Gt, 1)
        } else {
            return Ok(left);
        };
        self.pos += width;

        let right = self.parse_postfix()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_and(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_comparison()?;
        loop {
            self.skip_ws();
            if !self.matches_keyword("and") {
                break;
            }
            self.consume_keyword("and");
            let right = self.parse_comparison()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if !self.matches_keyword("or") {
                break;
            }
            self.consume_keyword("or");
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_alternative(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.parse_or()?;
        loop {
            self.skip_ws();
            if !self.lookahead("//") {
                break;
            }
            self.pos += 2;
            let right = self.parse_or()?;
            left = Expr::Alternative(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comma(&mut self) -> Result<Expr, QueryError> {
        let mut branches = vec![self.parse_alternative()?];
        self.skip_ws();
        while self.peek() == Some(',') {
            self.next();
            branches.push(self.parse_alternative()?);
            self.skip_ws();
        }
        Ok(Expr::comma(branches))
    }

    fn parse_pipe(&mut self) -> Result<Expr, QueryError> {
        let mut stages = vec![self.parse_comma()?];
        self.skip_ws();
        while self.peek() == Some('|') {
            self.next();
            stages.push(self.parse_comma()?);
            self.skip_ws();
        }
        Ok(Expr::pipe(stages))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse a query expression into an AST.
///
/// # Examples
///
/// ```
/// use jsondoc_query::{parse, Expr};
///
/// assert_eq!(parse(".").unwrap(), Expr::Identity);
/// assert!(parse(".store.book[].category").is_ok());
/// assert!(parse(".store[").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, QueryError> {
    let mut parser = Parser::new(input);
    parser.skip_ws();
    if parser.is_eof() {
        return Err(QueryError::parse("empty expression", 0));
    }

    let expr = parser.parse_pipe()?;

    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(QueryError::parse(
            format!("unexpected character '{}'", c),
            parser.pos,
        ));
    }

    Ok(expr)
}
