//! Just enough SQL parsing for the statement shapes a mapper emits.
//!
//! This is not a SQL parser. It understands the exact text the mapper
//! generates (`explain`, `select * from`, `insert into`, `update`,
//! `delete from`, `?N` placeholders, `limit N`) plus single comparison
//! conditions with literal operands, which is what raw `where` fragments
//! in tests look like.

use std::cmp::Ordering;

use rowmap_core::{Error, Result, Value};

/// Case-insensitively strip a leading keyword and the whitespace after it.
pub(crate) fn eat_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let input = input.trim_start();
    if input.len() < keyword.len() {
        return None;
    }
    let (head, rest) = input.split_at(keyword.len());
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) && !rest.starts_with('(') {
        return None;
    }
    Some(rest.trim_start())
}

/// Take the next bare token (up to whitespace or `(`).
pub(crate) fn take_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    let end = input
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(input.len());
    (&input[..end], input[end..].trim_start())
}

/// Split a trailing `limit N` clause off, returning the remainder and the
/// limit.
pub(crate) fn split_limit(input: &str) -> Result<(&str, Option<usize>)> {
    let trimmed = input.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    let Some(pos) = lower.rfind("limit") else {
        return Ok((trimmed, None));
    };
    let tail = trimmed[pos + "limit".len()..].trim();
    // Only treat it as a limit clause when the tail is a bare integer.
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return Ok((trimmed, None));
    }
    let n: usize = tail
        .parse()
        .map_err(|_| Error::Query(format!("bad limit: {tail}")))?;
    Ok((trimmed[..pos].trim_end(), Some(n)))
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn matches(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Lt => ord == Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Ge => ord != Ordering::Less,
        }
    }
}

/// One `column <op> operand` condition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    pub column: String,
    pub op: Op,
    pub operand: Value,
}

impl Condition {
    /// Whether `value` (the cell in `column`) satisfies this condition.
    ///
    /// Integers compare numerically; everything else compares as text, so
    /// an integer cell still matches a quoted-digit operand.
    pub fn matches(&self, value: &Value) -> bool {
        let ord = match (value.as_int(), self.operand.as_int()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => value.to_string().cmp(&self.operand.to_string()),
        };
        self.op.matches(ord)
    }
}

/// Parse `column <op> term`.
pub(crate) fn parse_condition(input: &str, params: &[Value]) -> Result<Condition> {
    let input = input.trim();
    // Two-character operators first so `<=` does not read as `<`.
    for (text, op) in [
        ("<=", Op::Le),
        (">=", Op::Ge),
        ("!=", Op::Ne),
        ("<>", Op::Ne),
        ("=", Op::Eq),
        ("<", Op::Lt),
        (">", Op::Gt),
    ] {
        if let Some(pos) = input.find(text) {
            let column = input[..pos].trim();
            let term = input[pos + text.len()..].trim();
            if column.is_empty() || term.is_empty() {
                break;
            }
            return Ok(Condition {
                column: column.to_string(),
                op,
                operand: parse_term(term, params)?,
            });
        }
    }
    Err(Error::Query(format!("cannot parse condition: {input}")))
}

/// Resolve one operand: a `?N` placeholder, a quoted string, or an
/// integer literal.
pub(crate) fn parse_term(term: &str, params: &[Value]) -> Result<Value> {
    let term = term.trim();
    if let Some(index) = term.strip_prefix('?') {
        let n: usize = index
            .parse()
            .map_err(|_| Error::Query(format!("bad placeholder: {term}")))?;
        return params
            .get(n.checked_sub(1).ok_or_else(|| {
                Error::Query(format!("placeholder indices start at 1: {term}"))
            })?)
            .cloned()
            .ok_or_else(|| Error::Query(format!("no parameter bound for {term}")));
    }
    if term.len() >= 2 && term.starts_with('\'') && term.ends_with('\'') {
        let inner = &term[1..term.len() - 1];
        return Ok(Value::Text(inner.replace("''", "'")));
    }
    if term.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if let Ok(n) = term.parse::<i64>() {
        return Ok(Value::Int(n));
    }
    Err(Error::Query(format!("cannot parse term: {term}")))
}

/// Extract the contents of the next parenthesized group, returning the
/// inside and whatever follows the closing parenthesis.
pub(crate) fn parenthesized(input: &str) -> Result<(&str, &str)> {
    let input = input.trim_start();
    let Some(rest) = input.strip_prefix('(') else {
        return Err(Error::Query(format!("expected '(' at: {input}")));
    };
    let Some(end) = rest.find(')') else {
        return Err(Error::Query(format!("unterminated '(' at: {input}")));
    };
    Ok((&rest[..end], rest[end + 1..].trim_start()))
}
