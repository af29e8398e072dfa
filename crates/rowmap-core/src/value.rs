//! Scalar cell values.
//!
//! `Value` is the unit of data exchanged with a [`Connection`]: every bound
//! parameter, every result cell, and every model field holds one. The set of
//! variants is deliberately small; this mapper deals in scalars only.
//!
//! [`Connection`]: crate::connection::Connection

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar value.
///
/// Serializes untagged, so a `Value` reads and writes as a plain JSON
/// scalar (`null`, `true`, `42`, `"text"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL / never-assigned field.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer. Auto-increment ids travel as this variant.
    Int(i64),
    /// Text.
    Text(String),
}

impl Value {
    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for values that count as "never assigned": `Null` and the
    /// empty string. A model whose id is unset in this sense routes to
    /// the insert path on save.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Borrow the text content, if this is a `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The integer content, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render this value as a SQL literal in the dialect the mapper
    /// assumes: single-quoted strings with embedded quotes doubled.
    ///
    /// Generated statements bind values as parameters instead of
    /// interpolating literals; this rendering exists for cache keys and
    /// for callers assembling raw `where` fragments by hand.
    pub fn sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            Self::Int(i) => i.to_string(),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str(""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_covers_null_and_empty_text() {
        assert!(Value::Null.is_unset());
        assert!(Value::Text(String::new()).is_unset());
        assert!(!Value::Int(0).is_unset());
        assert!(!Value::Text("x".to_string()).is_unset());
    }

    #[test]
    fn sql_literal_doubles_quotes() {
        let v = Value::from("O'Brien");
        assert_eq!(v.sql_literal(), "'O''Brien'");
        assert_eq!(Value::Null.sql_literal(), "NULL");
        assert_eq!(Value::Int(7).sql_literal(), "7");
    }

    #[test]
    fn serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Value::Text("hi".to_string())).unwrap(),
            "\"hi\""
        );
    }

    #[test]
    fn option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
    }
}
