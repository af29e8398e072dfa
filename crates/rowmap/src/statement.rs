//! Parameterized SQL statements.
//!
//! A [`Statement`] pairs statement text using `?N` placeholders (1-based)
//! with the values bound to them. The mapper never interpolates a value
//! into statement text; values travel as parameters and the driver
//! substitutes them.

use rowmap_core::Value;

/// A SQL statement plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    /// Start a statement from its text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind the next positional parameter.
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound parameters, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// The cache key for this statement: the text plus each parameter
    /// rendered as a SQL literal, NUL-separated.
    ///
    /// Two statements get the same key exactly when the database would see
    /// the same effective query, which is what the per-mapper result cache
    /// keys on.
    pub fn cache_key(&self) -> String {
        if self.params.is_empty() {
            return self.sql.clone();
        }
        let mut key = self.sql.clone();
        for param in &self.params {
            key.push('\0');
            key.push_str(&param.sql_literal());
        }
        key
    }
}

/// `"?1, ?2, ..., ?len"`: the placeholder list for an insert.
pub(crate) fn placeholder_list(len: usize) -> String {
    (1..=len)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `"f1 = ?1, f2 = ?2, ..."`: the assignment list for an update.
pub(crate) fn assignment_list(fields: &[String]) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{f} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}
