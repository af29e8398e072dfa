//! Result rows.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::Value;

/// One row of a query result: column names plus a value per column.
///
/// The column-name list is shared (`Arc`) across every row of a result so a
/// thousand-row result carries its header once.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from a shared column list and matching values.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(name, value)` pairs. Handy in tests and in
    /// drivers that construct rows column-by-column.
    pub fn from_pairs<I, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(n, v)| (n.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Column names, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Look up a value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.values.get(idx)
    }

    /// Flatten into a field-name → value mapping.
    pub fn into_fields(self) -> HashMap<String, Value> {
        self.columns
            .iter()
            .cloned()
            .zip(self.values)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_by_name() {
        let row = Row::from_pairs([
            ("id", Value::Int(1)),
            ("name", Value::from("Ann")),
        ]);
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
        assert_eq!(row.get("name"), Some(&Value::from("Ann")));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn into_fields_preserves_all_columns() {
        let row = Row::from_pairs([
            ("id", Value::Int(2)),
            ("email", Value::from("a@x.com")),
        ]);
        let fields = row.into_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["email"], Value::from("a@x.com"));
    }
}
