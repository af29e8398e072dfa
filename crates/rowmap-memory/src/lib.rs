//! An in-memory [`Connection`] driver.
//!
//! `MemoryConnection` keeps tables as plain vectors and interprets exactly
//! the statement shapes a mapper emits: `explain`, `select * from`,
//! `insert into`, `update`, and `delete from`, with `?N` parameters and
//! simple comparison conditions. Every mapped table gets an implicit
//! auto-incrementing `id` column.
//!
//! The driver records every statement it runs, so tests can assert that a
//! cached query never reached the connection a second time.

mod sql;

use std::collections::HashMap;
use std::sync::Arc;

use rowmap_core::{Connection, Error, Result, Row, Value};

use crate::sql::{
    eat_keyword, parenthesized, parse_condition, parse_term, split_limit, take_token, Condition,
};

struct MemTable {
    /// Column names, `id` first.
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    next_id: i64,
}

impl MemTable {
    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::Query(format!("no such column: {name}")))
    }

    /// Row indices satisfying `cond` (all rows when `None`), capped at
    /// `limit`.
    fn matching(&self, cond: Option<&Condition>, limit: Option<usize>) -> Result<Vec<usize>> {
        let idx = cond.map(|c| self.column_index(&c.column)).transpose()?;
        let mut out = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            let hit = match (cond, idx) {
                (Some(c), Some(col)) => c.matches(&row[col]),
                _ => true,
            };
            if hit {
                out.push(i);
                if limit.is_some_and(|n| out.len() >= n) {
                    break;
                }
            }
        }
        Ok(out)
    }
}

/// A fully in-memory database connection.
#[derive(Default)]
pub struct MemoryConnection {
    tables: HashMap<String, MemTable>,
    last_insert_id: i64,
    log: Vec<String>,
}

impl MemoryConnection {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a table. `columns` lists the non-id fields in schema order;
    /// the auto-increment `id` column is implicit and comes first.
    pub fn create_table(&mut self, name: impl Into<String>, columns: &[&str]) {
        let mut all = Vec::with_capacity(columns.len() + 1);
        all.push("id".to_string());
        all.extend(columns.iter().map(|c| (*c).to_string()));
        self.tables.insert(
            name.into(),
            MemTable {
                columns: all,
                rows: Vec::new(),
                next_id: 1,
            },
        );
    }

    /// Number of rows currently stored in a table.
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.get(table).map(|t| t.rows.len())
    }

    /// Every statement this connection has been asked to run, in order.
    pub fn executed(&self) -> &[String] {
        &self.log
    }

    /// How many times an exact statement text has reached this connection.
    pub fn executions_of(&self, sql: &str) -> usize {
        self.log.iter().filter(|s| s.as_str() == sql).count()
    }

    fn table(&self, name: &str) -> Result<&MemTable> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::Query(format!("no such table: {name}")))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::Query(format!("no such table: {name}")))
    }

    fn run_explain(&self, rest: &str) -> Result<Vec<Row>> {
        let (name, _) = take_token(rest);
        let table = self.table(name)?;
        let header: Arc<[String]> = vec!["Field".to_string()].into();
        Ok(table
            .columns
            .iter()
            .map(|c| Row::new(Arc::clone(&header), vec![Value::Text(c.clone())]))
            .collect())
    }

    fn run_select(&self, rest: &str, params: &[Value]) -> Result<Vec<Row>> {
        let rest = rest
            .strip_prefix('*')
            .ok_or_else(|| Error::Query(format!("expected select *: {rest}")))?;
        let rest = eat_keyword(rest, "from")
            .ok_or_else(|| Error::Query(format!("expected from: {rest}")))?;
        let (name, rest) = take_token(rest);
        let (rest, limit) = split_limit(rest)?;
        let cond = match eat_keyword(rest, "where") {
            Some(cond_text) => Some(parse_condition(cond_text, params)?),
            None if rest.is_empty() => None,
            None => return Err(Error::Query(format!("trailing input: {rest}"))),
        };

        let table = self.table(name)?;
        let header: Arc<[String]> = table.columns.clone().into();
        let hits = table.matching(cond.as_ref(), limit)?;
        Ok(hits
            .into_iter()
            .map(|i| Row::new(Arc::clone(&header), table.rows[i].clone()))
            .collect())
    }

    fn run_insert(&mut self, rest: &str, params: &[Value]) -> Result<u64> {
        let rest = eat_keyword(rest, "into")
            .ok_or_else(|| Error::Query(format!("expected into: {rest}")))?;
        let (name, rest) = take_token(rest);
        let (columns_text, rest) = parenthesized(rest)?;
        let rest = eat_keyword(rest, "values")
            .ok_or_else(|| Error::Query(format!("expected values: {rest}")))?;
        let (values_text, _) = parenthesized(rest)?;

        let columns: Vec<&str> = columns_text.split(',').map(str::trim).collect();
        let terms: Vec<&str> = values_text.split(',').map(str::trim).collect();
        if columns.len() != terms.len() {
            return Err(Error::Query(format!(
                "{} columns but {} values",
                columns.len(),
                terms.len()
            )));
        }
        let values: Vec<Value> = terms
            .iter()
            .map(|t| parse_term(t, params))
            .collect::<Result<_>>()?;

        let table = self.table_mut(name)?;
        let mut row = vec![Value::Null; table.columns.len()];
        let mut id = None;
        for (col, value) in columns.iter().copied().zip(values) {
            let idx = table.column_index(col)?;
            if col == "id" && !value.is_unset() {
                id = value.as_int();
            }
            row[idx] = value;
        }
        let id = id.unwrap_or(table.next_id);
        row[0] = Value::Int(id);
        table.next_id = table.next_id.max(id + 1);
        table.rows.push(row);
        self.last_insert_id = id;
        Ok(1)
    }

    fn run_update(&mut self, rest: &str, params: &[Value]) -> Result<u64> {
        let (name, rest) = take_token(rest);
        let rest = eat_keyword(rest, "set")
            .ok_or_else(|| Error::Query(format!("expected set: {rest}")))?;
        let (rest, limit) = split_limit(rest)?;
        let lower = rest.to_ascii_lowercase();
        let where_pos = lower
            .find(" where ")
            .ok_or_else(|| Error::Query(format!("update without where: {rest}")))?;
        let assignments_text = &rest[..where_pos];
        let cond = parse_condition(&rest[where_pos + " where ".len()..], params)?;

        let mut assignments = Vec::new();
        for piece in assignments_text.split(',') {
            let (col, term) = piece
                .split_once('=')
                .ok_or_else(|| Error::Query(format!("bad assignment: {piece}")))?;
            assignments.push((col.trim().to_string(), parse_term(term, params)?));
        }

        let table = self.table_mut(name)?;
        let hits = table.matching(Some(&cond), limit)?;
        for (col, value) in &assignments {
            let idx = table.column_index(col)?;
            for &i in &hits {
                table.rows[i][idx] = value.clone();
            }
        }
        Ok(hits.len() as u64)
    }

    fn run_delete(&mut self, rest: &str, params: &[Value]) -> Result<u64> {
        let rest = eat_keyword(rest, "from")
            .ok_or_else(|| Error::Query(format!("expected from: {rest}")))?;
        let (name, rest) = take_token(rest);
        let (rest, limit) = split_limit(rest)?;
        let cond = match eat_keyword(rest, "where") {
            Some(cond_text) => Some(parse_condition(cond_text, params)?),
            None if rest.is_empty() => None,
            None => return Err(Error::Query(format!("trailing input: {rest}"))),
        };

        let table = self.table_mut(name)?;
        let hits = table.matching(cond.as_ref(), limit)?;
        for &i in hits.iter().rev() {
            table.rows.remove(i);
        }
        Ok(hits.len() as u64)
    }
}

impl Connection for MemoryConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        tracing::debug!(sql, "memory query");
        self.log.push(sql.to_string());
        if let Some(rest) = eat_keyword(sql, "explain") {
            self.run_explain(rest)
        } else if let Some(rest) = eat_keyword(sql, "select") {
            self.run_select(rest, params)
        } else {
            Err(Error::Query(format!("unsupported query: {sql}")))
        }
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        tracing::debug!(sql, "memory execute");
        self.log.push(sql.to_string());
        if let Some(rest) = eat_keyword(sql, "insert") {
            self.run_insert(rest, params)
        } else if let Some(rest) = eat_keyword(sql, "update") {
            self.run_update(rest, params)
        } else if let Some(rest) = eat_keyword(sql, "delete") {
            self.run_delete(rest, params)
        } else {
            Err(Error::Query(format!("unsupported statement: {sql}")))
        }
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    fn escape(&self, raw: &str) -> String {
        raw.replace('\'', "''")
    }
}
