//! Mappers: one per table, rows in, records out.
//!
//! A [`Mapper`] owns a connection, the table's discovered field list, and a
//! per-instance query cache. Concrete tables plug in through the [`Table`]
//! trait (table name + row→record factory); the mapper supplies find,
//! delete, and save on top.
//!
//! Mappers are deliberately short-lived: one per logical unit of work.
//! Nothing here is synchronized; the cache and field list are plain
//! in-place state.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use rowmap_core::{check_identifier, Connection, Error, Result, Row, Value};

use crate::cache::QueryCache;
use crate::model::{FieldMap, Model};
use crate::statement::{assignment_list, placeholder_list, Statement};

/// Declared once per mapped table: the table name, the record type rows
/// become, and any extra recognized fields records carry beyond the schema.
///
/// The schema convention is fixed: every mapped table has exactly one
/// auto-incrementing primary key column named `id`.
pub trait Table {
    /// The concrete record type for this table.
    type Record: Model;

    /// The table name. Must be a plain SQL identifier.
    fn table_name() -> &'static str;

    /// Recognized fields beyond the discovered schema (computed or joined
    /// attributes). Never included in generated insert/update SQL.
    fn extra_fields() -> &'static [&'static str] {
        &[]
    }

    /// Turn a populated field bag into a record.
    fn build(fields: FieldMap) -> Self::Record;
}

/// Either a record or a bare id.
///
/// Lets delete-style operations accept both interchangeably without a
/// runtime type test.
#[derive(Debug)]
pub enum ModelOrId<'a, M> {
    /// A record; its `id` field is used.
    Model(&'a M),
    /// A bare identifier.
    Id(Value),
}

impl<'a, M: Model> From<&'a M> for ModelOrId<'a, M> {
    fn from(model: &'a M) -> Self {
        Self::Model(model)
    }
}

impl<'a, M> From<i64> for ModelOrId<'a, M> {
    fn from(id: i64) -> Self {
        Self::Id(Value::Int(id))
    }
}

impl<'a, M> From<Value> for ModelOrId<'a, M> {
    fn from(id: Value) -> Self {
        Self::Id(id)
    }
}

/// The data-access front for one table.
pub struct Mapper<T: Table, C: Connection> {
    conn: C,
    table_fields: Arc<[String]>,
    cache: QueryCache,
    _table: PhantomData<T>,
}

impl<T: Table, C: Connection> Mapper<T, C> {
    /// Take ownership of a connection and discover the table's fields.
    ///
    /// Runs `explain <table>` once and keeps every reported column except
    /// `id`, in report order. That order is stable for the mapper's
    /// lifetime and is the order insert/update SQL is generated in.
    #[tracing::instrument(level = "debug", skip(conn), fields(table = T::table_name()))]
    pub fn connect(conn: C) -> Result<Self> {
        let table = T::table_name();
        check_identifier(table)?;

        let mut mapper = Self {
            conn,
            table_fields: Vec::<String>::new().into(),
            cache: QueryCache::new(),
            _table: PhantomData,
        };

        let rows = mapper.query(&Statement::new(format!("explain {table}")))?;
        let mut fields = Vec::new();
        for row in &rows {
            let Some(name) = row.get("Field").and_then(Value::as_str) else {
                return Err(Error::Schema(format!(
                    "explain {table} returned a row without a Field column"
                )));
            };
            if name == "id" {
                continue;
            }
            check_identifier(name)?;
            fields.push(name.to_string());
        }
        if fields.is_empty() {
            return Err(Error::Schema(format!(
                "table {table} has no fields beyond id"
            )));
        }

        tracing::debug!(table, fields = ?fields, "discovered table fields");
        mapper.table_fields = fields.into();
        Ok(mapper)
    }

    /// The discovered field list (excluding `id`), in schema order.
    pub fn table_fields(&self) -> &[String] {
        &self.table_fields
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.conn
    }

    /// Number of statements currently cached. The cache has no eviction;
    /// this is the documented growth bound (there is none).
    pub fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    // ========================================================================
    // Statement choke points
    // ========================================================================

    /// Run a row-producing statement through the cache.
    ///
    /// A hit replays the stored outcome (rows from the first row, or the
    /// stored error) without touching the connection. A miss executes,
    /// stores the outcome (failures included), and returns it.
    pub fn query(&mut self, stmt: &Statement) -> Result<Vec<Row>> {
        let key = stmt.cache_key();
        if let Some(outcome) = self.cache.get(&key) {
            tracing::trace!(sql = stmt.sql(), "query cache hit");
            return outcome;
        }
        tracing::debug!(sql = stmt.sql(), "query");
        let outcome = self.conn.query(stmt.sql(), stmt.params());
        self.cache.store(key, outcome.clone());
        outcome
    }

    /// Run a write statement. Never cached; on success the query cache is
    /// cleared so later reads observe the write.
    pub fn execute(&mut self, stmt: &Statement) -> Result<u64> {
        tracing::debug!(sql = stmt.sql(), "execute");
        let affected = self.conn.execute(stmt.sql(), stmt.params())?;
        self.cache.clear();
        Ok(affected)
    }

    // ========================================================================
    // Escaping
    // ========================================================================

    /// Escape a string through the connection's escaping primitive.
    ///
    /// Generated statements bind values as parameters and never need this;
    /// it exists for callers composing raw `where` fragments for the
    /// by-sql helpers.
    pub fn escape(&self, raw: &str) -> String {
        self.conn.escape(raw)
    }

    /// Escape a scalar. Text content is escaped; other variants pass
    /// through unchanged.
    pub fn escape_value(&self, value: &Value) -> Value {
        match value {
            Value::Text(s) => Value::Text(self.conn.escape(s)),
            other => other.clone(),
        }
    }

    /// Escape every value of a field mapping, preserving keys.
    pub fn escape_fields(&self, fields: &HashMap<String, Value>) -> HashMap<String, Value> {
        fields
            .iter()
            .map(|(k, v)| (k.clone(), self.escape_value(v)))
            .collect()
    }

    /// Escape every field value of a record, preserving keys.
    pub fn escape_model(&self, model: &T::Record) -> HashMap<String, Value> {
        self.escape_fields(&model.to_array())
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Resolve a record-or-id to the id value.
    pub fn resolve_id(target: ModelOrId<'_, T::Record>) -> Value {
        match target {
            ModelOrId::Model(model) => model.id().clone(),
            ModelOrId::Id(id) => id,
        }
    }

    /// The single construction path from a field mapping to a record.
    ///
    /// The mapping is validated against the recognized field set, so a
    /// by-sql query selecting columns the record does not recognize fails
    /// here rather than producing a half-formed object.
    pub fn create_object(&self, fields: HashMap<String, Value>) -> Result<T::Record> {
        let mut map = FieldMap::new(self.table_fields.clone(), T::extra_fields());
        map.replace(fields)?;
        Ok(T::build(map))
    }

    /// Run a statement and build a record from its first row.
    ///
    /// Zero rows is `Ok(None)`; execution failure is `Err`.
    pub fn fetch_one(&mut self, stmt: &Statement) -> Result<Option<T::Record>> {
        let rows = self.query(stmt)?;
        rows.into_iter()
            .next()
            .map(|row| self.create_object(row.into_fields()))
            .transpose()
    }

    /// Run a statement and build one record per row, preserving row order.
    ///
    /// Zero rows is `Ok(vec![])`; execution failure is `Err`.
    pub fn fetch_many(&mut self, stmt: &Statement) -> Result<Vec<T::Record>> {
        let rows = self.query(stmt)?;
        rows.into_iter()
            .map(|row| self.create_object(row.into_fields()))
            .collect()
    }

    // ========================================================================
    // Finders
    // ========================================================================

    /// Find one record by id.
    pub fn find(&mut self, id: impl Into<Value>) -> Result<Option<T::Record>> {
        let stmt = Statement::new(format!(
            "select * from {} where id = ?1 limit 1",
            T::table_name()
        ))
        .bind(id);
        self.fetch_one(&stmt)
    }

    /// Every row in the table.
    pub fn find_all(&mut self) -> Result<Vec<T::Record>> {
        let stmt = Statement::new(format!("select * from {}", T::table_name()));
        self.fetch_many(&stmt)
    }

    /// Find records with a caller-supplied raw `where` fragment.
    ///
    /// The fragment is concatenated verbatim; this is the escape hatch for
    /// predicates the field helpers cannot express, and the caller owns
    /// its safety (see [`Mapper::escape`]).
    pub fn find_all_by_sql(&mut self, fragment: &str) -> Result<Vec<T::Record>> {
        let stmt = Statement::new(format!(
            "select * from {} where {fragment}",
            T::table_name()
        ));
        self.fetch_many(&stmt)
    }

    /// Like [`Mapper::find_all_by_sql`], limited to one record.
    pub fn find_one_by_sql(&mut self, fragment: &str) -> Result<Option<T::Record>> {
        let stmt = Statement::new(format!(
            "select * from {} where {fragment} limit 1",
            T::table_name()
        ));
        self.fetch_one(&stmt)
    }

    /// Find records by id list, in input order, via repeated [`Mapper::find`].
    ///
    /// An empty input yields an empty vec; ids with no matching row are
    /// omitted.
    pub fn find_ids(&mut self, ids: &[Value]) -> Result<Vec<T::Record>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.find(id.clone())? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Find all records with `field = value`.
    ///
    /// `field` must be `id` or a discovered schema field; the value is
    /// bound as a parameter.
    pub fn find_by(&mut self, field: &str, value: impl Into<Value>) -> Result<Vec<T::Record>> {
        self.check_field(field)?;
        let stmt = Statement::new(format!(
            "select * from {} where {field} = ?1",
            T::table_name()
        ))
        .bind(value);
        self.fetch_many(&stmt)
    }

    /// Like [`Mapper::find_by`], limited to one record.
    pub fn find_one_by(
        &mut self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Option<T::Record>> {
        self.check_field(field)?;
        let stmt = Statement::new(format!(
            "select * from {} where {field} = ?1 limit 1",
            T::table_name()
        ))
        .bind(value);
        self.fetch_one(&stmt)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Delete at most one row by record or id. Returns rows affected.
    pub fn delete<'a>(&mut self, target: impl Into<ModelOrId<'a, T::Record>>) -> Result<u64>
    where
        T::Record: 'a,
    {
        let id = Self::resolve_id(target.into());
        let stmt = Statement::new(format!(
            "delete from {} where id = ?1 limit 1",
            T::table_name()
        ))
        .bind(id);
        self.execute(&stmt)
    }

    /// Delete every row with `field = value`. Returns rows affected.
    pub fn delete_by(&mut self, field: &str, value: impl Into<Value>) -> Result<u64> {
        self.check_field(field)?;
        let stmt = Statement::new(format!(
            "delete from {} where {field} = ?1",
            T::table_name()
        ))
        .bind(value);
        self.execute(&stmt)
    }

    /// Persist a record: insert when its id is unset, update otherwise.
    #[tracing::instrument(level = "debug", skip_all, fields(table = T::table_name()))]
    pub fn save(&mut self, record: &mut T::Record) -> Result<()> {
        if record.fields().is_new() {
            self.insert(record)
        } else {
            self.update(record)
        }
    }

    /// Insert a record over exactly the discovered field list, in schema
    /// order, then assign the connection's last-insert-id to the record.
    ///
    /// Extra registered fields are never part of the generated SQL.
    fn insert(&mut self, record: &mut T::Record) -> Result<()> {
        let fields = Arc::clone(&self.table_fields);
        let sql = format!(
            "insert into {} ({}) values ({})",
            T::table_name(),
            fields.join(", "),
            placeholder_list(fields.len())
        );
        let mut stmt = Statement::new(sql);
        for field in fields.iter() {
            stmt = stmt.bind(record.get(field).clone());
        }
        self.execute(&stmt)?;

        let id = self.conn.last_insert_id();
        record.fields_mut().set_id(Value::Int(id));
        Ok(())
    }

    /// Update the row matching the record's id, same field list and order
    /// as insert.
    fn update(&mut self, record: &mut T::Record) -> Result<()> {
        let fields = Arc::clone(&self.table_fields);
        let sql = format!(
            "update {} set {} where id = ?{} limit 1",
            T::table_name(),
            assignment_list(&fields),
            fields.len() + 1
        );
        let mut stmt = Statement::new(sql);
        for field in fields.iter() {
            stmt = stmt.bind(record.get(field).clone());
        }
        stmt = stmt.bind(record.id().clone());
        self.execute(&stmt)?;
        Ok(())
    }

    /// A field name usable in a generated `where` clause: `id` or a
    /// discovered schema field.
    fn check_field(&self, field: &str) -> Result<()> {
        if field == "id" || self.table_fields.iter().any(|f| f == field) {
            Ok(())
        } else {
            Err(Error::UnknownField(field.to_string()))
        }
    }
}
