//! Models: one instance per row, fields in a validated bag.
//!
//! A model is a mapping from field name to [`Value`]. The set of names the
//! mapping accepts is fixed when the bag is created: the mapper-discovered
//! schema fields, `id`, and any extra fields the concrete type registers on
//! top (computed or joined attributes that exist on the object but not in
//! the table). Writes outside that set are rejected; reads outside it are
//! a no-op that yields `Null`.

use std::collections::HashMap;
use std::sync::Arc;

use rowmap_core::{Connection, Error, Result, Value};

use crate::mapper::{Mapper, Table};

static NULL: Value = Value::Null;

/// The field storage behind every model instance.
///
/// Storage follows a column-list-plus-value-map split: the schema order is
/// kept separately from the values so iteration (and the dump) is
/// deterministic while lookups stay by-name.
#[derive(Debug, Clone)]
pub struct FieldMap {
    /// Mapper-discovered table fields, excluding `id`. Shared with the
    /// mapper that produced this instance.
    schema: Arc<[String]>,
    /// Extra recognized names registered beyond the schema.
    extras: Vec<String>,
    /// Current values.
    values: HashMap<String, Value>,
}

impl FieldMap {
    /// An empty bag recognizing `schema` ∪ {`id`} ∪ `extras`.
    pub fn new(schema: Arc<[String]>, extras: &[&str]) -> Self {
        Self {
            schema,
            extras: extras.iter().map(|s| (*s).to_string()).collect(),
            values: HashMap::new(),
        }
    }

    /// Whether `name` is recognized: a schema field, `id`, or an extra.
    pub fn is_field(&self, name: &str) -> bool {
        name == "id"
            || self.schema.iter().any(|f| f == name)
            || self.extras.iter().any(|f| f == name)
    }

    /// Register one more recognized name. Registered names participate in
    /// validation and access but never in generated insert/update SQL.
    pub fn add_field(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_field(&name) {
            self.extras.push(name);
        }
    }

    /// Read a field. Unset and unrecognized names both read as `Null`.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    /// Write a field. Rejected with `UnknownField` for unrecognized names.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if !self.is_field(name) {
            return Err(Error::UnknownField(name.to_string()));
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Replace the whole mapping, all-or-nothing.
    ///
    /// Every key must be recognized; otherwise nothing changes and the
    /// offending key is reported.
    pub fn replace(&mut self, fields: HashMap<String, Value>) -> Result<()> {
        for key in fields.keys() {
            if !self.is_field(key) {
                return Err(Error::UnknownField(key.clone()));
            }
        }
        self.values = fields;
        Ok(())
    }

    /// Overwrite recognized, non-`id` keys in place; silently skip the
    /// rest. The mutation half of `save_fields`.
    pub fn merge_saveable(&mut self, fields: HashMap<String, Value>) {
        for (key, value) in fields {
            if key != "id" && self.is_field(&key) {
                self.values.insert(key, value);
            }
        }
    }

    /// The current id.
    pub fn id(&self) -> &Value {
        self.get("id")
    }

    /// Assign the id. Bypasses nothing; `id` is always recognized.
    pub fn set_id(&mut self, id: Value) {
        self.values.insert("id".to_string(), id);
    }

    /// Whether this instance has never been persisted (unset id).
    pub fn is_new(&self) -> bool {
        self.id().is_unset()
    }

    /// Snapshot of the current mapping.
    pub fn to_array(&self) -> HashMap<String, Value> {
        self.values.clone()
    }

    /// The current mapping as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.values).unwrap_or(serde_json::Value::Null)
    }

    /// Stored fields in deterministic order: `id` first, then schema
    /// order, then extras in registration order.
    pub fn ordered(&self) -> Vec<(&str, &Value)> {
        let mut out = Vec::with_capacity(self.values.len());
        if let Some(v) = self.values.get("id") {
            out.push(("id", v));
        }
        for name in self.schema.iter().chain(self.extras.iter()) {
            if let Some(v) = self.values.get(name.as_str()) {
                out.push((name.as_str(), v));
            }
        }
        out
    }
}

/// Behavior shared by every concrete per-table record type.
///
/// Implementors embed a [`FieldMap`] and expose it through the two
/// accessors; everything else is provided. Persistence goes through the
/// record's mapper, which is associated at the type level via
/// [`Table::Record`], so `save` takes the mapper explicitly.
pub trait Model: Sized {
    /// The embedded field bag.
    fn fields(&self) -> &FieldMap;

    /// The embedded field bag, mutably.
    fn fields_mut(&mut self) -> &mut FieldMap;

    /// The record's id (`Null` while unpersisted).
    fn id(&self) -> &Value {
        self.fields().id()
    }

    /// Read a field; `Null` for unset or unrecognized names.
    fn get(&self, name: &str) -> &Value {
        self.fields().get(name)
    }

    /// Write a field; `UnknownField` for unrecognized names.
    fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.fields_mut().set(name, value.into())
    }

    /// Register an extra recognized field on this instance.
    fn add_field(&mut self, name: impl Into<String>) {
        self.fields_mut().add_field(name);
    }

    /// Replace the whole field mapping; all-or-nothing validation.
    fn set_fields(&mut self, fields: HashMap<String, Value>) -> Result<()> {
        self.fields_mut().replace(fields)
    }

    /// Snapshot of the current field mapping.
    fn to_array(&self) -> HashMap<String, Value> {
        self.fields().to_array()
    }

    /// The current field mapping as a JSON object.
    fn to_json(&self) -> serde_json::Value {
        self.fields().to_json()
    }

    /// Human-readable dump: the concrete type name followed by one
    /// `field : value` line per stored field.
    fn dump(&self) -> String {
        let mut out = String::from(std::any::type_name::<Self>());
        out.push('\n');
        for (name, value) in self.fields().ordered() {
            out.push_str(&format!("{name} : {value}\n"));
        }
        out
    }

    /// Persist through the associated mapper: insert when the id is
    /// unset, update otherwise.
    fn save<T, C>(&mut self, mapper: &mut Mapper<T, C>) -> Result<()>
    where
        T: Table<Record = Self>,
        C: Connection,
    {
        mapper.save(self)
    }

    /// Overwrite the given recognized, non-`id` fields in place (unknown
    /// keys silently skipped), then persist.
    fn save_fields<T, C>(
        &mut self,
        fields: HashMap<String, Value>,
        mapper: &mut Mapper<T, C>,
    ) -> Result<()>
    where
        T: Table<Record = Self>,
        C: Connection,
    {
        self.fields_mut().merge_saveable(fields);
        mapper.save(self)
    }
}
