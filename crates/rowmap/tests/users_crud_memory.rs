//! CRUD semantics against the in-memory driver: the users table scenario.

use std::collections::HashMap;

use rowmap::prelude::*;
use rowmap_memory::MemoryConnection;

#[derive(Debug)]
struct User {
    fields: FieldMap,
}

impl Model for User {
    fn fields(&self) -> &FieldMap {
        &self.fields
    }
    fn fields_mut(&mut self) -> &mut FieldMap {
        &mut self.fields
    }
}

struct Users;

impl Table for Users {
    type Record = User;

    fn table_name() -> &'static str {
        "users"
    }

    fn extra_fields() -> &'static [&'static str] {
        &["display_name"]
    }

    fn build(fields: FieldMap) -> User {
        User { fields }
    }
}

fn users_mapper() -> Mapper<Users, MemoryConnection> {
    let mut conn = MemoryConnection::new();
    conn.create_table("users", &["name", "email"]);
    Mapper::connect(conn).expect("schema discovery")
}

fn new_user(mapper: &Mapper<Users, MemoryConnection>, name: &str, email: &str) -> User {
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), Value::from(name));
    fields.insert("email".to_string(), Value::from(email));
    mapper.create_object(fields).expect("valid fields")
}

#[test]
fn schema_discovery_excludes_id() {
    let mapper = users_mapper();
    let fields: Vec<&str> = mapper.table_fields().iter().map(String::as_str).collect();
    assert_eq!(fields, vec!["name", "email"]);
}

#[test]
fn insert_find_update_find_scenario() {
    let mut mapper = users_mapper();

    let mut ann = new_user(&mapper, "Ann", "a@x.com");
    assert!(ann.id().is_unset());
    ann.save(&mut mapper).unwrap();
    assert_eq!(ann.id(), &Value::Int(1));

    let found = mapper.find(1_i64).unwrap().expect("ann exists");
    assert_eq!(found.get("id"), &Value::Int(1));
    assert_eq!(found.get("name"), &Value::from("Ann"));
    assert_eq!(found.get("email"), &Value::from("a@x.com"));

    let mut update = HashMap::new();
    update.insert("email".to_string(), Value::from("ann@x.com"));
    ann.save_fields(update, &mut mapper).unwrap();

    let found = mapper.find(1_i64).unwrap().expect("ann still exists");
    assert_eq!(found.get("email"), &Value::from("ann@x.com"));
    assert_eq!(found.get("name"), &Value::from("Ann"));
}

#[test]
fn update_touches_at_most_one_row() {
    let mut mapper = users_mapper();
    let mut ann = new_user(&mapper, "Ann", "shared@x.com");
    let mut bob = new_user(&mapper, "Bob", "shared@x.com");
    ann.save(&mut mapper).unwrap();
    bob.save(&mut mapper).unwrap();

    let mut update = HashMap::new();
    update.insert("email".to_string(), Value::from("ann@x.com"));
    ann.save_fields(update, &mut mapper).unwrap();

    let bob_after = mapper.find(bob.id().clone()).unwrap().expect("bob intact");
    assert_eq!(bob_after.get("email"), &Value::from("shared@x.com"));
}

#[test]
fn set_fields_roundtrips_exactly() {
    let mapper = users_mapper();
    let mut user = mapper.create_object(HashMap::new()).unwrap();

    let mut fields = HashMap::new();
    fields.insert("name".to_string(), Value::from("Ann"));
    fields.insert("email".to_string(), Value::from("a@x.com"));
    user.set_fields(fields.clone()).unwrap();
    assert_eq!(user.to_array(), fields);
}

#[test]
fn set_fields_rejects_unknown_keys_without_partial_update() {
    let mapper = users_mapper();
    let mut user = mapper.create_object(HashMap::new()).unwrap();
    user.set("name", "Ann").unwrap();

    let mut bad = HashMap::new();
    bad.insert("name".to_string(), Value::from("Bob"));
    bad.insert("password".to_string(), Value::from("x"));
    assert_eq!(
        user.set_fields(bad),
        Err(Error::UnknownField("password".to_string()))
    );
    assert_eq!(user.get("name"), &Value::from("Ann"));
}

#[test]
fn extra_fields_validate_but_never_persist() {
    let mut mapper = users_mapper();
    let mut ann = new_user(&mapper, "Ann", "a@x.com");
    ann.set("display_name", "Ann from accounting").unwrap();
    ann.save(&mut mapper).unwrap();

    let found = mapper.find(ann.id().clone()).unwrap().expect("persisted");
    assert_eq!(found.get("display_name"), &Value::Null);

    let mut expected = HashMap::new();
    expected.insert("id".to_string(), Value::Int(1));
    expected.insert("name".to_string(), Value::from("Ann"));
    expected.insert("email".to_string(), Value::from("a@x.com"));
    assert_eq!(found.to_array(), expected);
}

#[test]
fn delete_accepts_model_or_id() {
    let mut mapper = users_mapper();
    let mut ann = new_user(&mapper, "Ann", "a@x.com");
    let mut bob = new_user(&mapper, "Bob", "b@x.com");
    ann.save(&mut mapper).unwrap();
    bob.save(&mut mapper).unwrap();

    assert_eq!(mapper.delete(&ann).unwrap(), 1);
    assert!(mapper.find(ann.id().clone()).unwrap().is_none());

    assert_eq!(mapper.delete(2_i64).unwrap(), 1);
    assert!(mapper.find(2_i64).unwrap().is_none());
}

#[test]
fn delete_by_removes_all_matches() {
    let mut mapper = users_mapper();
    for name in ["Ann", "Bob", "Cal"] {
        let email = if name == "Bob" { "b@x.com" } else { "a@x.com" };
        new_user(&mapper, name, email).save(&mut mapper).unwrap();
    }
    assert_eq!(mapper.delete_by("email", "a@x.com").unwrap(), 2);
    assert_eq!(mapper.find_all().unwrap().len(), 1);
}

#[test]
fn find_by_not_found_is_empty_and_none() {
    let mut mapper = users_mapper();
    assert!(mapper.find_by("email", "a@x.com").unwrap().is_empty());
    assert!(mapper.find_one_by("email", "a@x.com").unwrap().is_none());
}

#[test]
fn find_by_rejects_unknown_field_names() {
    let mut mapper = users_mapper();
    assert_eq!(
        mapper.find_by("password", "x").unwrap_err(),
        Error::UnknownField("password".to_string())
    );
    assert_eq!(
        mapper.delete_by("password", "x").unwrap_err(),
        Error::UnknownField("password".to_string())
    );
}

#[test]
fn find_all_preserves_row_order() {
    let mut mapper = users_mapper();
    for name in ["Ann", "Bob", "Cal"] {
        new_user(&mapper, name, "x@x.com").save(&mut mapper).unwrap();
    }
    let names: Vec<Value> = mapper
        .find_all()
        .unwrap()
        .iter()
        .map(|u| u.get("name").clone())
        .collect();
    assert_eq!(
        names,
        vec![Value::from("Ann"), Value::from("Bob"), Value::from("Cal")]
    );
}

#[test]
fn find_ids_keeps_input_order_and_defines_empty_input() {
    let mut mapper = users_mapper();
    for name in ["Ann", "Bob", "Cal"] {
        new_user(&mapper, name, "x@x.com").save(&mut mapper).unwrap();
    }

    assert!(mapper.find_ids(&[]).unwrap().is_empty());

    let found = mapper
        .find_ids(&[Value::Int(3), Value::Int(1)])
        .unwrap();
    let names: Vec<&Value> = found.iter().map(|u| u.get("name")).collect();
    assert_eq!(names, vec![&Value::from("Cal"), &Value::from("Ann")]);

    // Ids with no matching row are omitted.
    let found = mapper
        .find_ids(&[Value::Int(2), Value::Int(99)])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("name"), &Value::from("Bob"));
}

#[test]
fn by_sql_fragments_are_taken_verbatim() {
    let mut mapper = users_mapper();
    for (name, email) in [("Ann", "a@x.com"), ("Bob", "b@x.com")] {
        new_user(&mapper, name, email).save(&mut mapper).unwrap();
    }

    let hits = mapper.find_all_by_sql("email = 'b@x.com'").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].get("name"), &Value::from("Bob"));

    let one = mapper.find_one_by_sql("id > 0").unwrap().expect("first row");
    assert_eq!(one.get("name"), &Value::from("Ann"));
}

#[test]
fn escaped_values_survive_the_round_trip() {
    let mut mapper = users_mapper();
    let mut user = new_user(&mapper, "O'Brien", "ob@x.com");
    user.save(&mut mapper).unwrap();

    // Values travel as parameters, so the quote needs no caller escaping.
    let found = mapper.find_one_by("name", "O'Brien").unwrap().expect("hit");
    assert_eq!(found.get("name"), &Value::from("O'Brien"));

    // The raw-fragment path is where the escape primitive matters.
    let fragment = format!("name = '{}'", mapper.escape("O'Brien"));
    let found = mapper.find_one_by_sql(&fragment).unwrap().expect("hit");
    assert_eq!(found.get("email"), &Value::from("ob@x.com"));
}

#[test]
fn escape_covers_scalars_mappings_and_models() {
    let mut mapper = users_mapper();
    assert_eq!(mapper.escape("O'Brien"), "O''Brien");
    assert_eq!(
        mapper.escape_value(&Value::from("it's")),
        Value::from("it''s")
    );
    // Non-text scalars pass through unchanged.
    assert_eq!(mapper.escape_value(&Value::Int(5)), Value::Int(5));

    let mut ann = new_user(&mapper, "O'Brien", "ob@x.com");
    ann.save(&mut mapper).unwrap();
    let escaped = mapper.escape_model(&ann);
    assert_eq!(escaped["name"], Value::from("O''Brien"));
    assert_eq!(escaped["email"], Value::from("ob@x.com"));
    assert_eq!(escaped["id"], Value::Int(1));
}

#[test]
fn create_object_rejects_unrecognized_columns() {
    let mapper = users_mapper();
    let mut fields = HashMap::new();
    fields.insert("password".to_string(), Value::from("x"));
    assert_eq!(
        mapper.create_object(fields).unwrap_err(),
        Error::UnknownField("password".to_string())
    );
}

#[test]
fn dump_lists_type_then_fields() {
    let mut mapper = users_mapper();
    let mut ann = new_user(&mapper, "Ann", "a@x.com");
    ann.save(&mut mapper).unwrap();

    let dump = ann.dump();
    let mut lines = dump.lines();
    assert!(lines.next().unwrap().ends_with("User"));
    assert_eq!(lines.next(), Some("id : 1"));
    assert_eq!(lines.next(), Some("name : Ann"));
    assert_eq!(lines.next(), Some("email : a@x.com"));
}
