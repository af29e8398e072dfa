//! Query cache semantics: one execution per statement text, write
//! invalidation, and cached failures.

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

    fn build(fields: FieldMap) -> User {
        User { fields }
    }
}

const FIND_SQL: &str = "select * from users where id = ?1 limit 1";

fn mapper_with_ann() -> Mapper<Users, MemoryConnection> {
    let mut conn = MemoryConnection::new();
    conn.create_table("users", &["name", "email"]);
    let mut mapper: Mapper<Users, MemoryConnection> =
        Mapper::connect(conn).expect("schema discovery");

    let mut fields = HashMap::new();
    fields.insert("name".to_string(), Value::from("Ann"));
    fields.insert("email".to_string(), Value::from("a@x.com"));
    let mut ann = mapper.create_object(fields).unwrap();
    ann.save(&mut mapper).unwrap();
    mapper
}

#[test]
fn repeated_reads_hit_the_connection_once() {
    let mut mapper = mapper_with_ann();

    let first = mapper.find(1_i64).unwrap().expect("ann");
    let second = mapper.find(1_i64).unwrap().expect("ann again");

    // Same full row both times: the cached result reads from row one.
    assert_eq!(first.to_array(), second.to_array());
    assert_eq!(mapper.connection().executions_of(FIND_SQL), 1);
}

#[test]
fn same_text_different_params_are_distinct_entries() {
    let mut mapper = mapper_with_ann();
    mapper.find(1_i64).unwrap();
    mapper.find(2_i64).unwrap();
    mapper.find(1_i64).unwrap();
    // Two distinct effective queries, each executed once.
    assert_eq!(mapper.connection().executions_of(FIND_SQL), 2);
}

#[test]
fn writes_invalidate_cached_reads() {
    let mut mapper = mapper_with_ann();

    let before = mapper.find(1_i64).unwrap().expect("ann");
    assert_eq!(before.get("email"), &Value::from("a@x.com"));

    let mut ann = mapper.find(1_i64).unwrap().expect("ann");
    let mut update = HashMap::new();
    update.insert("email".to_string(), Value::from("ann@x.com"));
    ann.save_fields(update, &mut mapper).unwrap();

    let after = mapper.find(1_i64).unwrap().expect("ann");
    assert_eq!(after.get("email"), &Value::from("ann@x.com"));
    // The post-write read had to go back to the connection.
    assert_eq!(mapper.connection().executions_of(FIND_SQL), 2);
}

#[test]
fn delete_then_find_is_none() {
    let mut mapper = mapper_with_ann();
    let ann = mapper.find(1_i64).unwrap().expect("ann");
    mapper.delete(&ann).unwrap();
    assert!(mapper.find(1_i64).unwrap().is_none());
}

#[test]
fn failures_are_cached_and_replayed() {
    let mut mapper = mapper_with_ann();

    let first = mapper.find_all_by_sql("flavor = 'mint'").unwrap_err();
    let second = mapper.find_all_by_sql("flavor = 'mint'").unwrap_err();
    assert_eq!(first, second);
    assert!(matches!(first, Error::Query(_)));
    assert_eq!(
        mapper
            .connection()
            .executions_of("select * from users where flavor = 'mint'"),
        1
    );
}

#[test]
fn cache_grows_without_eviction() {
    let mut mapper = mapper_with_ann();
    let baseline = mapper.cached_statements();
    for id in 1..=5_i64 {
        mapper.find(id).unwrap();
    }
    assert_eq!(mapper.cached_statements(), baseline + 5);

    // A second pass adds nothing; the entries persist.
    for id in 1..=5_i64 {
        mapper.find(id).unwrap();
    }
    assert_eq!(mapper.cached_statements(), baseline + 5);
}
