//! Tests for load module

use super::*;
use crate::error::ErrorKind;
use crate::schema::ColumnType;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn users(ids: &[&str]) -> RecordSet {
    ids.iter()
        .map(|id| json!({"id": id, "login": format!("user{id}"), "last_updated": "2024-03-01 09:30:00"}))
        .collect()
}

fn users_schema() -> ColumnTypeMap {
    let mut map = ColumnTypeMap::new();
    map.insert(
        &TableName::new("users"),
        vec![ColumnType::Int, ColumnType::Varchar, ColumnType::DateTime],
    );
    map
}

fn db_loader() -> Loader {
    Loader::with_database(DatabaseEngine::open_in_memory().unwrap())
}

fn ids_in(loader: &Loader, table: &str) -> Vec<i64> {
    let conn = loader.database().unwrap().connection();
    let mut stmt = conn
        .prepare(&format!("SELECT id FROM {table} ORDER BY id"))
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

// ============================================================================
// Type Tests
// ============================================================================

#[test]
fn test_table_name_sanitizing() {
    assert_eq!(TableName::new("`groups`").as_str(), "groups");
    assert_eq!(TableName::new("\"users\"").as_str(), "users");
    assert_eq!(TableName::new(" [course_fields] ").as_str(), "course_fields");
    assert_eq!(TableName::new("`groups`").quoted(), "\"groups\"");
    assert!(TableName::new("``").is_empty());
}

#[test]
fn test_load_target_schema_key() {
    let target = LoadTarget::table("`groups`", WriteMode::Replace);
    assert_eq!(target.schema_key().unwrap().as_str(), "groups");

    let target = LoadTarget::csv("groups_data.csv");
    assert!(target.schema_key().is_none());

    let target = target.with_schema_table("groups");
    assert_eq!(target.schema_key().unwrap().as_str(), "groups");
}

#[test]
fn test_write_mode_from_replace() {
    assert_eq!(WriteMode::from_replace(true), WriteMode::Replace);
    assert_eq!(WriteMode::from_replace(false), WriteMode::Append);
    assert_eq!(WriteMode::default(), WriteMode::Replace);
}

// ============================================================================
// Table Load Tests
// ============================================================================

#[test]
fn test_replace_twice_keeps_only_last_load() {
    let mut loader = db_loader();
    let target = LoadTarget::table("users", WriteMode::Replace);
    let schema = users_schema();

    loader.load(&users(&["1", "2", "3"]), &target, &schema).unwrap();
    let report = loader.load(&users(&["4", "5"]), &target, &schema).unwrap();

    assert_eq!(report.rows_written, 2);
    assert_eq!(ids_in(&loader, "users"), vec![4, 5]);
}

#[test]
fn test_append_keeps_union() {
    let mut loader = db_loader();
    let schema = users_schema();

    loader
        .load(&users(&["1", "2"]), &LoadTarget::table("users", WriteMode::Replace), &schema)
        .unwrap();
    loader
        .load(&users(&["2", "3"]), &LoadTarget::table("users", WriteMode::Append), &schema)
        .unwrap();

    assert_eq!(ids_in(&loader, "users"), vec![1, 2, 2, 3]);
}

#[test]
fn test_nested_values_rejected_without_write() {
    let mut loader = db_loader();
    let records: RecordSet = vec![
        json!({"id": "1", "login": "a"}),
        json!({"id": "2", "fields": {"branch": "b1"}}),
    ]
    .into();

    let err = loader
        .load(&records, &LoadTarget::table("registration", WriteMode::Replace), &ColumnTypeMap::new())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Schema);
    let exists = loader
        .database()
        .unwrap()
        .table_exists(&TableName::new("registration"))
        .unwrap();
    assert!(!exists);
}

#[test]
fn test_nested_values_leave_existing_rows() {
    let mut loader = db_loader();
    let schema = users_schema();
    let target = LoadTarget::table("users", WriteMode::Replace);
    loader.load(&users(&["1"]), &target, &schema).unwrap();

    let bad: RecordSet = vec![json!({"id": "9", "groups": ["g1"]})].into();
    assert!(loader.load(&bad, &target, &schema).is_err());

    assert_eq!(ids_in(&loader, "users"), vec![1]);
}

#[test]
fn test_coercion_applied_and_reported() {
    let mut loader = db_loader();
    let records: RecordSet = vec![
        json!({"id": "3", "login": "a", "last_updated": "01/03/2024, 09:30:00"}),
        json!({"id": "x", "login": 5, "last_updated": "never"}),
        json!({"id": null, "login": null, "last_updated": null}),
    ]
    .into();

    let report = loader
        .load(&records, &LoadTarget::table("`users`", WriteMode::Replace), &users_schema())
        .unwrap();

    assert_eq!(report.rows_written, 3);
    assert_eq!(report.coercion.substituted("id"), 2);
    assert_eq!(report.coercion.substituted("last_updated"), 1);
    assert_eq!(ids_in(&loader, "users"), vec![0, 0, 3]);

    let logins: Vec<String> = {
        let conn = loader.database().unwrap().connection();
        let mut stmt = conn.prepare("SELECT login FROM users ORDER BY login").unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(logins, vec!["", "5", "a"]);
}

#[test]
fn test_table_target_without_database() {
    let mut loader = Loader::new();
    let err = loader
        .load(&users(&["1"]), &LoadTarget::table("users", WriteMode::Replace), &users_schema())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

// ============================================================================
// CSV Load Tests
// ============================================================================

#[test]
fn test_csv_load_without_schema_entry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users_data.csv");
    let mut loader = Loader::new();

    let report = loader
        .load(&users(&["1", "2"]), &LoadTarget::csv(&path), &users_schema())
        .unwrap();

    assert_eq!(report.rows_written, 2);
    assert!(report.coercion.columns.is_empty());
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "id,login,last_updated\n1,user1,2024-03-01 09:30:00\n2,user2,2024-03-01 09:30:00\n"
    );
}

#[test]
fn test_csv_load_with_schema_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users_data.csv");
    let mut loader = Loader::new();
    let records: RecordSet = vec![json!({"id": "7.8", "login": null, "last_updated": "2024-03-01"})].into();

    let target = LoadTarget::csv(&path).with_schema_table("users");
    loader.load(&records, &target, &users_schema()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "id,login,last_updated\n7,,2024-03-01 00:00:00\n");
}

#[test]
fn test_csv_load_rejects_nested_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("registration_data.csv");
    let mut loader = Loader::new();
    let records: RecordSet = vec![json!({"id": "1", "fields": {"a": 1}})].into();

    assert!(loader.load(&records, &LoadTarget::csv(&path), &ColumnTypeMap::new()).is_err());
    assert!(!path.exists());
}
