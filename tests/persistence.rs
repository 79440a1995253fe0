//! On-disk layout and reopen tests
//!
//! Rows and index tables written through one handle must be readable
//! through a fresh handle on the same directory.

use std::fs;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use rowquery::backend::LocalBackend;
use rowquery::table::IndexTable;
use rowquery::{Criteria, Row, RowId, RowStore, StoreOptions};

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn open(dir: &TempDir) -> RowStore {
    RowStore::open(
        "people",
        Arc::new(LocalBackend::new(dir.path())),
        &StoreOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_layout() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    people.insert(row(json!({"name": "a", "age": 10}))).unwrap();
    people.insert(row(json!({"name": "b", "age": 20}))).unwrap();
    people.add_index_table("age").unwrap();

    let table_dir = dir.path().join("people");
    assert!(table_dir.join("rows/0000.json").is_file());
    assert!(table_dir.join("rows/0001.json").is_file());

    let stored: Value =
        serde_json::from_slice(&fs::read(table_dir.join("rows/0001.json")).unwrap()).unwrap();
    assert_eq!(stored, json!({"id": "0001", "name": "b", "age": 20}));

    let index: Value =
        serde_json::from_slice(&fs::read(table_dir.join("indexes/age.json")).unwrap()).unwrap();
    assert_eq!(
        index,
        json!([
            {"value": 10, "ids": ["0000"]},
            {"value": 20, "ids": ["0001"]},
        ])
    );
}

#[test]
fn test_reopen_sees_rows_and_indexes() {
    let dir = TempDir::new().unwrap();
    {
        let people = open(&dir);
        people.insert(row(json!({"name": "a", "age": 10}))).unwrap();
        people.insert(row(json!({"name": "b", "age": 20}))).unwrap();
        people.add_index_table("age").unwrap();
    }

    let people = open(&dir);
    assert_eq!(people.len().unwrap(), 2);
    assert_eq!(people.index_columns().unwrap(), vec!["age"]);

    let query = people.query().filter(Criteria::new().eq("age", 20));
    assert!(query.plan().uses_index());
    assert_eq!(query.get().unwrap()[0]["name"], json!("b"));

    // ids continue after the current maximum
    assert_eq!(people.insert(row(json!({"name": "c"}))).unwrap(), RowId::new(2));
}

#[test]
fn test_erased_row_file_removed() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    let id = people.insert(row(json!({"name": "a"}))).unwrap();

    people.erase(id).unwrap();

    assert!(!dir.path().join("people/rows/0000.json").exists());
    assert!(people.read(id).unwrap().is_none());
}

#[test]
fn test_foreign_files_ignored() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    people.insert(row(json!({"name": "a"}))).unwrap();
    fs::write(dir.path().join("people/rows/notes.txt"), b"hello").unwrap();

    assert_eq!(people.row_ids().unwrap(), vec![RowId::new(0)]);
    assert_eq!(people.query().count().unwrap(), 1);
}

#[test]
fn test_corrupted_row_is_fatal() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    let id = people.insert(row(json!({"name": "a"}))).unwrap();
    fs::write(dir.path().join("people/rows/0000.json"), b"{ truncated").unwrap();

    let err = people.read(id).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.code(), "ROWQUERY_DATA_CORRUPTION");
}

#[test]
fn test_index_file_roundtrips_through_index_table() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    people.insert(row(json!({"flag": true}))).unwrap();
    people.insert(row(json!({"flag": false}))).unwrap();
    people.insert(row(json!({}))).unwrap();
    people.add_index_table("flag").unwrap();

    let path = dir.path().join("people/indexes/flag.json");
    let bytes = fs::read(&path).unwrap();
    let table = IndexTable::from_bytes("flag", "people/indexes/flag.json", &bytes).unwrap();

    assert_eq!(table.key_count(), 3);
    assert_eq!(table, people.get_index_table("flag").unwrap());
}

#[test]
fn test_drop_table_removes_directory() {
    let dir = TempDir::new().unwrap();
    let people = open(&dir);
    people.insert(row(json!({"name": "a"}))).unwrap();
    people.add_index_table("name").unwrap();

    people.drop_table().unwrap();

    assert!(!dir.path().join("people").exists());
    assert!(people.is_empty().unwrap());
    assert!(!people.has_index_table("name"));
}
