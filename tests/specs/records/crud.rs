//! Insert, get, update specs

use crate::prelude::*;

#[test]
fn insert_assigns_metadata_and_persists() {
    let temp = Project::empty();
    let record = temp.insert("customers", r#"{"name":"Acme"}"#);

    assert_eq!(record["name"], json!("Acme"));
    assert_eq!(record["version"], json!(1));
    assert_eq!(record["deletedAt"], Value::Null);
    assert_eq!(record["createdAt"], record["updatedAt"]);
    assert!(record["id"].as_str().is_some_and(|id| !id.is_empty()));

    let stored: Value = serde_json::from_str(&temp.read(".tally/customers.json")).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 1);
}

#[test]
fn insert_keeps_supplied_id() {
    let temp = Project::empty();
    temp.insert("vendors", r#"{"id":"v-100","name":"Lumber Co"}"#);

    let record = temp
        .tally()
        .args(&["get", "vendors", "v-100"])
        .passes()
        .stdout_json();
    assert_eq!(record["name"], json!("Lumber Co"));
}

#[test]
fn update_merges_and_bumps_version() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"j1","site":"Elm St","status":"bid"}"#);

    let updated = temp
        .tally()
        .args(&["update", "jobs", "j1", r#"{"status":"won","id":"other"}"#])
        .passes()
        .stdout_json();

    assert_eq!(updated["id"], json!("j1"));
    assert_eq!(updated["site"], json!("Elm St"));
    assert_eq!(updated["status"], json!("won"));
    assert_eq!(updated["version"], json!(2));
}

#[test]
fn update_of_missing_record_fails() {
    let temp = Project::empty();
    temp.tally()
        .args(&["update", "jobs", "ghost", r#"{"status":"won"}"#])
        .fails()
        .stderr_has("not found: jobs/ghost");
}

#[test]
fn expect_version_guards_against_stale_updates() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"j1","status":"bid"}"#);
    temp.tally()
        .args(&["update", "jobs", "j1", r#"{"status":"won"}"#, "--expect-version", "1"])
        .passes();

    temp.tally()
        .args(&["update", "jobs", "j1", r#"{"status":"lost"}"#, "--expect-version", "1"])
        .fails()
        .stderr_has("version conflict on jobs/j1: expected 1, found 2");
}

#[test]
fn data_dir_flag_overrides_default() {
    let temp = Project::empty();
    temp.tally()
        .args(&["--data-dir", "books", "insert", "ledger", r#"{"memo":"opening"}"#])
        .passes();

    assert!(temp.path().join("books/ledger.json").is_file());
    assert!(!temp.path().join(".tally/ledger.json").exists());
}
