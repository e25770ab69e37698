//! Soft delete, restore, purge specs

use crate::prelude::*;

#[test]
fn remove_hides_and_restore_returns() {
    let temp = Project::empty();
    temp.insert("customers", r#"{"id":"c1","name":"Acme"}"#);

    temp.tally()
        .args(&["remove", "customers", "c1"])
        .passes()
        .stdout_has("\"c1\"");

    temp.tally().args(&["get", "customers", "c1"]).fails();
    let deleted = temp
        .tally()
        .args(&["get", "customers", "c1", "--deleted"])
        .passes()
        .stdout_json();
    assert!(deleted["deletedAt"].is_string());
    assert_eq!(deleted["version"], json!(2));

    let restored = temp
        .tally()
        .args(&["restore", "customers", "c1"])
        .passes()
        .stdout_json();
    assert_eq!(restored["deletedAt"], Value::Null);
    assert_eq!(restored["version"], json!(3));

    temp.tally().args(&["get", "customers", "c1"]).passes();
}

#[test]
fn restore_of_live_record_fails() {
    let temp = Project::empty();
    temp.insert("customers", r#"{"id":"c1"}"#);
    temp.tally()
        .args(&["restore", "customers", "c1"])
        .fails()
        .stderr_has("not deleted: customers/c1");
}

#[test]
fn remove_many_skips_unknown_ids() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"a"}"#);
    temp.insert("jobs", r#"{"id":"b"}"#);

    let out = temp
        .tally()
        .args(&["remove", "jobs", "a", "ghost", "b"])
        .passes()
        .stdout_json();
    assert_eq!(out, json!({ "removed": ["a", "b"] }));

    let count = temp.tally().args(&["count", "jobs"]).passes().stdout_json();
    assert_eq!(count, json!({ "count": 0 }));
}

#[test]
fn purge_deletes_permanently() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"a"}"#);

    temp.tally().args(&["purge", "jobs", "a"]).passes();
    temp.tally()
        .args(&["get", "jobs", "a", "--deleted"])
        .fails()
        .stderr_has("not found");
    temp.tally().args(&["purge", "jobs", "a"]).fails();
}
