//! Export and import specs

use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn export_then_import_reproduces_collection() {
    let source = Project::empty();
    source.insert("vendors", r#"{"id":"v1","name":"Lumber Co"}"#);
    source.insert("vendors", r#"{"id":"v2","name":"Concrete Inc"}"#);
    source.tally().args(&["remove", "vendors", "v2"]).passes();

    let dump = source
        .tally()
        .args(&["export", "vendors"])
        .passes()
        .stdout_json();

    let target = Project::empty();
    target.file("vendors.json", &dump.to_string());
    target
        .tally()
        .args(&["import", "vendors", "vendors.json"])
        .passes()
        .stdout_has("\"imported\": 2");

    let round_trip = target
        .tally()
        .args(&["export", "vendors"])
        .passes()
        .stdout_json();
    assert_eq!(round_trip, dump);
}

#[test]
fn import_defaults_metadata_and_merges() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"existing"}"#);
    temp.file("jobs.json", r#"[{"id":"new","site":"Oak Ave"},{"site":"Pine Rd"}]"#);

    temp.tally()
        .args(&["import", "jobs", "jobs.json", "--merge"])
        .passes();

    let all = temp.tally().args(&["list", "jobs"]).passes().stdout_json();
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|r| r["version"] == json!(1)));
    assert!(all.iter().all(|r| r["createdAt"].is_string()));
}

#[test]
fn import_without_merge_replaces() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"old"}"#);
    temp.file("jobs.json", r#"[{"id":"new"}]"#);

    temp.tally().args(&["import", "jobs", "jobs.json"]).passes();

    let rows = temp.tally().args(&["list", "jobs"]).passes().stdout_json();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["id"], json!("new"));
}

#[test]
fn import_rejects_non_array() {
    let temp = Project::empty();
    temp.file("bad.json", r#"{"id":"x"}"#);
    temp.tally()
        .args(&["import", "jobs", "bad.json"])
        .fails()
        .stderr_has("invalid import");
}
