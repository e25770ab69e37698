//! List and count specs

use crate::prelude::*;

fn seed(temp: &Project) {
    temp.insert("invoices", r#"{"id":"i1","customer":"Acme","total":1200}"#);
    temp.insert("invoices", r#"{"id":"i2","customer":"Birch","total":300}"#);
    temp.insert("invoices", r#"{"id":"i3","customer":"Acme","total":50}"#);
    temp.tally().args(&["remove", "invoices", "i2"]).passes();
}

fn ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect()
}

#[test]
fn list_excludes_soft_deleted_unless_asked() {
    let temp = Project::empty();
    seed(&temp);

    let live = temp.tally().args(&["list", "invoices"]).passes().stdout_json();
    assert_eq!(ids(&live), vec!["i1", "i3"]);

    let all = temp
        .tally()
        .args(&["list", "invoices", "--deleted"])
        .passes()
        .stdout_json();
    assert_eq!(ids(&all), vec!["i1", "i2", "i3"]);
}

#[test]
fn list_filters_sorts_and_limits() {
    let temp = Project::empty();
    seed(&temp);

    let rows = temp
        .tally()
        .args(&[
            "list", "invoices", "--where", "customer=Acme", "--sort", "total", "--limit", "1",
        ])
        .passes()
        .stdout_json();
    assert_eq!(ids(&rows), vec!["i3"]);

    let rows = temp
        .tally()
        .args(&["list", "invoices", "--sort", "total:desc"])
        .passes()
        .stdout_json();
    assert_eq!(ids(&rows), vec!["i1", "i3"]);
}

#[test]
fn count_applies_filters_to_live_records() {
    let temp = Project::empty();
    seed(&temp);

    let count = temp
        .tally()
        .args(&["count", "invoices", "--where", "total=1200"])
        .passes()
        .stdout_json();
    assert_eq!(count, json!({ "count": 1 }));

    let count = temp
        .tally()
        .args(&["count", "invoices", "--where", "customer=Birch"])
        .passes()
        .stdout_json();
    assert_eq!(count, json!({ "count": 0 }));
}

#[test]
fn empty_collection_lists_nothing() {
    let temp = Project::empty();
    let rows = temp.tally().args(&["list", "nothing"]).passes().stdout_json();
    assert_eq!(rows, json!([]));
}
