//! --show-events output

use crate::prelude::*;

fn topics(stderr: &str) -> Vec<String> {
    stderr
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|event| event["event"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn insert_emits_lifecycle_and_change_events() {
    let temp = Project::empty();
    let run = temp
        .tally()
        .args(&["--show-events", "insert", "customers", r#"{"name":"Acme"}"#])
        .passes();

    assert_eq!(
        topics(&run.stderr()),
        vec![
            "customers.before.insert",
            "customers.after.insert",
            "customers.change",
        ]
    );
}

#[test]
fn change_event_carries_removed_ids() {
    let temp = Project::empty();
    temp.insert("jobs", r#"{"id":"a"}"#);

    let run = temp
        .tally()
        .args(&["--show-events", "remove", "jobs", "a"])
        .passes();

    let change = run
        .stderr()
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .find(|event| event["event"] == json!("jobs.change"))
        .unwrap();
    assert_eq!(change["payload"]["type"], json!("remove"));
    assert_eq!(change["payload"]["ids"], json!(["a"]));
}

#[test]
fn events_are_printed_even_when_the_command_fails() {
    let temp = Project::empty();
    temp.file(
        "tally.toml",
        "[schemas.jobs.fields.site]\ntype = \"string\"\nrequired = true\n",
    );

    let run = temp
        .tally()
        .args(&["--show-events", "insert", "jobs", "{}"])
        .fails();
    assert!(topics(&run.stderr()).is_empty());
    assert!(run.stderr().contains("validation failed"));
}

#[test]
fn events_are_silent_by_default() {
    let temp = Project::empty();
    let run = temp
        .tally()
        .args(&["insert", "customers", "{}"])
        .passes();
    assert!(topics(&run.stderr()).is_empty());
}
