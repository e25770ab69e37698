//! Schema validation from tally.toml

use crate::prelude::*;

const CONFIG: &str = r#"
[schemas.customers.fields.name]
type = "string"
required = true

[schemas.customers.fields.creditLimit]
type = "number"
"#;

#[test]
fn schema_rejects_missing_required_field() {
    let temp = Project::empty();
    temp.file("tally.toml", CONFIG);

    temp.tally()
        .args(&["insert", "customers", r#"{"creditLimit":5000}"#])
        .fails()
        .stderr_has("validation failed for customers")
        .stderr_has("name");

    assert!(!temp.path().join(".tally/customers.json").exists());
}

#[test]
fn schema_rejects_wrong_type_on_update() {
    let temp = Project::empty();
    temp.file("tally.toml", CONFIG);
    temp.insert("customers", r#"{"id":"c1","name":"Acme"}"#);

    temp.tally()
        .args(&["update", "customers", "c1", r#"{"creditLimit":"lots"}"#])
        .fails()
        .stderr_has("validation failed for customers");

    let record = temp
        .tally()
        .args(&["get", "customers", "c1"])
        .passes()
        .stdout_json();
    assert_eq!(record["version"], json!(1));
}

#[test]
fn collections_without_schema_accept_anything() {
    let temp = Project::empty();
    temp.file("tally.toml", CONFIG);
    temp.insert("notes", r#"{"anything":[1,2,3]}"#);
}

#[test]
fn config_data_dir_is_relative_to_config_file() {
    let temp = Project::empty();
    temp.file("conf/tally.toml", "data_dir = \"../ledger\"\n");

    temp.tally()
        .args(&["--config", "conf/tally.toml", "insert", "jobs", "{}"])
        .passes();

    assert!(temp.path().join("ledger/jobs.json").is_file());
}

#[test]
fn unknown_config_keys_are_rejected() {
    let temp = Project::empty();
    temp.file("tally.toml", "colour = \"blue\"\n");

    temp.tally()
        .args(&["list", "jobs"])
        .fails()
        .stderr_has("parsing config");
}
