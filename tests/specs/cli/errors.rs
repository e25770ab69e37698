//! Error reporting specs

use crate::prelude::*;

#[test]
fn missing_record_is_an_error() {
    let temp = Project::empty();
    temp.tally()
        .args(&["get", "customers", "nope"])
        .fails()
        .stderr_has("error: not found: customers/nope");
}

#[test]
fn insert_rejects_non_object_json() {
    let temp = Project::empty();
    temp.tally()
        .args(&["insert", "customers", "[1, 2]"])
        .fails()
        .stderr_has("error: expected a JSON object");
}

#[test]
fn malformed_filter_is_reported() {
    let temp = Project::empty();
    temp.tally()
        .args(&["count", "customers", "--where", "name"])
        .fails()
        .stderr_has("expected FIELD=VALUE");
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();
    temp.tally().args(&["frobnicate"]).fails();
}

#[test]
fn path_like_collection_names_are_refused() {
    let temp = Project::empty();
    temp.tally()
        .args(&["list", "../outside"])
        .fails()
        .stderr_has("invalid collection name");
}
