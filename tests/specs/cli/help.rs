//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();
    let run = temp.tally().args(&["--help"]).passes();
    let out = run.stdout();
    for command in [
        "list", "get", "insert", "update", "remove", "restore", "purge", "count", "export",
        "import",
    ] {
        assert!(out.contains(command), "missing {command} in:\n{out}");
    }
}

#[test]
fn help_documents_global_flags() {
    let temp = Project::empty();
    temp.tally()
        .args(&["list", "--help"])
        .passes()
        .stdout_has("--data-dir")
        .stdout_has("--show-events")
        .stdout_has("--deleted");
}
