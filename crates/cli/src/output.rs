// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use anyhow::Result;
use serde::Serialize;
use tally_core::EventRecord;

/// Print a command result as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print bus history to stderr, one compact JSON object per line
pub fn print_events(records: &[EventRecord]) {
    for record in records {
        if let Ok(line) = serde_json::to_string(record) {
            eprintln!("{}", line);
        }
    }
}
