// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Export and import commands

use crate::store::Records;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use tally_storage::ImportOptions;

pub async fn export(records: &Records) -> Result<Value> {
    Ok(records.export_json().await?)
}

pub async fn import(records: &Records, file: &Path, merge: bool) -> Result<Value> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let data: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", file.display()))?;
    let imported = records.import_json(data, ImportOptions { merge }).await?;
    Ok(json!({ "imported": imported, "merge": merge }))
}
