// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record commands

use crate::store::Records;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tally_adapters::{BulkOptions, Document, Filter};
use tally_storage::{CollectionError, Direction};

pub async fn list(
    records: &Records,
    deleted: bool,
    filters: Vec<Filter>,
    sort: Option<(String, Direction)>,
    limit: Option<usize>,
) -> Result<Value> {
    let mut query = if deleted {
        records.query_including_deleted()
    } else {
        records.query()
    };
    for filter in filters {
        query = query.filter(filter);
    }
    if let Some((field, direction)) = sort {
        query = query.order_by(field, direction);
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(serde_json::to_value(query.fetch().await?)?)
}

pub async fn get(records: &Records, id: &str, deleted: bool) -> Result<Value> {
    let record = if deleted {
        records.get_including_deleted(id).await?
    } else {
        records.get(id).await?
    };
    let record = record.ok_or_else(|| {
        anyhow!(CollectionError::NotFound {
            collection: records.name().to_string(),
            id: id.to_string(),
        })
    })?;
    Ok(serde_json::to_value(record)?)
}

pub async fn insert(records: &Records, fields: Document) -> Result<Value> {
    Ok(serde_json::to_value(records.insert(fields).await?)?)
}

pub async fn update(
    records: &Records,
    id: &str,
    changes: Document,
    expect_version: Option<u64>,
) -> Result<Value> {
    let record = match expect_version {
        Some(expected) => records.update_if_version(id, expected, changes).await?,
        None => records.update(id, changes).await?,
    };
    Ok(serde_json::to_value(record)?)
}

pub async fn remove(records: &Records, ids: Vec<String>) -> Result<Value> {
    let removed = if ids.len() == 1 {
        records.remove(&ids[0]).await?;
        ids
    } else {
        records.bulk_remove(&ids, &BulkOptions::default()).await?
    };
    Ok(json!({ "removed": removed }))
}

pub async fn restore(records: &Records, id: &str) -> Result<Value> {
    Ok(serde_json::to_value(records.restore(id).await?)?)
}

pub async fn purge(records: &Records, id: &str) -> Result<Value> {
    records.hard_remove(id).await?;
    Ok(json!({ "purged": id }))
}

pub async fn count(records: &Records, filters: &[Filter]) -> Result<Value> {
    Ok(json!({ "count": records.count(filters).await? }))
}
