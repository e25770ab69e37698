// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

mod records;
mod transfer;

use crate::store::Store;
use anyhow::{bail, Result};
use clap::Subcommand;
use serde_json::Value;
use std::path::PathBuf;
use tally_adapters::{Document, Filter};
use tally_storage::Direction;

#[derive(Subcommand)]
pub enum Command {
    /// List live records
    List {
        collection: String,
        /// Include soft-deleted records
        #[arg(long)]
        deleted: bool,
        /// Keep records whose FIELD equals VALUE (VALUE is parsed as JSON when it can be)
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
        /// Sort by FIELD, ascending unless suffixed with `:desc`
        #[arg(long, value_name = "FIELD[:desc]")]
        sort: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one record
    Get {
        collection: String,
        id: String,
        /// Also find soft-deleted records
        #[arg(long)]
        deleted: bool,
    },
    /// Insert a record from a JSON object
    Insert { collection: String, json: String },
    /// Merge a JSON object into a record
    Update {
        collection: String,
        id: String,
        json: String,
        /// Fail unless the stored version equals this
        #[arg(long, value_name = "VERSION")]
        expect_version: Option<u64>,
    },
    /// Soft delete records; with several ids, unknown ones are skipped
    Remove {
        collection: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Undo a soft delete
    Restore { collection: String, id: String },
    /// Permanently delete a record
    Purge { collection: String, id: String },
    /// Count live records
    Count {
        collection: String,
        #[arg(long = "where", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },
    /// Dump every record, soft-deleted ones included
    Export { collection: String },
    /// Load records from a JSON array file
    Import {
        collection: String,
        file: PathBuf,
        /// Keep existing records not present in the file
        #[arg(long)]
        merge: bool,
    },
}

/// Run `command` and return the value to print
pub async fn run(command: Command, store: &Store) -> Result<Value> {
    match command {
        Command::List {
            collection,
            deleted,
            filters,
            sort,
            limit,
        } => {
            let filters = parse_filters(&filters)?;
            let sort = sort.as_deref().map(parse_sort).transpose()?;
            records::list(&store.collection(&collection), deleted, filters, sort, limit).await
        }
        Command::Get {
            collection,
            id,
            deleted,
        } => records::get(&store.collection(&collection), &id, deleted).await,
        Command::Insert { collection, json } => {
            records::insert(&store.collection(&collection), parse_object(&json)?).await
        }
        Command::Update {
            collection,
            id,
            json,
            expect_version,
        } => {
            records::update(
                &store.collection(&collection),
                &id,
                parse_object(&json)?,
                expect_version,
            )
            .await
        }
        Command::Remove { collection, ids } => {
            records::remove(&store.collection(&collection), ids).await
        }
        Command::Restore { collection, id } => {
            records::restore(&store.collection(&collection), &id).await
        }
        Command::Purge { collection, id } => {
            records::purge(&store.collection(&collection), &id).await
        }
        Command::Count {
            collection,
            filters,
        } => records::count(&store.collection(&collection), &parse_filters(&filters)?).await,
        Command::Export { collection } => {
            transfer::export(&store.collection(&collection)).await
        }
        Command::Import {
            collection,
            file,
            merge,
        } => transfer::import(&store.collection(&collection), &file, merge).await,
    }
}

fn parse_object(text: &str) -> Result<Document> {
    match serde_json::from_str(text)? {
        Value::Object(fields) => Ok(fields),
        other => bail!("expected a JSON object, got {}", other),
    }
}

/// JSON when it parses, otherwise the raw string
fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn parse_filters(raw: &[String]) -> Result<Vec<Filter>> {
    raw.iter()
        .map(|item| match item.split_once('=') {
            Some((field, value)) if !field.is_empty() => Ok(Filter::eq(field, parse_value(value))),
            _ => bail!("invalid filter {:?}: expected FIELD=VALUE", item),
        })
        .collect()
}

fn parse_sort(raw: &str) -> Result<(String, Direction)> {
    let (field, direction) = match raw.rsplit_once(':') {
        Some((field, "desc")) => (field, Direction::Desc),
        Some((field, "asc")) => (field, Direction::Asc),
        _ => (raw, Direction::Asc),
    };
    if field.is_empty() {
        bail!("invalid sort {:?}", raw);
    }
    Ok((field.to_string(), direction))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
