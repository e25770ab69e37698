// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle topics and change payloads published by collections

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_adapters::Document;

/// A mutating collection operation with its own lifecycle topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Update,
    Remove,
    HardRemove,
    Restore,
    BulkInsert,
    BulkUpdate,
    BulkRemove,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Remove => "remove",
            Operation::HardRemove => "hardRemove",
            Operation::Restore => "restore",
            Operation::BulkInsert => "bulkInsert",
            Operation::BulkUpdate => "bulkUpdate",
            Operation::BulkRemove => "bulkRemove",
        }
    }

    /// Change type announced on `<collection>.change`. Hard removal reports as `remove`.
    pub fn change_type(self) -> ChangeType {
        match self {
            Operation::Insert => ChangeType::Insert,
            Operation::Update => ChangeType::Update,
            Operation::Remove | Operation::HardRemove => ChangeType::Remove,
            Operation::Restore => ChangeType::Restore,
            Operation::BulkInsert => ChangeType::BulkInsert,
            Operation::BulkUpdate => ChangeType::BulkUpdate,
            Operation::BulkRemove => ChangeType::BulkRemove,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

/// `<collection>.<before|after>.<op>`
pub fn lifecycle_topic(collection: &str, phase: Phase, op: Operation) -> String {
    format!("{}.{}.{}", collection, phase.as_str(), op.as_str())
}

/// `<collection>.change`
pub fn change_topic(collection: &str) -> String {
    format!("{collection}.change")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeType {
    Insert,
    Update,
    Remove,
    Restore,
    BulkInsert,
    BulkUpdate,
    BulkRemove,
}

/// Payload of `<collection>.change`.
///
/// Record-carrying changes fill `records`; removals fill `ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeType,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Document>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
}

impl ChangeEvent {
    pub fn with_records(kind: ChangeType, collection: &str, records: Vec<Document>) -> Self {
        Self {
            kind,
            collection: collection.to_string(),
            records: Some(records),
            ids: None,
        }
    }

    pub fn with_ids(kind: ChangeType, collection: &str, ids: Vec<String>) -> Self {
        Self {
            kind,
            collection: collection.to_string(),
            records: None,
            ids: Some(ids),
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
