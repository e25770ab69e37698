// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value storage adapters keyed by collection name and record id

mod json;
mod memory;
mod table;

pub use json::JsonFileAdapter;
pub use memory::MemoryAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AdapterCall, FakeAdapter};

use crate::filter::Filter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record: a JSON object with a string `id` field
pub type Document = Map<String, Value>;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("duplicate id: {collection}/{id}")]
    Duplicate { collection: String, id: String },
    #[error("record in {collection} has no string id")]
    MissingId { collection: String },
    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Tuning for bulk writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOptions {
    /// Apply in chunks of this many records; `None` applies the batch as one chunk.
    /// A batch is always persisted as a whole.
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl BulkOptions {
    pub fn batched(batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size),
        }
    }

    /// Chunk length to use for `total` records; never zero
    pub fn chunk_len(&self, total: usize) -> usize {
        self.batch_size
            .filter(|n| *n > 0)
            .unwrap_or(total)
            .max(1)
    }
}

/// Adapter for record persistence.
///
/// Implementations must keep per-id last-write-wins semantics and always return the
/// full stored document on reads and writes.
#[async_trait]
pub trait StorageAdapter: Clone + Send + Sync + 'static {
    /// Fetch one record
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AdapterError>;

    /// Fetch every record in the collection
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AdapterError>;

    /// Store a new record; fails if its id is taken
    async fn insert(&self, collection: &str, record: Document) -> Result<Document, AdapterError>;

    /// Merge top-level fields of `changes` over the stored record
    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, AdapterError>;

    /// Delete a record permanently
    async fn remove(&self, collection: &str, id: &str) -> Result<(), AdapterError>;

    /// Insert many records; no record is written if any id is taken
    async fn bulk_insert(
        &self,
        collection: &str,
        records: Vec<Document>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError>;

    /// Apply many `(id, changes)` merges; no record is written if any id is missing
    async fn bulk_update(
        &self,
        collection: &str,
        updates: Vec<(String, Document)>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError>;

    /// Count records matching every filter
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<usize, AdapterError>;

    /// Dump the collection verbatim
    async fn export_collection(&self, collection: &str) -> Result<Vec<Document>, AdapterError>;

    /// Load records; without `merge` the collection is replaced
    async fn import_collection(
        &self,
        collection: &str,
        records: Vec<Document>,
        merge: bool,
    ) -> Result<(), AdapterError>;
}

/// String id of a document, if it has one
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}
