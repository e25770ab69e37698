// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake storage adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{document_id, AdapterError, BulkOptions, Document, MemoryAdapter, StorageAdapter};
use crate::filter::Filter;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded adapter call
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterCall {
    Get { collection: String, id: String },
    GetAll { collection: String },
    Insert { collection: String, id: Option<String> },
    Update { collection: String, id: String, changes: Document },
    Remove { collection: String, id: String },
    BulkInsert { collection: String, ids: Vec<String> },
    BulkUpdate { collection: String, ids: Vec<String> },
    Count { collection: String, filters: Vec<Filter> },
    Export { collection: String },
    Import { collection: String, count: usize, merge: bool },
}

impl AdapterCall {
    /// True for calls that change stored data
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            AdapterCall::Insert { .. }
                | AdapterCall::Update { .. }
                | AdapterCall::Remove { .. }
                | AdapterCall::BulkInsert { .. }
                | AdapterCall::BulkUpdate { .. }
                | AdapterCall::Import { .. }
        )
    }
}

/// In-memory adapter that records every call and can fail writes on demand
#[derive(Clone, Default)]
pub struct FakeAdapter {
    inner: MemoryAdapter,
    calls: Arc<Mutex<Vec<AdapterCall>>>,
    fail_next_write: Arc<Mutex<Option<String>>>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<AdapterCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded calls that change stored data
    pub fn writes(&self) -> Vec<AdapterCall> {
        self.calls().into_iter().filter(AdapterCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Make the next write fail with [`AdapterError::Unavailable`]
    pub fn fail_next_write(&self, message: impl Into<String>) {
        *self
            .fail_next_write
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    fn record(&self, call: AdapterCall) -> Result<(), AdapterError> {
        let is_write = call.is_write();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if !is_write {
            return Ok(());
        }
        match self
            .fail_next_write
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            Some(message) => Err(AdapterError::Unavailable(message)),
            None => Ok(()),
        }
    }
}

fn ids_of(records: &[Document]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| document_id(r).map(str::to_string))
        .collect()
}

#[async_trait]
impl StorageAdapter for FakeAdapter {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AdapterError> {
        self.record(AdapterCall::Get {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        self.inner.get(collection, id).await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        self.record(AdapterCall::GetAll {
            collection: collection.to_string(),
        })?;
        self.inner.get_all(collection).await
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, AdapterError> {
        self.record(AdapterCall::Insert {
            collection: collection.to_string(),
            id: document_id(&record).map(str::to_string),
        })?;
        self.inner.insert(collection, record).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, AdapterError> {
        self.record(AdapterCall::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            changes: changes.clone(),
        })?;
        self.inner.update(collection, id, changes).await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        self.record(AdapterCall::Remove {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;
        self.inner.remove(collection, id).await
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        records: Vec<Document>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        self.record(AdapterCall::BulkInsert {
            collection: collection.to_string(),
            ids: ids_of(&records),
        })?;
        self.inner.bulk_insert(collection, records, options).await
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: Vec<(String, Document)>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        self.record(AdapterCall::BulkUpdate {
            collection: collection.to_string(),
            ids: updates.iter().map(|(id, _)| id.clone()).collect(),
        })?;
        self.inner.bulk_update(collection, updates, options).await
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<usize, AdapterError> {
        self.record(AdapterCall::Count {
            collection: collection.to_string(),
            filters: filters.to_vec(),
        })?;
        self.inner.count(collection, filters).await
    }

    async fn export_collection(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        self.record(AdapterCall::Export {
            collection: collection.to_string(),
        })?;
        self.inner.export_collection(collection).await
    }

    async fn import_collection(
        &self,
        collection: &str,
        records: Vec<Document>,
        merge: bool,
    ) -> Result<(), AdapterError> {
        self.record(AdapterCall::Import {
            collection: collection.to_string(),
            count: records.len(),
            merge,
        })?;
        self.inner.import_collection(collection, records, merge).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
