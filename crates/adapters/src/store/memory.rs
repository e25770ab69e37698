// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-local storage adapter

use super::table::Table;
use super::{AdapterError, BulkOptions, Document, StorageAdapter};
use crate::filter::Filter;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Adapter keeping every collection in memory.
///
/// Clones share the same tables. Reads return records ordered by id.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, collection: &str, f: impl FnOnce(&Table) -> R) -> R {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        match tables.get(collection) {
            Some(table) => f(table),
            None => f(&Table::new(collection)),
        }
    }

    fn write<R>(&self, collection: &str, f: impl FnOnce(&mut Table) -> R) -> R {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let table = tables
            .entry(collection.to_string())
            .or_insert_with(|| Table::new(collection));
        f(table)
    }

    /// Names of collections that have been written to
    pub fn collections(&self) -> Vec<String> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AdapterError> {
        Ok(self.read(collection, |t| t.get(id)))
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        Ok(self.read(collection, Table::all))
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, AdapterError> {
        self.write(collection, |t| t.insert(record))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, AdapterError> {
        self.write(collection, |t| t.update(id, changes))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        self.write(collection, |t| t.remove(id))
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        records: Vec<Document>,
        _options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        self.write(collection, |t| -> Result<Vec<Document>, AdapterError> {
            t.check_insertable(&records)?;
            records.into_iter().map(|r| t.insert(r)).collect()
        })
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: Vec<(String, Document)>,
        _options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        self.write(collection, |t| -> Result<Vec<Document>, AdapterError> {
            t.check_updatable(&updates)?;
            updates
                .into_iter()
                .map(|(id, changes)| t.update(&id, changes))
                .collect()
        })
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<usize, AdapterError> {
        Ok(self.read(collection, |t| t.count(filters)))
    }

    async fn export_collection(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        Ok(self.read(collection, Table::all))
    }

    async fn import_collection(
        &self,
        collection: &str,
        records: Vec<Document>,
        merge: bool,
    ) -> Result<(), AdapterError> {
        self.write(collection, |t| t.import(records, merge))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
