// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based storage

use super::table::Table;
use super::{AdapterError, BulkOptions, Document, StorageAdapter};
use crate::filter::Filter;
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One pretty-printed JSON array per collection: `<base>/<collection>.json`.
///
/// Files are read lazily and cached; every mutation rewrites the collection file through
/// a temp file and rename, so a crash leaves either the old or the new contents.
#[derive(Clone)]
pub struct JsonFileAdapter {
    base_path: PathBuf,
    tables: Arc<Mutex<HashMap<String, Table>>>,
}

impl JsonFileAdapter {
    /// Open a store at the given directory, creating it if needed
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, AdapterError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            tables: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Open a throwaway store under the system temp directory
    pub fn open_temp() -> Result<Self, AdapterError> {
        let dir = std::env::temp_dir().join(format!("tally-{}", uuid::Uuid::new_v4()));
        Self::open(dir)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Collection names present on disk
    pub fn list_collections(&self) -> Result<Vec<String>, AdapterError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, collection: &str) -> Result<PathBuf, AdapterError> {
        let valid = !collection.is_empty()
            && !collection.starts_with('.')
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(AdapterError::InvalidCollection(collection.to_string()));
        }
        Ok(self.base_path.join(format!("{collection}.json")))
    }

    async fn read_table(&self, collection: &str) -> Result<Table, AdapterError> {
        let path = self.path_for(collection)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Table::new(collection))
            }
            Err(e) => return Err(e.into()),
        };
        let records: Vec<Document> = serde_json::from_str(&json)?;
        let table = Table::from_records(collection, records)?;
        tracing::debug!(collection, records = table.len(), path = %path.display(), "loaded");
        Ok(table)
    }

    async fn write_table(&self, collection: &str, table: &Table) -> Result<(), AdapterError> {
        let path = self.path_for(collection)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&table.all())?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn load<'a>(
        &self,
        tables: &'a mut HashMap<String, Table>,
        collection: &str,
    ) -> Result<&'a mut Table, AdapterError> {
        match tables.entry(collection.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let table = self.read_table(collection).await?;
                Ok(entry.insert(table))
            }
        }
    }

    async fn read<R>(
        &self,
        collection: &str,
        f: impl FnOnce(&Table) -> R + Send,
    ) -> Result<R, AdapterError> {
        let mut tables = self.tables.lock().await;
        let table = self.load(&mut tables, collection).await?;
        Ok(f(table))
    }

    /// Apply `op` to a copy of the table, persist it, then publish it to the cache
    async fn mutate<R: Send>(
        &self,
        collection: &str,
        op: impl FnOnce(&mut Table) -> Result<R, AdapterError> + Send,
    ) -> Result<R, AdapterError> {
        let mut tables = self.tables.lock().await;
        let mut table = self.load(&mut tables, collection).await?.clone();
        let result = op(&mut table)?;
        self.write_table(collection, &table).await?;
        tables.insert(collection.to_string(), table);
        Ok(result)
    }
}

#[async_trait]
impl StorageAdapter for JsonFileAdapter {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AdapterError> {
        self.read(collection, |t| t.get(id)).await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        self.read(collection, Table::all).await
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, AdapterError> {
        self.mutate(collection, |t| t.insert(record)).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, AdapterError> {
        self.mutate(collection, |t| t.update(id, changes)).await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        self.mutate(collection, |t| t.remove(id)).await
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        records: Vec<Document>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        let chunk_len = options.chunk_len(records.len());
        let stored = self
            .mutate(collection, |table| {
                table.check_insertable(&records)?;
                let mut stored = Vec::with_capacity(records.len());
                for (n, batch) in records.chunks(chunk_len).enumerate() {
                    for record in batch {
                        stored.push(table.insert(record.clone())?);
                    }
                    tracing::trace!(collection, chunk = n, len = batch.len(), "bulk insert chunk");
                }
                Ok(stored)
            })
            .await?;
        tracing::debug!(collection, count = stored.len(), chunk_len, "bulk insert persisted");
        Ok(stored)
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: Vec<(String, Document)>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        let chunk_len = options.chunk_len(updates.len());
        self.mutate(collection, |table| {
            table.check_updatable(&updates)?;
            let mut stored = Vec::with_capacity(updates.len());
            for (n, batch) in updates.chunks(chunk_len).enumerate() {
                for (id, changes) in batch {
                    stored.push(table.update(id, changes.clone())?);
                }
                tracing::trace!(collection, chunk = n, len = batch.len(), "bulk update chunk");
            }
            Ok(stored)
        })
        .await
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<usize, AdapterError> {
        self.read(collection, |t| t.count(filters)).await
    }

    async fn export_collection(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        self.read(collection, Table::all).await
    }

    async fn import_collection(
        &self,
        collection: &str,
        records: Vec<Document>,
        merge: bool,
    ) -> Result<(), AdapterError> {
        self.mutate(collection, |t| t.import(records, merge)).await
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
