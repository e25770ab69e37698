// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed, versioned CRUD over one adapter collection
//!
//! Every mutation validates the fully assembled record before touching the
//! adapter, then announces itself on the bus as `<name>.before.<op>`,
//! `<name>.after.<op>` and `<name>.change`.

use crate::error::CollectionError;
use crate::events::{change_topic, lifecycle_topic, ChangeEvent, Operation, Phase};
use crate::query::Query;
use crate::record::{
    format_timestamp, Record, CREATED_AT, DELETED_AT, ID, IMMUTABLE_KEYS, UPDATED_AT, VERSION,
};
use crate::schema::SchemaRegistry;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tally_adapters::{document_id, BulkOptions, Document, Filter, StorageAdapter};
use tally_core::events::HandlerError;
use tally_core::{Clock, EventBus, IdGen, SystemClock, Unsubscribe, UuidIdGen};

/// Options for [`Collection::import_json`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Keep records absent from the import instead of replacing the collection
    #[serde(default)]
    pub merge: bool,
}

/// A named collection of `Record<T>` stored through adapter `A`
pub struct Collection<T, A> {
    name: String,
    adapter: A,
    bus: EventBus,
    schemas: SchemaRegistry,
    now: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    next_id: Arc<dyn Fn() -> String + Send + Sync>,
    _record: PhantomData<fn() -> T>,
}

impl<T, A: Clone> Clone for Collection<T, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            adapter: self.adapter.clone(),
            bus: self.bus.clone(),
            schemas: self.schemas.clone(),
            now: Arc::clone(&self.now),
            next_id: Arc::clone(&self.next_id),
            _record: PhantomData,
        }
    }
}

impl<T, A> fmt::Debug for Collection<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn is_live(doc: &Document) -> bool {
    doc.get(DELETED_AT).map_or(true, Value::is_null)
}

fn version_of(doc: &Document) -> u64 {
    doc.get(VERSION).and_then(Value::as_u64).unwrap_or(0)
}

fn to_document<T: Serialize>(data: &T) -> Result<Document, CollectionError> {
    match serde_json::to_value(data)? {
        Value::Object(fields) => Ok(fields),
        other => Err(CollectionError::Serialization(
            <serde_json::Error as serde::ser::Error>::custom(format!(
                "record must serialize to an object, got {other}"
            )),
        )),
    }
}

/// Drop keys the collection owns
fn sanitize(changes: Document) -> Document {
    changes
        .into_iter()
        .filter(|(key, _)| !IMMUTABLE_KEYS.contains(&key.as_str()))
        .collect()
}

fn merged(base: &Document, changes: &Document) -> Document {
    let mut doc = base.clone();
    for (key, value) in changes {
        doc.insert(key.clone(), value.clone());
    }
    doc
}

/// A caller-supplied id as stored: strings as-is, numbers in decimal
fn caller_id(id: Option<&Value>) -> Option<String> {
    match id {
        Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

impl<T, A> Collection<T, A>
where
    T: Serialize + DeserializeOwned,
    A: StorageAdapter,
{
    pub fn new(name: impl Into<String>, adapter: A, bus: EventBus, schemas: SchemaRegistry) -> Self {
        let clock = SystemClock;
        let ids = UuidIdGen;
        Self {
            name: name.into(),
            adapter,
            bus,
            schemas,
            now: Arc::new(move || clock.now()),
            next_id: Arc::new(move || ids.next()),
            _record: PhantomData,
        }
    }

    /// Use `clock` for `createdAt`/`updatedAt`/`deletedAt`
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.now = Arc::new(move || clock.now());
        self
    }

    /// Use `ids` for records inserted without an id
    pub fn with_id_gen<G: IdGen + 'static>(mut self, ids: G) -> Self {
        self.next_id = Arc::new(move || ids.next());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn adapter(&self) -> &A {
        &self.adapter
    }

    pub(crate) fn decode(&self, doc: Document) -> Result<Record<T>, CollectionError> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    fn timestamp(&self) -> Value {
        Value::String(format_timestamp((self.now)()))
    }

    fn emit(&self, phase: Phase, op: Operation, payload: Value) {
        self.bus
            .emit(&lifecycle_topic(&self.name, phase, op), payload);
    }

    fn emit_change(&self, event: ChangeEvent) {
        match serde_json::to_value(&event) {
            Ok(payload) => self.bus.emit(&change_topic(&self.name), payload),
            Err(e) => tracing::warn!(collection = %self.name, error = %e, "change event not encodable"),
        }
    }

    /// Caller id, or a generated one when absent or empty
    fn resolve_id(&self, id: Option<Value>) -> String {
        caller_id(id.as_ref()).unwrap_or_else(|| (self.next_id)())
    }

    /// Fresh record: caller fields plus metadata at version 1
    fn assemble(&self, mut fields: Document, now: &Value) -> Document {
        let id = self.resolve_id(fields.remove(ID));
        let mut doc = sanitize(fields);
        doc.insert(ID.to_string(), Value::String(id));
        doc.insert(CREATED_AT.to_string(), now.clone());
        doc.insert(UPDATED_AT.to_string(), now.clone());
        doc.insert(DELETED_AT.to_string(), Value::Null);
        doc.insert(VERSION.to_string(), json!(1));
        doc
    }

    /// Imported record: keep what is there, default the rest like `assemble`
    fn fill_missing(&self, mut doc: Document, now: &Value) -> Document {
        let id = self.resolve_id(doc.remove(ID));
        doc.insert(ID.to_string(), Value::String(id));
        doc.entry(CREATED_AT).or_insert_with(|| now.clone());
        doc.entry(UPDATED_AT).or_insert_with(|| now.clone());
        doc.entry(DELETED_AT).or_insert(Value::Null);
        doc.entry(VERSION).or_insert_with(|| json!(1));
        doc
    }

    /// The partial document an update writes: caller changes plus bookkeeping
    fn update_write(&self, current: &Document, changes: Document, now: &Value) -> Document {
        let mut write = sanitize(changes);
        write.insert(UPDATED_AT.to_string(), now.clone());
        write.insert(VERSION.to_string(), json!(version_of(current) + 1));
        write
    }

    fn lifecycle_write(&self, current: &Document, deleted_at: Value, now: &Value) -> Document {
        let mut write = Document::new();
        write.insert(DELETED_AT.to_string(), deleted_at);
        write.insert(UPDATED_AT.to_string(), now.clone());
        write.insert(VERSION.to_string(), json!(version_of(current) + 1));
        write
    }

    async fn fetch_existing(&self, id: &str) -> Result<Document, CollectionError> {
        self.adapter
            .get(&self.name, id)
            .await?
            .ok_or_else(|| CollectionError::not_found(&self.name, id))
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Live record by id; soft-deleted records read as `None`
    pub async fn get(&self, id: &str) -> Result<Option<Record<T>>, CollectionError> {
        match self.adapter.get(&self.name, id).await? {
            Some(doc) if is_live(&doc) => Ok(Some(self.decode(doc)?)),
            _ => Ok(None),
        }
    }

    pub async fn get_including_deleted(&self, id: &str) -> Result<Option<Record<T>>, CollectionError> {
        self.adapter
            .get(&self.name, id)
            .await?
            .map(|doc| self.decode(doc))
            .transpose()
    }

    pub async fn get_all(&self) -> Result<Vec<Record<T>>, CollectionError> {
        self.adapter
            .get_all(&self.name)
            .await?
            .into_iter()
            .filter(is_live)
            .map(|doc| self.decode(doc))
            .collect()
    }

    pub async fn get_all_including_deleted(&self) -> Result<Vec<Record<T>>, CollectionError> {
        self.adapter
            .get_all(&self.name)
            .await?
            .into_iter()
            .map(|doc| self.decode(doc))
            .collect()
    }

    /// Query over live records
    pub fn query(&self) -> Query<'_, T, A> {
        Query::new(self, true)
    }

    pub fn query_including_deleted(&self) -> Query<'_, T, A> {
        Query::new(self, false)
    }

    /// Live records matching every filter
    pub async fn count(&self, filters: &[Filter]) -> Result<usize, CollectionError> {
        let mut all = Vec::with_capacity(filters.len() + 1);
        all.push(Filter::is_null(DELETED_AT));
        all.extend_from_slice(filters);
        Ok(self.adapter.count(&self.name, &all).await?)
    }

    // ---------------------------------------------------------------------
    // Single-record mutations
    // ---------------------------------------------------------------------

    /// Store a new record at version 1. A caller-supplied `id` is kept.
    pub async fn insert(&self, data: T) -> Result<Record<T>, CollectionError> {
        let fields = to_document(&data)?;
        self.insert_fields(fields).await
    }

    async fn insert_fields(&self, fields: Document) -> Result<Record<T>, CollectionError> {
        let now = self.timestamp();
        let record = self.assemble(fields, &now);
        self.schemas.validate(&self.name, &record)?;

        self.emit(
            Phase::Before,
            Operation::Insert,
            json!({ "collection": self.name, "record": record }),
        );
        let stored = self.adapter.insert(&self.name, record).await?;
        tracing::debug!(collection = %self.name, id = document_id(&stored), "inserted");

        self.emit(
            Phase::After,
            Operation::Insert,
            json!({ "collection": self.name, "record": stored }),
        );
        self.emit_change(ChangeEvent::with_records(
            Operation::Insert.change_type(),
            &self.name,
            vec![stored.clone()],
        ));
        self.decode(stored)
    }

    /// Merge `changes` into the record at `id` (live or deleted) and bump its version
    pub async fn update(&self, id: &str, changes: Document) -> Result<Record<T>, CollectionError> {
        self.apply_update(id, changes, None).await
    }

    /// [`update`](Self::update), but only if the stored version is still `expected`
    pub async fn update_if_version(
        &self,
        id: &str,
        expected: u64,
        changes: Document,
    ) -> Result<Record<T>, CollectionError> {
        self.apply_update(id, changes, Some(expected)).await
    }

    async fn apply_update(
        &self,
        id: &str,
        changes: Document,
        expected: Option<u64>,
    ) -> Result<Record<T>, CollectionError> {
        let previous = self.fetch_existing(id).await?;
        let actual = version_of(&previous);
        if let Some(expected) = expected.filter(|v| *v != actual) {
            return Err(CollectionError::VersionConflict {
                collection: self.name.clone(),
                id: id.to_string(),
                expected,
                actual,
            });
        }

        let now = self.timestamp();
        let requested = changes.clone();
        let write = self.update_write(&previous, changes, &now);
        self.schemas
            .validate(&self.name, &merged(&previous, &write))?;

        self.emit(
            Phase::Before,
            Operation::Update,
            json!({ "collection": self.name, "id": id, "changes": requested, "previous": previous }),
        );
        let stored = self.adapter.update(&self.name, id, write).await?;
        tracing::debug!(collection = %self.name, id, version = actual + 1, "updated");

        self.emit(
            Phase::After,
            Operation::Update,
            json!({ "collection": self.name, "record": stored, "previous": previous }),
        );
        self.emit_change(ChangeEvent::with_records(
            Operation::Update.change_type(),
            &self.name,
            vec![stored.clone()],
        ));
        self.decode(stored)
    }

    /// Update when `data` names an existing record, insert otherwise
    pub async fn upsert(&self, data: T) -> Result<Record<T>, CollectionError> {
        let fields = to_document(&data)?;
        if let Some(id) = caller_id(fields.get(ID)) {
            if self.adapter.get(&self.name, &id).await?.is_some() {
                return self.apply_update(&id, fields, None).await;
            }
        }
        self.insert_fields(fields).await
    }

    /// Soft delete: stamp `deletedAt` and bump the version
    pub async fn remove(&self, id: &str) -> Result<(), CollectionError> {
        let previous = self.fetch_existing(id).await?;
        let now = self.timestamp();
        let write = self.lifecycle_write(&previous, now.clone(), &now);

        self.emit(
            Phase::Before,
            Operation::Remove,
            json!({ "collection": self.name, "id": id, "record": previous }),
        );
        let stored = self.adapter.update(&self.name, id, write).await?;
        tracing::debug!(collection = %self.name, id, "soft deleted");

        self.emit(
            Phase::After,
            Operation::Remove,
            json!({ "collection": self.name, "id": id, "record": stored }),
        );
        self.emit_change(ChangeEvent::with_ids(
            Operation::Remove.change_type(),
            &self.name,
            vec![id.to_string()],
        ));
        Ok(())
    }

    /// Delete the record from the adapter outright
    pub async fn hard_remove(&self, id: &str) -> Result<(), CollectionError> {
        let previous = self.fetch_existing(id).await?;

        self.emit(
            Phase::Before,
            Operation::HardRemove,
            json!({ "collection": self.name, "id": id, "record": previous }),
        );
        self.adapter.remove(&self.name, id).await?;
        tracing::info!(collection = %self.name, id, "purged");

        self.emit(
            Phase::After,
            Operation::HardRemove,
            json!({ "collection": self.name, "id": id }),
        );
        self.emit_change(ChangeEvent::with_ids(
            Operation::HardRemove.change_type(),
            &self.name,
            vec![id.to_string()],
        ));
        Ok(())
    }

    /// Undo a soft delete
    pub async fn restore(&self, id: &str) -> Result<Record<T>, CollectionError> {
        let previous = self.fetch_existing(id).await?;
        if is_live(&previous) {
            return Err(CollectionError::NotDeleted {
                collection: self.name.clone(),
                id: id.to_string(),
            });
        }
        let now = self.timestamp();
        let write = self.lifecycle_write(&previous, Value::Null, &now);

        self.emit(
            Phase::Before,
            Operation::Restore,
            json!({ "collection": self.name, "id": id, "record": previous }),
        );
        let stored = self.adapter.update(&self.name, id, write).await?;
        tracing::debug!(collection = %self.name, id, "restored");

        self.emit(
            Phase::After,
            Operation::Restore,
            json!({ "collection": self.name, "record": stored }),
        );
        self.emit_change(ChangeEvent::with_records(
            Operation::Restore.change_type(),
            &self.name,
            vec![stored.clone()],
        ));
        self.decode(stored)
    }

    // ---------------------------------------------------------------------
    // Batch mutations: one adapter call and one event triple per batch
    // ---------------------------------------------------------------------

    pub async fn bulk_insert(
        &self,
        items: Vec<T>,
        options: &BulkOptions,
    ) -> Result<Vec<Record<T>>, CollectionError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let now = self.timestamp();
        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            let record = self.assemble(to_document(item)?, &now);
            self.schemas.validate(&self.name, &record)?;
            records.push(record);
        }

        self.emit(
            Phase::Before,
            Operation::BulkInsert,
            json!({ "collection": self.name, "records": records }),
        );
        let stored = self
            .adapter
            .bulk_insert(&self.name, records, options)
            .await?;
        tracing::debug!(collection = %self.name, count = stored.len(), "bulk inserted");

        self.emit(
            Phase::After,
            Operation::BulkInsert,
            json!({ "collection": self.name, "records": stored }),
        );
        self.emit_change(ChangeEvent::with_records(
            Operation::BulkInsert.change_type(),
            &self.name,
            stored.clone(),
        ));
        stored.into_iter().map(|doc| self.decode(doc)).collect()
    }

    /// Apply every `(id, changes)` pair, or none if any id is missing or any
    /// result fails validation. Repeated ids apply in order.
    pub async fn bulk_update(
        &self,
        updates: Vec<(String, Document)>,
        options: &BulkOptions,
    ) -> Result<Vec<Record<T>>, CollectionError> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        let now = self.timestamp();
        let mut pending: HashMap<String, Document> = HashMap::new();
        let mut writes = Vec::with_capacity(updates.len());
        let mut summary = Vec::with_capacity(updates.len());
        for (id, changes) in updates {
            let current = match pending.remove(&id) {
                Some(doc) => doc,
                None => self.fetch_existing(&id).await?,
            };
            summary.push(json!({ "id": id, "changes": changes }));
            let write = self.update_write(&current, changes, &now);
            let next = merged(&current, &write);
            self.schemas.validate(&self.name, &next)?;
            pending.insert(id.clone(), next);
            writes.push((id, write));
        }

        self.emit(
            Phase::Before,
            Operation::BulkUpdate,
            json!({ "collection": self.name, "updates": summary }),
        );
        let stored = self
            .adapter
            .bulk_update(&self.name, writes, options)
            .await?;
        tracing::debug!(collection = %self.name, count = stored.len(), "bulk updated");

        self.emit(
            Phase::After,
            Operation::BulkUpdate,
            json!({ "collection": self.name, "records": stored }),
        );
        self.emit_change(ChangeEvent::with_records(
            Operation::BulkUpdate.change_type(),
            &self.name,
            stored.clone(),
        ));
        stored.into_iter().map(|doc| self.decode(doc)).collect()
    }

    /// Soft delete each existing id, skipping unknown ones. Returns the ids removed.
    pub async fn bulk_remove(
        &self,
        ids: &[String],
        options: &BulkOptions,
    ) -> Result<Vec<String>, CollectionError> {
        let now = self.timestamp();
        let mut seen = HashSet::new();
        let mut writes = Vec::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.adapter.get(&self.name, id).await? {
                Some(current) => {
                    writes.push((id.clone(), self.lifecycle_write(&current, now.clone(), &now)))
                }
                None => tracing::debug!(collection = %self.name, id, "skipping unknown id"),
            }
        }
        if writes.is_empty() {
            return Ok(Vec::new());
        }
        let removed: Vec<String> = writes.iter().map(|(id, _)| id.clone()).collect();

        self.emit(
            Phase::Before,
            Operation::BulkRemove,
            json!({ "collection": self.name, "ids": removed }),
        );
        self.adapter
            .bulk_update(&self.name, writes, options)
            .await?;
        tracing::debug!(collection = %self.name, count = removed.len(), "bulk soft deleted");

        self.emit(
            Phase::After,
            Operation::BulkRemove,
            json!({ "collection": self.name, "ids": removed }),
        );
        self.emit_change(ChangeEvent::with_ids(
            Operation::BulkRemove.change_type(),
            &self.name,
            removed.clone(),
        ));
        Ok(removed)
    }

    // ---------------------------------------------------------------------
    // Subscriptions and dump/load
    // ---------------------------------------------------------------------

    /// Subscribe to `<name>.change`
    pub fn on_change<F>(&self, handler: F) -> Unsubscribe
    where
        F: Fn(&ChangeEvent) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.bus.on(&change_topic(&self.name), move |payload| {
            let event: ChangeEvent = serde_json::from_value(payload.clone())?;
            handler(&event)
        })
    }

    /// Every record, soft-deleted ones included, as a JSON array
    pub async fn export_json(&self) -> Result<Value, CollectionError> {
        let records = self.adapter.export_collection(&self.name).await?;
        Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
    }

    /// Load a JSON array of records, defaulting missing metadata like `insert`.
    ///
    /// Without `merge` the collection is replaced. Returns the number of
    /// records imported.
    pub async fn import_json(
        &self,
        data: Value,
        options: ImportOptions,
    ) -> Result<usize, CollectionError> {
        let Value::Array(items) = data else {
            return Err(CollectionError::InvalidImport(
                "expected a JSON array of records".to_string(),
            ));
        };

        let now = self.timestamp();
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(fields) = item else {
                return Err(CollectionError::InvalidImport(format!(
                    "item {index} is not an object"
                )));
            };
            let record = self.fill_missing(fields, &now);
            if let Err(e) = self.decode(record.clone()) {
                return Err(CollectionError::InvalidImport(format!("item {index}: {e}")));
            }
            self.schemas.validate(&self.name, &record)?;
            records.push(record);
        }

        let count = records.len();
        self.adapter
            .import_collection(&self.name, records.clone(), options.merge)
            .await?;
        tracing::info!(collection = %self.name, count, merge = options.merge, "imported");

        self.emit_change(ChangeEvent::with_records(
            Operation::BulkInsert.change_type(),
            &self.name,
            records,
        ));
        Ok(count)
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
