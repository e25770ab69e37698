// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::filter::Filter;
use crate::store::{AdapterError, BulkOptions, Document, StorageAdapter};
use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;
use tracing::{Instrument, Span};

/// Wrapper that adds tracing to any StorageAdapter
#[derive(Clone)]
pub struct TracedAdapter<A> {
    inner: A,
}

impl<A> TracedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

/// Run one adapter call inside `span`, logging timing and outcome
async fn observe<T, F>(span: Span, write: bool, fut: F) -> Result<T, AdapterError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    async move {
        let start = Instant::now();
        let result = fut.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) if write => tracing::info!(elapsed_ms, "ok"),
            Ok(_) => tracing::debug!(elapsed_ms, "ok"),
            // Missing rows are routine for callers that probe
            Err(e @ AdapterError::NotFound { .. }) => {
                tracing::debug!(elapsed_ms, error = %e, "not found")
            }
            Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
        }
        result
    }
    .instrument(span)
    .await
}

fn reject_empty(collection: &str) -> Result<(), AdapterError> {
    if collection.is_empty() {
        tracing::error!("collection name is empty");
        return Err(AdapterError::InvalidCollection(collection.to_string()));
    }
    Ok(())
}

#[async_trait]
impl<A: StorageAdapter> StorageAdapter for TracedAdapter<A> {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AdapterError> {
        let span = tracing::debug_span!("store.get", collection, id);
        observe(span, false, self.inner.get(collection, id)).await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        let span = tracing::debug_span!("store.get_all", collection);
        let result = observe(span, false, self.inner.get_all(collection)).await;
        tracing::trace!(collection, count = result.as_ref().map(Vec::len).ok(), "listed");
        result
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, AdapterError> {
        let span = tracing::info_span!(
            "store.insert",
            collection,
            id = crate::store::document_id(&record).unwrap_or("")
        );
        reject_empty(collection)?;
        observe(span, true, self.inner.insert(collection, record)).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Document,
    ) -> Result<Document, AdapterError> {
        let span = tracing::info_span!("store.update", collection, id, fields = changes.len());
        reject_empty(collection)?;
        observe(span, true, self.inner.update(collection, id, changes)).await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        let span = tracing::info_span!("store.remove", collection, id);
        observe(span, true, self.inner.remove(collection, id)).await
    }

    async fn bulk_insert(
        &self,
        collection: &str,
        records: Vec<Document>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        let span = tracing::info_span!(
            "store.bulk_insert",
            collection,
            count = records.len(),
            batch_size = options.batch_size
        );
        reject_empty(collection)?;
        observe(span, true, self.inner.bulk_insert(collection, records, options)).await
    }

    async fn bulk_update(
        &self,
        collection: &str,
        updates: Vec<(String, Document)>,
        options: &BulkOptions,
    ) -> Result<Vec<Document>, AdapterError> {
        let span = tracing::info_span!(
            "store.bulk_update",
            collection,
            count = updates.len(),
            batch_size = options.batch_size
        );
        observe(span, true, self.inner.bulk_update(collection, updates, options)).await
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<usize, AdapterError> {
        let span = tracing::debug_span!("store.count", collection, filters = filters.len());
        observe(span, false, self.inner.count(collection, filters)).await
    }

    async fn export_collection(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        let span = tracing::info_span!("store.export", collection);
        observe(span, false, self.inner.export_collection(collection)).await
    }

    async fn import_collection(
        &self,
        collection: &str,
        records: Vec<Document>,
        merge: bool,
    ) -> Result<(), AdapterError> {
        let span = tracing::info_span!("store.import", collection, count = records.len(), merge);
        reject_empty(collection)?;
        observe(span, true, self.inner.import_collection(collection, records, merge)).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
