// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filter, sort and paginate records of one collection

use crate::collection::Collection;
use crate::error::CollectionError;
use crate::record::{Record, DELETED_AT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use tally_adapters::filter::{lookup, matches_all};
use tally_adapters::{compare_values, Document, Filter, StorageAdapter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Query builder; evaluated in memory over the collection's records.
///
/// Built through [`Collection::query`], which seeds a `deletedAt IS NULL`
/// filter, or [`Collection::query_including_deleted`].
pub struct Query<'a, T, A> {
    collection: &'a Collection<T, A>,
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
    offset: usize,
}

/// Nulls sort first; values of different kinds tie
fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let a = lookup(a, field).unwrap_or(&Value::Null);
    let b = lookup(b, field).unwrap_or(&Value::Null);
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}

impl<'a, T, A> Query<'a, T, A>
where
    T: Serialize + DeserializeOwned,
    A: StorageAdapter,
{
    pub(crate) fn new(collection: &'a Collection<T, A>, live_only: bool) -> Self {
        let filters = if live_only {
            vec![Filter::is_null(DELETED_AT)]
        } else {
            Vec::new()
        };
        Self {
            collection,
            filters,
            order: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    /// Add a sort key; earlier keys take precedence
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    async fn matching(&self) -> Result<Vec<Document>, CollectionError> {
        let mut docs: Vec<Document> = self
            .collection
            .adapter()
            .get_all(self.collection.name())
            .await?
            .into_iter()
            .filter(|doc| matches_all(&self.filters, doc))
            .collect();

        if !self.order.is_empty() {
            docs.sort_by(|a, b| {
                self.order
                    .iter()
                    .map(|(field, direction)| match direction {
                        Direction::Asc => compare_field(a, b, field),
                        Direction::Desc => compare_field(b, a, field),
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        Ok(docs)
    }

    /// Matching records after sort, offset and limit
    pub async fn fetch(&self) -> Result<Vec<Record<T>>, CollectionError> {
        self.matching()
            .await?
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|doc| self.collection.decode(doc))
            .collect()
    }

    /// Number of matching records; offset and limit are ignored
    pub async fn count(&self) -> Result<usize, CollectionError> {
        Ok(self.matching().await?.len())
    }

    /// First record `fetch` would return
    pub async fn first(&self) -> Result<Option<Record<T>>, CollectionError> {
        self.matching()
            .await?
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .next()
            .map(|doc| self.collection.decode(doc))
            .transpose()
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
