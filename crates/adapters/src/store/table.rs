// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory record table shared by the concrete adapters

use super::{document_id, AdapterError, Document};
use crate::filter::{matches_all, Filter};
use std::collections::BTreeMap;

/// Records of one collection ordered by id
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    name: String,
    rows: BTreeMap<String, Document>,
}

impl Table {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn from_records(name: &str, records: Vec<Document>) -> Result<Self, AdapterError> {
        let mut table = Self::new(name);
        table.import(records, false)?;
        Ok(table)
    }

    pub(crate) fn get(&self, id: &str) -> Option<Document> {
        self.rows.get(id).cloned()
    }

    pub(crate) fn all(&self) -> Vec<Document> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn count(&self, filters: &[Filter]) -> usize {
        self.rows
            .values()
            .filter(|doc| matches_all(filters, doc))
            .count()
    }

    fn id_of(&self, doc: &Document) -> Result<String, AdapterError> {
        document_id(doc)
            .map(str::to_string)
            .ok_or_else(|| AdapterError::MissingId {
                collection: self.name.clone(),
            })
    }

    fn not_found(&self, id: &str) -> AdapterError {
        AdapterError::NotFound {
            collection: self.name.clone(),
            id: id.to_string(),
        }
    }

    pub(crate) fn insert(&mut self, record: Document) -> Result<Document, AdapterError> {
        let id = self.id_of(&record)?;
        if self.rows.contains_key(&id) {
            return Err(AdapterError::Duplicate {
                collection: self.name.clone(),
                id,
            });
        }
        self.rows.insert(id, record.clone());
        Ok(record)
    }

    /// Reject the whole batch before writing anything
    pub(crate) fn check_insertable(&self, records: &[Document]) -> Result<(), AdapterError> {
        let mut seen = std::collections::HashSet::new();
        for record in records {
            let id = self.id_of(record)?;
            if self.rows.contains_key(&id) || !seen.insert(id.clone()) {
                return Err(AdapterError::Duplicate {
                    collection: self.name.clone(),
                    id,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn update(&mut self, id: &str, changes: Document) -> Result<Document, AdapterError> {
        let Some(row) = self.rows.get_mut(id) else {
            return Err(self.not_found(id));
        };
        for (key, value) in changes {
            // The key is the identity; never let a merge rewrite it
            if key != "id" {
                row.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    pub(crate) fn check_updatable(&self, updates: &[(String, Document)]) -> Result<(), AdapterError> {
        match updates.iter().find(|(id, _)| !self.rows.contains_key(id)) {
            Some((id, _)) => Err(self.not_found(id)),
            None => Ok(()),
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Result<(), AdapterError> {
        match self.rows.remove(id) {
            Some(_) => Ok(()),
            None => Err(self.not_found(id)),
        }
    }

    pub(crate) fn import(&mut self, records: Vec<Document>, merge: bool) -> Result<(), AdapterError> {
        let mut incoming = BTreeMap::new();
        for record in records {
            incoming.insert(self.id_of(&record)?, record);
        }
        if !merge {
            self.rows.clear();
        }
        self.rows.extend(incoming);
        Ok(())
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
