// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::schema::ValidationError;
use tally_adapters::AdapterError;
use thiserror::Error;

/// Errors from collection operations
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("not deleted: {collection}/{id}")]
    NotDeleted { collection: String, id: String },
    #[error("version conflict on {collection}/{id}: expected {expected}, found {actual}")]
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid import: {0}")]
    InvalidImport(String),
}

impl CollectionError {
    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
