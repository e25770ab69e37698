// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record and listener identifiers
//!
//! Collections draw ids for records inserted without one from an [`IdGen`].
//! Listener ids come from [`next_listener_seq`], which is process-wide.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Next value of the process-wide listener counter, strictly increasing
pub fn next_listener_seq() -> u64 {
    LISTENER_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// Source of record ids
pub trait IdGen: Clone + Send + Sync {
    fn next(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// `<prefix>-1`, `<prefix>-2`, ...; clones draw from the same sequence
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: Arc<str>,
    next: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    /// Continue numbering after ids that already exist
    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: Arc::from(prefix.into()),
            next: Arc::new(AtomicU64::new(first)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("rec")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
