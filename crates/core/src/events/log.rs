// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded in-memory log of emitted events

use super::subscription::EventPattern;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// Default number of history entries retained by a bus
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// A logged emission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Topic actually emitted
    pub event: String,
    pub payload: Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Ring buffer of the most recent emissions, oldest first
#[derive(Debug, Clone)]
pub struct EventHistory {
    records: VecDeque<EventRecord>,
    limit: usize,
}

impl EventHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Append a record, evicting the oldest entries beyond the limit
    pub fn push(&mut self, record: EventRecord) {
        self.records.push_back(record);
        while self.records.len() > self.limit {
            self.records.pop_front();
        }
    }

    /// Snapshot of the log, optionally restricted to a topic or wildcard pattern
    pub fn records(&self, filter: Option<&str>) -> Vec<EventRecord> {
        match filter {
            None => self.records.iter().cloned().collect(),
            Some(filter) => {
                let pattern = EventPattern::new(filter);
                self.records
                    .iter()
                    .filter(|r| pattern.matches(&r.event))
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
