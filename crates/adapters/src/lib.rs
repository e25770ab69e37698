// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Storage adapters for record collections

pub mod filter;
pub mod store;
pub mod traced;

pub use filter::{compare_values, Filter, FilterOp};
pub use store::{
    document_id, AdapterError, BulkOptions, Document, JsonFileAdapter, MemoryAdapter,
    StorageAdapter,
};
pub use traced::TracedAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use store::{AdapterCall, FakeAdapter};
