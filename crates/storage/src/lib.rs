// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tally-storage: typed, versioned collections over a storage adapter
//!
//! A [`Collection`] owns record metadata (id, timestamps, version, soft
//! deletion), validates against a [`SchemaRegistry`], and announces every
//! mutation on a shared [`tally_core::EventBus`].

mod collection;
mod error;
mod events;
mod query;
mod record;
pub mod schema;

pub use collection::{Collection, ImportOptions};
pub use error::CollectionError;
pub use events::{change_topic, lifecycle_topic, ChangeEvent, ChangeType, Operation, Phase};
pub use query::{Direction, Query};
pub use record::{format_timestamp, Record};
pub use schema::{
    FieldRule, FieldType, SchemaDef, SchemaRegistry, ValidationError, Violation, ViolationKind,
};
