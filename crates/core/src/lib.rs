// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tally-core: shared primitives for the tally record store
//!
//! This crate provides:
//! - The event bus every collection publishes its lifecycle events on
//! - Clock and ID generator abstractions so timestamps and ids are testable

pub mod clock;
pub mod events;
pub mod id;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use events::{BusConfig, EventBus, EventError, EventPattern, EventRecord, Unsubscribe};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
