// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events system for loose coupling between collections, services and views
//!
//! This module provides:
//! - `EventBus` - Synchronous fan-out of topics to prioritized listeners
//! - `EventHistory` - Bounded log of recent emissions
//! - `EventPattern` - Exact and `*` wildcard topic matching
//! - `Debounced` / `Throttled` - Rate-limited emitters bound to one topic

mod bus;
mod log;
mod subscription;
mod timing;

pub use bus::{BusConfig, EventBus, EventError, Unsubscribe};
pub use log::{EventHistory, EventRecord, DEFAULT_HISTORY_LIMIT};
pub use subscription::{
    wildcard_match, AsyncHandler, EventPattern, HandlerError, Listener, ListenerId, MatchKind,
    SyncHandler,
};
pub use timing::{Debounced, Throttled};
