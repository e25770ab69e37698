// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limited emitters
//!
//! Each emitter owns its timer state; clones share it.

use super::bus::{EventBus, EventError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

fn current_runtime(topic: &str) -> Result<Handle, EventError> {
    Handle::try_current().map_err(|_| EventError::NoRuntime(topic.to_string()))
}

/// Emits only the last payload received within each quiet window
#[derive(Clone)]
pub struct Debounced {
    bus: EventBus,
    topic: String,
    delay: Duration,
    runtime: Handle,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debounced {
    pub(crate) fn new(bus: EventBus, topic: &str, delay: Duration) -> Result<Self, EventError> {
        Ok(Self {
            runtime: current_runtime(topic)?,
            bus,
            topic: topic.to_string(),
            delay,
            pending: Arc::new(Mutex::new(None)),
        })
    }

    /// Restart the window with `payload` as the value to emit
    pub fn emit(&self, payload: Value) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = pending.take() {
            task.abort();
        }

        let bus = self.bus.clone();
        let topic = self.topic.clone();
        let delay = self.delay;
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            bus.emit(&topic, payload);
        }));
    }

    /// Drop the scheduled emission, if any
    pub fn cancel(&self) -> bool {
        let task = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        match task {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[derive(Default)]
struct ThrottleState {
    last_emit: Option<Instant>,
    trailing: Option<JoinHandle<()>>,
    latest: Option<Value>,
}

/// Emits immediately at most once per window, coalescing the rest into one trailing
/// emission carrying the most recent payload
#[derive(Clone)]
pub struct Throttled {
    bus: EventBus,
    topic: String,
    delay: Duration,
    runtime: Handle,
    state: Arc<Mutex<ThrottleState>>,
}

impl Throttled {
    pub(crate) fn new(bus: EventBus, topic: &str, delay: Duration) -> Result<Self, EventError> {
        Ok(Self {
            runtime: current_runtime(topic)?,
            bus,
            topic: topic.to_string(),
            delay,
            state: Arc::new(Mutex::new(ThrottleState::default())),
        })
    }

    pub fn emit(&self, payload: Value) {
        let now = Instant::now();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let window_open = state
            .last_emit
            .map_or(true, |last| now.duration_since(last) >= self.delay);

        if window_open {
            // A newer payload supersedes any trailing emission still in flight
            if let Some(task) = state.trailing.take() {
                task.abort();
            }
            state.latest = None;
            state.last_emit = Some(now);
            drop(state);
            self.bus.emit(&self.topic, payload);
            return;
        }

        state.latest = Some(payload);
        if state.trailing.is_some() {
            return;
        }

        let deadline = state.last_emit.unwrap_or(now) + self.delay;
        let shared = Arc::clone(&self.state);
        let bus = self.bus.clone();
        let topic = self.topic.clone();
        state.trailing = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let payload = {
                let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
                state.trailing = None;
                state.last_emit = Some(Instant::now());
                state.latest.take()
            };
            if let Some(payload) = payload {
                bus.emit(&topic, payload);
            }
        }));
    }

    pub fn has_trailing(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .trailing
            .is_some()
    }
}

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
