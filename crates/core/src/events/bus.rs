// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus for routing topics to prioritized listeners

use super::log::{EventHistory, EventRecord, DEFAULT_HISTORY_LIMIT};
use super::subscription::{
    EventPattern, Handler, HandlerError, Listener, ListenerId, MatchKind,
};
use super::timing::{Debounced, Throttled};
use crate::clock::{Clock, SystemClock};
use futures::future::{self, BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the bus
#[derive(Debug, Error)]
pub enum EventError {
    #[error("listener for {topic} failed: {source}")]
    Handler {
        topic: String,
        #[source]
        source: HandlerError,
    },
    #[error("no async runtime available for {0}")]
    NoRuntime(String),
}

/// Bus settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum number of emissions retained in history
    pub history_limit: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Listeners registered under one registry key
struct TopicEntry {
    key: String,
    pattern: EventPattern,
    listeners: Vec<Listener>,
}

/// Registry keys kept in insertion order so fan-out is deterministic
#[derive(Default)]
struct Registry {
    entries: Vec<TopicEntry>,
}

impl Registry {
    fn add(&mut self, topic: &str, listener: Listener) {
        match self.entries.iter_mut().find(|e| e.key == topic) {
            Some(entry) => entry.listeners.push(listener),
            None => self.entries.push(TopicEntry {
                key: topic.to_string(),
                pattern: EventPattern::new(topic),
                listeners: vec![listener],
            }),
        }
    }

    /// Remove one listener; drops the key once it has no listeners left
    fn remove(&mut self, topic: &str, id: &ListenerId) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.key == topic) else {
            return false;
        };
        let entry = &mut self.entries[pos];
        let before = entry.listeners.len();
        entry.listeners.retain(|l| &l.id != id);
        let removed = entry.listeners.len() != before;
        if entry.listeners.is_empty() {
            self.entries.remove(pos);
        }
        removed
    }

    fn remove_topic(&mut self, topic: &str) -> usize {
        match self.entries.iter().position(|e| e.key == topic) {
            Some(pos) => self.entries.remove(pos).listeners.len(),
            None => 0,
        }
    }

    /// Matching listeners sorted by priority (desc), then exact before wildcard.
    /// `sort_by` is stable, so registration order breaks remaining ties.
    fn resolve(&self, topic: &str) -> Vec<Dispatch> {
        let mut matched = Vec::new();
        for entry in &self.entries {
            let Some(kind) = entry.pattern.match_kind(topic) else {
                continue;
            };
            for listener in &entry.listeners {
                matched.push(Dispatch {
                    key: entry.key.clone(),
                    kind,
                    listener: listener.clone(),
                });
            }
        }
        matched.sort_by(|a, b| {
            b.listener
                .priority
                .cmp(&a.listener.priority)
                .then_with(|| a.kind.cmp(&b.kind))
        });
        matched
    }
}

struct Dispatch {
    key: String,
    kind: MatchKind,
    listener: Listener,
}

type Now = Arc<dyn Fn() -> i64 + Send + Sync>;

/// The event bus routes emitted topics to matching listeners.
///
/// Cloning is cheap and every clone shares listeners and history, so one bus can be
/// created at the application root and handed to each collection.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
    history: Arc<Mutex<EventHistory>>,
    now: Now,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Create a bus whose history timestamps come from `clock`
    pub fn with_clock<C: Clock + 'static>(config: BusConfig, clock: C) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            history: Arc::new(Mutex::new(EventHistory::new(config.history_limit))),
            now: Arc::new(move || clock.now_millis()),
        }
    }

    /// Register a listener at priority 0
    pub fn on<F>(&self, topic: &str, handler: F) -> Unsubscribe
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.on_with_priority(topic, 0, handler)
    }

    /// Register a listener; higher priorities fire first
    pub fn on_with_priority<F>(&self, topic: &str, priority: i32, handler: F) -> Unsubscribe
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(topic, Handler::Sync(Arc::new(handler)), priority, false)
    }

    /// Register a listener that is removed after its first dispatch
    pub fn once<F>(&self, topic: &str, handler: F) -> Unsubscribe
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.once_with_priority(topic, 0, handler)
    }

    pub fn once_with_priority<F>(&self, topic: &str, priority: i32, handler: F) -> Unsubscribe
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(topic, Handler::Sync(Arc::new(handler)), priority, true)
    }

    /// Register an async listener at priority 0
    pub fn on_async<F, Fut>(&self, topic: &str, handler: F) -> Unsubscribe
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.on_async_with_priority(topic, 0, handler)
    }

    pub fn on_async_with_priority<F, Fut>(
        &self,
        topic: &str,
        priority: i32,
        handler: F,
    ) -> Unsubscribe
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register(topic, boxed_async(handler), priority, false)
    }

    pub fn once_async<F, Fut>(&self, topic: &str, handler: F) -> Unsubscribe
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.once_async_with_priority(topic, 0, handler)
    }

    pub fn once_async_with_priority<F, Fut>(
        &self,
        topic: &str,
        priority: i32,
        handler: F,
    ) -> Unsubscribe
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register(topic, boxed_async(handler), priority, true)
    }

    fn register(&self, topic: &str, handler: Handler, priority: i32, once: bool) -> Unsubscribe {
        let listener = Listener::new(handler, priority, once);
        let id = listener.id.clone();
        self.registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .add(topic, listener);

        tracing::trace!(topic, listener = %id, priority, once, "listener registered");

        Unsubscribe {
            registry: Arc::downgrade(&self.registry),
            topic: topic.to_string(),
            id,
        }
    }

    /// Remove every listener registered under the exact key `topic`.
    ///
    /// Wildcards are not expanded: `off("ar.*")` only clears the `"ar.*"` key.
    pub fn off(&self, topic: &str) -> usize {
        let removed = self
            .registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove_topic(topic);
        tracing::debug!(topic, removed, "listeners removed");
        removed
    }

    /// Remove all listeners. History is kept.
    pub fn clear(&self) {
        self.registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clear();
    }

    /// Emit without waiting on async listeners.
    ///
    /// Listener failures are logged and dropped; async listeners are spawned onto the
    /// current tokio runtime.
    pub fn emit(&self, topic: &str, payload: Value) {
        self.record(topic, &payload);
        let dispatches = self.resolve(topic);
        tracing::trace!(topic, listeners = dispatches.len(), "emit");

        for dispatch in dispatches {
            if !self.claim(&dispatch) {
                continue;
            }
            let id = &dispatch.listener.id;
            match &dispatch.listener.handler {
                Handler::Sync(handler) => {
                    if let Err(e) = handler(&payload) {
                        tracing::debug!(topic, listener = %id, error = %e, "listener failed");
                    }
                }
                Handler::Async(handler) => {
                    spawn_detached(topic, id, handler(payload.clone()));
                }
            }
        }
    }

    /// Emit and wait for every async listener to settle.
    ///
    /// Fails with the first listener error, sync or async.
    pub async fn emit_async(&self, topic: &str, payload: Value) -> Result<(), EventError> {
        self.record(topic, &payload);
        let dispatches = self.resolve(topic);
        tracing::trace!(topic, listeners = dispatches.len(), "emit_async");

        let mut pending: Vec<BoxFuture<'static, Result<(), HandlerError>>> = Vec::new();
        for dispatch in dispatches {
            if !self.claim(&dispatch) {
                continue;
            }
            match &dispatch.listener.handler {
                Handler::Sync(handler) => {
                    if let Err(e) = handler(&payload) {
                        pending.push(future::ready(Err(e)).boxed());
                    }
                }
                Handler::Async(handler) => pending.push(handler(payload.clone())),
            }
        }

        // Every listener runs to completion; the first failure is what the caller sees
        future::join_all(pending)
            .await
            .into_iter()
            .find_map(Result::err)
            .map_or(Ok(()), |source| {
                Err(EventError::Handler {
                    topic: topic.to_string(),
                    source,
                })
            })
    }

    /// Snapshot of history, oldest first.
    ///
    /// `filter` is either an exact topic or a wildcard pattern.
    pub fn history(&self, filter: Option<&str>) -> Vec<EventRecord> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .records(filter)
    }

    pub fn clear_history(&self) {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Emitter that only fires the last call within each `delay` window
    pub fn debounce(&self, topic: &str, delay: Duration) -> Result<Debounced, EventError> {
        Debounced::new(self.clone(), topic, delay)
    }

    /// Emitter that fires at most once per `delay`, with one trailing emission
    pub fn throttle(&self, topic: &str, delay: Duration) -> Result<Throttled, EventError> {
        Throttled::new(self.clone(), topic, delay)
    }

    /// Count of listeners under a key, or across all keys
    pub fn listener_count(&self, topic: Option<&str>) -> usize {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry
            .entries
            .iter()
            .filter(|e| topic.map_or(true, |t| e.key == t))
            .map(|e| e.listeners.len())
            .sum()
    }

    /// Registry keys in registration order
    pub fn topics(&self) -> Vec<String> {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .iter()
            .map(|e| e.key.clone())
            .collect()
    }

    fn record(&self, topic: &str, payload: &Value) {
        let record = EventRecord {
            event: topic.to_string(),
            payload: payload.clone(),
            timestamp: (self.now)(),
        };
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    fn resolve(&self, topic: &str) -> Vec<Dispatch> {
        self.registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .resolve(topic)
    }

    /// Take ownership of a `once` listener before running it.
    ///
    /// Returns false when another dispatch already consumed it.
    fn claim(&self, dispatch: &Dispatch) -> bool {
        if !dispatch.listener.once {
            return true;
        }
        self.registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&dispatch.key, &dispatch.listener.id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.topics())
            .finish()
    }
}

fn boxed_async<F, Fut>(handler: F) -> Handler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Handler::Async(Arc::new(move |payload| handler(payload).boxed()))
}

fn spawn_detached(
    topic: &str,
    id: &ListenerId,
    fut: BoxFuture<'static, Result<(), HandlerError>>,
) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(topic, listener = %id, "no async runtime, async listener dropped");
        return;
    };
    let topic = topic.to_string();
    let id = id.clone();
    runtime.spawn(async move {
        if let Err(e) = fut.await {
            tracing::debug!(topic, listener = %id, error = %e, "async listener failed");
        }
    });
}

/// Removes exactly one registration. Calling it more than once is a no-op.
#[derive(Clone)]
pub struct Unsubscribe {
    registry: Weak<RwLock<Registry>>,
    topic: String,
    id: ListenerId,
}

impl Unsubscribe {
    /// Returns true if the listener was still registered
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.topic, &self.id);
        removed
    }

    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
