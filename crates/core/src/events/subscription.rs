// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic patterns and listener registrations

use crate::id::next_listener_seq;
use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Error a listener hands back to the bus
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Listener that completes during dispatch
pub type SyncHandler = Arc<dyn Fn(&Value) -> Result<(), HandlerError> + Send + Sync>;

/// Listener whose work finishes in a future
pub type AsyncHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// How a registry key matched an emitted topic.
///
/// Ordering matters: exact matches sort ahead of wildcard matches at equal priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Exact,
    Wildcard,
}

/// Pattern for matching topics
/// Supports:
///   - Exact: "ar.invoice.created"
///   - Wildcard: "ar.*" matches "ar.invoice.created" (`*` spans any substring, dots included)
///   - Global: "*" matches every topic
#[derive(Clone, Debug)]
pub struct EventPattern {
    raw: String,
    wildcard: Option<Regex>,
}

impl EventPattern {
    pub fn new(pattern: &str) -> Self {
        let wildcard = if pattern.contains('*') {
            Self::compile(pattern)
        } else {
            None
        };
        Self {
            raw: pattern.to_string(),
            wildcard,
        }
    }

    /// Translate a wildcard pattern into an anchored regex.
    ///
    /// Every literal run is escaped; each `*` becomes `.*`. A pattern the regex engine
    /// rejects degrades to a literal and only matches its own text.
    fn compile(pattern: &str) -> Option<Regex> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        match Regex::new(&format!("^{body}$")) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "wildcard pattern treated as literal");
                None
            }
        }
    }

    /// Classify how this pattern matches a topic, if at all
    pub fn match_kind(&self, topic: &str) -> Option<MatchKind> {
        if self.raw == topic {
            return Some(MatchKind::Exact);
        }
        match &self.wildcard {
            Some(re) if re.is_match(topic) => Some(MatchKind::Wildcard),
            _ => None,
        }
    }

    /// Check if this pattern matches a topic
    pub fn matches(&self, topic: &str) -> bool {
        self.match_kind(topic).is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Convenience for one-off checks outside the bus
pub fn wildcard_match(pattern: &str, topic: &str) -> bool {
    EventPattern::new(pattern).matches(topic)
}

/// Handle identifying a single registration
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub String);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(next_listener_seq().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone)]
pub(crate) enum Handler {
    Sync(SyncHandler),
    Async(AsyncHandler),
}

/// A registered listener
#[derive(Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub priority: i32,
    pub once: bool,
    pub(crate) handler: Handler,
}

impl Listener {
    pub(crate) fn new(handler: Handler, priority: i32, once: bool) -> Self {
        Self {
            id: ListenerId::next(),
            priority,
            once,
            handler,
        }
    }

    pub fn is_async(&self) -> bool {
        matches!(self.handler, Handler::Async(_))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("once", &self.once)
            .field("async", &self.is_async())
            .finish()
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
