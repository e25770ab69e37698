// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-collection record schemas
//!
//! Schemas are keyed by collection name. A collection without a registered
//! schema accepts any record.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};
use tally_adapters::{filter::lookup, Document};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 string
    Timestamp,
    Array,
    Object,
    Any,
}

impl FieldType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Timestamp => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Any => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub required: bool,
}

type Check = Arc<dyn Fn(&Document) -> Result<(), String> + Send + Sync>;

/// Field rules plus optional whole-record checks.
///
/// Field names may be dotted paths into nested objects. A null value counts
/// as absent.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SchemaDef {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,
    #[serde(skip)]
    checks: Vec<(String, Check)>,
}

impl SchemaDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), FieldRule { ty, required: false });
        self
    }

    pub fn required(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), FieldRule { ty, required: true });
        self
    }

    /// Add a named record-level check; `Err` carries the message
    pub fn with_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Document) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push((name.into(), Arc::new(check)));
        self
    }

    /// Every rule the record breaks, in field order then check order
    pub fn violations(&self, record: &Document) -> Vec<Violation> {
        let mut found = Vec::new();
        for (field, rule) in &self.fields {
            match lookup(record, field).filter(|v| !v.is_null()) {
                None if rule.required => found.push(Violation {
                    field: field.clone(),
                    kind: ViolationKind::Missing,
                }),
                None => {}
                Some(value) if !rule.ty.accepts(value) => found.push(Violation {
                    field: field.clone(),
                    kind: ViolationKind::WrongType {
                        expected: rule.ty,
                        found: json_kind(value),
                    },
                }),
                Some(_) => {}
            }
        }
        for (name, check) in &self.checks {
            if let Err(message) = check(record) {
                found.push(Violation {
                    field: name.clone(),
                    kind: ViolationKind::Check(message),
                });
            }
        }
        found
    }
}

impl fmt::Debug for SchemaDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDef")
            .field("fields", &self.fields)
            .field(
                "checks",
                &self.checks.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: FieldType, found: &'static str },
    Check(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{} is required", self.field),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "{} must be {}, got {}", self.field, expected, found)
            }
            ViolationKind::Check(message) => write!(f, "{}: {}", self.field, message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for {collection}: {}", join(.violations))]
pub struct ValidationError {
    pub collection: String,
    pub violations: Vec<Violation>,
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Shared registry of schemas by collection name
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: Arc<RwLock<HashMap<String, SchemaDef>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any schema already registered under `name`
    pub fn register(&self, name: impl Into<String>, schema: SchemaDef) {
        self.schemas
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<SchemaDef> {
        self.schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn validate(&self, name: &str, record: &Document) -> Result<(), ValidationError> {
        let schemas = self.schemas.read().unwrap_or_else(|e| e.into_inner());
        let Some(schema) = schemas.get(name) else {
            return Ok(());
        };
        let violations = schema.violations(record);
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(collection = name, count = violations.len(), "record rejected");
        Err(ValidationError {
            collection: name.to_string(),
            violations,
        })
    }
}

impl FromIterator<(String, SchemaDef)> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = (String, SchemaDef)>>(iter: I) -> Self {
        Self {
            schemas: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
