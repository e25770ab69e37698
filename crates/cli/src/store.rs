// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring of adapter, bus and schemas for one invocation

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tally_adapters::{Document, JsonFileAdapter, TracedAdapter};
use tally_core::EventBus;
use tally_storage::{Collection, SchemaRegistry};

pub type Adapter = TracedAdapter<JsonFileAdapter>;

/// Collections of schemaless JSON records
pub type Records = Collection<Document, Adapter>;

pub struct Store {
    adapter: Adapter,
    bus: EventBus,
    schemas: SchemaRegistry,
}

impl Store {
    pub fn open(config: &Config, data_dir: &Path) -> Result<Self> {
        let adapter = JsonFileAdapter::open(data_dir)
            .with_context(|| format!("opening data directory {}", data_dir.display()))?;
        tracing::debug!(data_dir = %data_dir.display(), "store opened");
        Ok(Self {
            adapter: TracedAdapter::new(adapter),
            bus: EventBus::with_config(config.bus.clone()),
            schemas: config.schema_registry(),
        })
    }

    pub fn collection(&self, name: &str) -> Records {
        Collection::new(
            name,
            self.adapter.clone(),
            self.bus.clone(),
            self.schemas.clone(),
        )
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
