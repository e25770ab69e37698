// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tally.toml` loading

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tally_core::BusConfig;
use tally_storage::{SchemaDef, SchemaRegistry};

/// File looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

/// Data directory used when neither flag nor file names one
pub const DEFAULT_DATA_DIR: &str = ".tally";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Relative paths resolve against the config file's directory
    pub data_dir: Option<PathBuf>,
    pub bus: BusConfig,
    pub schemas: BTreeMap<String, SchemaDef>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;

        if let (Some(dir), Some(base)) = (config.data_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        tracing::debug!(path = %path.display(), schemas = config.schemas.len(), "config loaded");
        Ok(config)
    }

    /// An explicit path must exist; the default file is optional
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Flag beats file beats default
    pub fn data_dir(&self, flag: Option<&Path>, cwd: &Path) -> PathBuf {
        match (flag, &self.data_dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => dir.clone(),
            (None, None) => cwd.join(DEFAULT_DATA_DIR),
        }
    }

    pub fn schema_registry(&self) -> SchemaRegistry {
        self.schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
