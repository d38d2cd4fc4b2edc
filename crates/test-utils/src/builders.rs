#![allow(dead_code)]

use std::path::PathBuf;

use isoforge::config::{ConfigFile, RawConfigFile};
use isoforge::exec::ResultRow;
use isoforge::types::CascadeLayout;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_module_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.engine.module_dirs.push(dir.into());
        self
    }

    pub fn with_module_name(mut self, name: &str) -> Self {
        self.config.engine.module_name = name.to_string();
        self
    }

    pub fn with_layout(mut self, layout: CascadeLayout) -> Self {
        self.config.cascade.layout = layout;
        self
    }

    pub fn with_queue_length(mut self, n: usize) -> Self {
        self.config.pool.queue_length = n;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One row per value, each with the single field `field`.
pub fn rows(field: &str, values: &[&str]) -> Vec<ResultRow> {
    values
        .iter()
        .map(|v| ResultRow::new().with(field, *v))
        .collect()
}

/// A row from `(field, value)` pairs.
pub fn row(fields: &[(&str, &str)]) -> ResultRow {
    fields.iter().map(|(k, v)| (*k, *v)).collect()
}
