// src/catalog/service.rs

//! Listing queries that populate the selection levels.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::level::{Filters, SelectionLevel};
use crate::config::EngineVerbs;
use crate::errors::Result;
use crate::exec::{Command, ExecutionPool, ResultRow};

/// Field removable targets are sorted by.
pub const TARGET_SORT_FIELD: &str = "DriveLetter";

#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: Arc<ExecutionPool>,
    verbs: EngineVerbs,
}

impl CatalogService {
    pub fn new(pool: Arc<ExecutionPool>, verbs: EngineVerbs) -> Self {
        Self { pool, verbs }
    }

    pub fn pool(&self) -> &Arc<ExecutionPool> {
        &self.pool
    }

    /// One-shot setup (manifest download). Must finish before any
    /// [`query_level`](Self::query_level) is meaningful.
    pub async fn initialize(&self) -> Result<Vec<ResultRow>> {
        info!(verb = %self.verbs.initialize, "initializing engine catalog");
        self.pool
            .submit(Command::builder(&self.verbs.initialize).build())
            .await
    }

    /// Options for `level` given the chosen upstream values.
    ///
    /// Rows come back sorted by the level's display field.
    pub async fn query_level(
        &self,
        level: SelectionLevel,
        filters: &Filters,
    ) -> Result<Vec<ResultRow>> {
        let command = list_command(&self.verbs.list_catalog, level, filters);
        let mut rows = self.pool.submit(command).await?;
        sort_rows(&mut rows, level.display_field());
        debug!(%level, rows = rows.len(), "level query returned");
        Ok(rows)
    }

    /// Removable destination targets, sorted by drive letter. Independent of
    /// the selection cascade.
    pub async fn query_auxiliary_targets(&self) -> Result<Vec<ResultRow>> {
        let mut rows = self
            .pool
            .submit(Command::builder(&self.verbs.list_targets).build())
            .await?;
        sort_rows(&mut rows, TARGET_SORT_FIELD);
        Ok(rows)
    }
}

/// List command for `level`: only filters strictly upstream of it are sent.
pub fn list_command(verb: &str, level: SelectionLevel, filters: &Filters) -> Command {
    filters
        .upstream_of(level)
        .iter()
        .fold(Command::builder(verb), |b, (l, value)| {
            b.param(l.param_name(), value)
        })
        .build()
}

/// Stable, case-insensitive ascending sort by `field`. Rows without the
/// field sort first.
pub fn sort_rows(rows: &mut [ResultRow], field: &str) {
    rows.sort_by_cached_key(|row| row.display(field).unwrap_or_default().to_lowercase());
}

/// Display values of `field` in row order, without duplicates.
pub fn display_values(rows: &[ResultRow], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| row.display(field))
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
