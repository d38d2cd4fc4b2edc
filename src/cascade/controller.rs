// src/cascade/controller.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::cascade::core::{CascadeCore, LevelQuery, LevelState, LevelView};
use crate::catalog::{CatalogService, Choice, Selection, SelectionLevel};
use crate::errors::{ForgeError, Result};
use crate::exec::pool::report;
use crate::types::CascadeLayout;

/// Async shell around [`CascadeCore`].
///
/// Runs the queries the core asks for, strictly one level after another,
/// and publishes a snapshot of all levels after every transition.
#[derive(Debug)]
pub struct CascadeController {
    core: Mutex<CascadeCore>,
    catalog: CatalogService,
    snapshots: watch::Sender<Vec<LevelView>>,
}

impl CascadeController {
    pub fn new(catalog: CatalogService, layout: CascadeLayout) -> Self {
        let core = CascadeCore::new(layout);
        let (snapshots, _) = watch::channel(core.views().to_vec());
        Self {
            core: Mutex::new(core),
            catalog,
            snapshots,
        }
    }

    /// Start resolving from the root level. Call once the catalog has been
    /// initialized.
    pub async fn begin(&self) -> Result<()> {
        let query = self.lock().mark_initialized();
        info!("resolving selection cascade from the root level");
        self.publish();
        self.resolve(query).await
    }

    /// Apply a user choice at `level` and re-resolve every level below it.
    pub async fn select(&self, level: SelectionLevel, choice: Choice) -> Result<()> {
        let next = self.lock().choose(level, choice);
        let next = match next {
            Ok(next) => next,
            Err(usage) => {
                return Err(report(self.catalog.pool().host(), ForgeError::Usage(usage)));
            }
        };
        self.publish();
        match next {
            Some(query) => self.resolve(query).await,
            None => Ok(()),
        }
    }

    /// Run queries until the chain ends, fails or is superseded.
    async fn resolve(&self, mut query: LevelQuery) -> Result<()> {
        loop {
            debug!(level = %query.level, filters = ?query.filters, "querying level");
            let result = self.catalog.query_level(query.level, &query.filters).await;

            let (next, error) = {
                let mut core = self.lock();
                let current = core.is_current(&query);
                match result {
                    Ok(rows) => (core.apply(&query, Ok(rows)), None),
                    Err(err) => {
                        let next = core.apply(&query, Err(err.to_string()));
                        (next, current.then_some(err))
                    }
                }
            };
            self.publish();

            if let Some(err) = error {
                return Err(err);
            }
            match next {
                Some(q) => query = q,
                None => return Ok(()),
            }
        }
    }

    pub fn snapshot(&self) -> Vec<LevelView> {
        self.lock().views().to_vec()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<LevelView>> {
        self.snapshots.subscribe()
    }

    pub fn state_of(&self, level: SelectionLevel) -> Option<LevelState> {
        self.lock().state_of(level).cloned()
    }

    pub fn is_launch_ready(&self) -> bool {
        self.lock().is_launch_ready()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.lock().selection()
    }

    pub fn layout(&self) -> CascadeLayout {
        self.lock().layout()
    }

    pub fn reset(&self) {
        self.lock().reset();
        self.publish();
    }

    fn publish(&self) {
        let views = self.snapshot();
        self.snapshots.send_replace(views);
    }

    fn lock(&self) -> MutexGuard<'_, CascadeCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
