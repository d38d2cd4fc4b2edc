// src/session.rs

//! One client session: pool, catalog, launcher and cascade wired together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use crate::cascade::CascadeController;
use crate::catalog::{CatalogService, Choice, SelectionLevel};
use crate::config::ConfigFile;
use crate::errors::{ForgeError, Result, UsageError};
use crate::exec::pool::report;
use crate::exec::{EngineBackend, ExecutionPool, ModuleLocator, ResultRow};
use crate::fs::FileSystem;
use crate::host::HostAdapter;
use crate::launcher::{Destination, LaunchOptions, Launcher};

#[derive(Debug)]
pub struct Session {
    pool: Arc<ExecutionPool>,
    catalog: CatalogService,
    launcher: Launcher,
    cascade: CascadeController,
    targets: Mutex<Vec<ResultRow>>,
    generating: AtomicBool,
}

/// Clears the generating flag when a launch ends, however it ends.
struct GeneratingGate<'a>(&'a AtomicBool);

impl Drop for GeneratingGate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Session {
    /// Open the engine context for a new session.
    pub async fn open(
        config: &ConfigFile,
        host: HostAdapter,
        backend: Box<dyn EngineBackend>,
        fs: &dyn FileSystem,
    ) -> Result<Self> {
        let locator = match config.module_locator() {
            Ok(locator) => locator,
            Err(err) => return Err(report(&host, err)),
        };
        Self::open_with_locator(config, host, backend, fs, &locator).await
    }

    pub async fn open_with_locator(
        config: &ConfigFile,
        host: HostAdapter,
        backend: Box<dyn EngineBackend>,
        fs: &dyn FileSystem,
        locator: &ModuleLocator,
    ) -> Result<Self> {
        let pool = Arc::new(
            ExecutionPool::open(host, locator, fs, backend, config.pool_options()).await?,
        );
        let catalog = CatalogService::new(pool.clone(), config.verbs.clone());
        let launcher = Launcher::new(pool.clone(), &config.verbs.build_artifact);
        let cascade = CascadeController::new(catalog.clone(), config.cascade.layout);

        Ok(Self {
            pool,
            catalog,
            launcher,
            cascade,
            targets: Mutex::new(Vec::new()),
            generating: AtomicBool::new(false),
        })
    }

    /// Initialize the catalog, list removable targets and resolve the
    /// cascade from the root.
    ///
    /// Both startup queries are issued together; the pool still runs them
    /// one after the other. A failed target listing is logged and leaves the
    /// target list empty.
    pub async fn start(&self) -> Result<Vec<ResultRow>> {
        let (init, targets) = tokio::join!(
            self.catalog.initialize(),
            self.catalog.query_auxiliary_targets()
        );
        let init = init?;

        match targets {
            Ok(rows) => *self.lock_targets() = rows,
            Err(err) => warn!(error = %err, "listing removable targets failed"),
        }

        self.cascade.begin().await?;
        info!(launch_ready = self.cascade.is_launch_ready(), "session started");
        Ok(init)
    }

    /// Re-list removable targets.
    pub async fn refresh_targets(&self) -> Result<Vec<ResultRow>> {
        let rows = self.catalog.query_auxiliary_targets().await?;
        *self.lock_targets() = rows.clone();
        Ok(rows)
    }

    /// Change the choice at `level`. Rejected while a launch is running.
    pub async fn select(&self, level: SelectionLevel, choice: Choice) -> Result<()> {
        if self.is_generating() {
            return Err(self.usage(UsageError::AlreadyGenerating));
        }
        self.cascade.select(level, choice).await
    }

    /// Build the artifact from the current selection.
    ///
    /// Only one launch may run at a time, and only once every level is
    /// ready with a choice.
    pub async fn launch(
        &self,
        destination: &Destination,
        options: LaunchOptions,
    ) -> Result<Vec<ResultRow>> {
        let Some(selection) = self.cascade.selection() else {
            return Err(self.usage(UsageError::SelectionIncomplete));
        };
        if self.generating.swap(true, Ordering::SeqCst) {
            return Err(self.usage(UsageError::AlreadyGenerating));
        }
        let _gate = GeneratingGate(&self.generating);

        self.launcher.launch(&selection, destination, options).await
    }

    /// Close the engine context and clear the selection state.
    ///
    /// Rejected, with nothing torn down, while a launch is running.
    pub async fn teardown(&self) -> Result<()> {
        if self.is_generating() {
            return Err(self.usage(UsageError::TeardownWhileGenerating));
        }
        self.pool.close().await?;
        self.cascade.reset();
        info!("session torn down");
        Ok(())
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<ResultRow> {
        self.lock_targets().clone()
    }

    pub fn cascade(&self) -> &CascadeController {
        &self.cascade
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn pool(&self) -> &Arc<ExecutionPool> {
        &self.pool
    }

    pub fn host(&self) -> &HostAdapter {
        self.pool.host()
    }

    fn usage(&self, err: UsageError) -> ForgeError {
        report(self.pool.host(), err.into())
    }

    fn lock_targets(&self) -> std::sync::MutexGuard<'_, Vec<ResultRow>> {
        self.targets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
