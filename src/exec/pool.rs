// src/exec/pool.rs

//! The execution pool: one engine context, one command at a time.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::{ForgeError, Result, UsageError};
use crate::exec::backend::EngineBackend;
use crate::exec::command::{Command, ResultRow};
use crate::exec::module::ModuleLocator;
use crate::exec::worker::{Job, spawn_worker};
use crate::fs::FileSystem;
use crate::host::HostAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Depth of the job channel in front of the worker. Submitters beyond
    /// this wait for a free slot.
    pub queue_length: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self { queue_length: 32 }
    }
}

/// Owns the single engine context for a session.
///
/// Commands from any number of tasks funnel through one worker, so the
/// engine only ever sees one command at a time. Concurrent submitters are
/// linearized in unspecified order; one submitter's commands run in the
/// order it submitted them.
///
/// Every error returned from here has already been written to the host's
/// error channel.
#[derive(Debug)]
pub struct ExecutionPool {
    host: HostAdapter,
    module_path: PathBuf,
    state: Mutex<PoolState>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug)]
struct PoolState {
    /// `None` once closed.
    jobs: Option<mpsc::Sender<Job>>,
    /// Commands queued or running.
    in_flight: usize,
}

/// Counts a submission as in flight until dropped, including when the
/// submitting future is cancelled.
struct InFlight<'a> {
    state: &'a Mutex<PoolState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.in_flight = st.in_flight.saturating_sub(1);
    }
}

impl ExecutionPool {
    /// Resolve the module, open the backend with `host` attached and start
    /// the worker. Any failure here is an initialization error.
    pub async fn open(
        host: HostAdapter,
        locator: &ModuleLocator,
        fs: &dyn FileSystem,
        mut backend: Box<dyn EngineBackend>,
        options: PoolOptions,
    ) -> Result<Self> {
        let module_path = match locator.resolve(fs) {
            Ok(path) => path,
            Err(err) => return Err(report(&host, err)),
        };

        if let Err(fault) = backend.open(&module_path, host.clone()).await {
            let err = ForgeError::Initialization(format!(
                "loading engine module {}: {fault}",
                module_path.display()
            ));
            return Err(report(&host, err));
        }

        let (jobs, worker) = spawn_worker(backend, options.queue_length);
        info!(
            module = %module_path.display(),
            queue_length = options.queue_length,
            host_instance = %host.instance_id(),
            "execution pool opened"
        );

        Ok(Self {
            host,
            module_path,
            state: Mutex::new(PoolState {
                jobs: Some(jobs),
                in_flight: 0,
            }),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Run `command` on the worker and wait for its rows.
    ///
    /// Failures are never retried here.
    pub async fn submit(&self, command: Command) -> Result<Vec<ResultRow>> {
        let verb = command.verb().to_string();

        let (jobs, _in_flight) = {
            let mut st = self.lock_state();
            let Some(jobs) = st.jobs.clone() else {
                drop(st);
                return Err(self.fail(UsageError::SubmitAfterClose.into()));
            };
            st.in_flight += 1;
            (jobs, InFlight { state: &self.state })
        };

        debug!(%command, "submitting command");
        let (reply_tx, reply_rx) = oneshot::channel();
        if jobs
            .send(Job::Run {
                command,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            return Err(self.fail(worker_gone(verb)));
        }

        match reply_rx.await {
            Ok(Ok(rows)) => Ok(rows),
            Ok(Err(fault)) => Err(self.fail(ForgeError::from_fault(verb, fault))),
            Err(_) => Err(self.fail(worker_gone(verb))),
        }
    }

    /// Release the engine context.
    ///
    /// Rejected, with nothing torn down, while any command is queued or
    /// running. Closing twice is a usage error.
    pub async fn close(&self) -> Result<()> {
        let jobs = {
            let mut st = self.lock_state();
            if st.jobs.is_none() {
                drop(st);
                return Err(self.fail(UsageError::AlreadyClosed.into()));
            }
            if st.in_flight > 0 {
                let in_flight = st.in_flight;
                drop(st);
                return Err(self.fail(UsageError::TeardownWhileBusy { in_flight }.into()));
            }
            st.jobs.take()
        };
        let Some(jobs) = jobs else {
            return Err(self.fail(UsageError::AlreadyClosed.into()));
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let closed = match jobs.send(Job::Close { reply: reply_tx }).await {
            Ok(()) => reply_rx.await.ok(),
            Err(_) => None,
        };

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "engine worker task panicked");
            }
        }

        match closed {
            Some(Ok(())) => {
                info!(module = %self.module_path.display(), "execution pool closed");
                Ok(())
            }
            Some(Err(fault)) => Err(self.fail(ForgeError::from_fault("close", fault))),
            None => Err(self.fail(worker_gone("close".to_string()))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().jobs.is_none()
    }

    /// Commands currently queued or running.
    pub fn in_flight(&self) -> usize {
        self.lock_state().in_flight
    }

    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    pub fn host(&self) -> &HostAdapter {
        &self.host
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fail(&self, err: ForgeError) -> ForgeError {
        report(&self.host, err)
    }
}

/// Write `err` to the host error channel and the log, then hand it back.
///
/// Refused host capabilities already reached the error channel when the
/// adapter refused them.
pub(crate) fn report(host: &HostAdapter, err: ForgeError) -> ForgeError {
    error!(error = %err, "engine operation failed");
    if !matches!(err, ForgeError::UnsupportedHostCapability(_)) {
        host.on_error_line(&err.to_string());
    }
    err
}

fn worker_gone(verb: String) -> ForgeError {
    ForgeError::Execution {
        verb,
        message: "engine worker stopped before replying".to_string(),
        cause: None,
    }
}
