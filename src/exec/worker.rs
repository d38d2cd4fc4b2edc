// src/exec/worker.rs

//! The single worker task that owns an engine backend.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::backend::{EngineBackend, EngineFault};
use crate::exec::command::{Command, ResultRow};

pub(crate) type JobReply<T> = oneshot::Sender<Result<T, EngineFault>>;

/// Work item sent to the worker.
pub(crate) enum Job {
    Run {
        command: Command,
        reply: JobReply<Vec<ResultRow>>,
    },
    Close {
        reply: JobReply<()>,
    },
}

/// Spawn the worker loop around an already-opened backend.
///
/// Jobs are handled strictly one after another, so the backend never sees
/// two commands at once. The loop ends after a `Close` job or when every
/// sender has been dropped; in the latter case the backend is closed too.
pub(crate) fn spawn_worker(
    mut backend: Box<dyn EngineBackend>,
    queue_length: usize,
) -> (mpsc::Sender<Job>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Job>(queue_length.max(1));

    let handle = tokio::spawn(async move {
        info!("engine worker started");

        let mut closed = false;
        while let Some(job) = rx.recv().await {
            match job {
                Job::Run { command, reply } => {
                    let verb = command.verb().to_string();
                    debug!(%verb, "running command");
                    let result = backend.invoke(command).await;
                    match &result {
                        Ok(rows) => debug!(%verb, rows = rows.len(), "command finished"),
                        Err(fault) => debug!(%verb, %fault, "command failed"),
                    }
                    if reply.send(result).is_err() {
                        debug!(%verb, "submitter went away before the reply");
                    }
                }
                Job::Close { reply } => {
                    let result = backend.close().await;
                    closed = true;
                    let _ = reply.send(result);
                    break;
                }
            }
        }

        if !closed {
            warn!("engine worker channel dropped without close; closing backend");
            if let Err(fault) = backend.close().await {
                warn!(%fault, "closing backend after channel drop failed");
            }
        }

        info!("engine worker finished");
    });

    (tx, handle)
}
