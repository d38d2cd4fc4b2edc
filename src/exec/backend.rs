// src/exec/backend.rs

//! Pluggable engine backend abstraction.
//!
//! The execution pool talks to an `EngineBackend` instead of a concrete
//! engine. Production code uses [`ProcessEngine`](super::ProcessEngine),
//! which drives an interpreter child process; tests provide an in-process
//! fake that records invocations and replies directly.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use thiserror::Error;

use crate::exec::command::{Command, ResultRow};
use crate::host::{HostAdapter, HostError};

/// Failure reported by a backend for a single operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    /// The engine ran the command and it failed.
    #[error("{message}")]
    Script { message: String },

    /// The engine asked the host for an interactive capability.
    #[error("host capability unsupported: {0}")]
    Unsupported(String),

    /// The backend could not talk to the engine at all.
    #[error("engine transport failure: {0}")]
    Transport(String),
}

impl EngineFault {
    pub fn script(message: impl Into<String>) -> Self {
        EngineFault::Script {
            message: message.into(),
        }
    }
}

impl From<HostError> for EngineFault {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnsupportedCapability { capability } => {
                EngineFault::Unsupported(capability.to_string())
            }
        }
    }
}

pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EngineFault>> + Send + 'a>>;

/// A single engine execution context.
///
/// The pool guarantees calls are strictly sequential: `open` once, then any
/// number of `invoke`s one at a time, then `close` once.
pub trait EngineBackend: Send {
    /// Load the engine module at `module` and attach `host` for output.
    fn open<'a>(&'a mut self, module: &'a Path, host: HostAdapter) -> EngineFuture<'a, ()>;

    /// Run one command to completion and return its rows in engine order.
    fn invoke(&mut self, command: Command) -> EngineFuture<'_, Vec<ResultRow>>;

    /// Release the context.
    fn close(&mut self) -> EngineFuture<'_, ()>;
}
