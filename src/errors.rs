// src/errors.rs

//! Crate-wide error types.
//!
//! Four families matter to callers:
//! - `Initialization`: the engine module could not be located or loaded.
//!   Fatal for the session.
//! - `Execution`: a submitted command failed inside the engine. Never retried
//!   here; engine side effects are not assumed idempotent.
//! - `UnsupportedHostCapability`: the engine asked for interactive input.
//!   Kept apart from `Execution` so it is never mistaken for a transient fault.
//! - `Usage`: programmer errors such as submitting after close.

use thiserror::Error;

use crate::catalog::SelectionLevel;
use crate::exec::EngineFault;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("Command '{verb}' failed: {message}")]
    Execution {
        verb: String,
        message: String,
        #[source]
        cause: Option<EngineFault>,
    },

    #[error("Host capability unsupported: {0}")]
    UnsupportedHostCapability(String),

    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Misuse of the pool or session by the calling layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("command submitted after the execution pool was closed")]
    SubmitAfterClose,

    #[error("execution pool is already closed")]
    AlreadyClosed,

    #[error("cannot close the execution pool while {in_flight} command(s) are in flight")]
    TeardownWhileBusy { in_flight: usize },

    #[error("cannot tear down the session while media generation is running")]
    TeardownWhileGenerating,

    #[error("media generation is already running")]
    AlreadyGenerating,

    #[error("selection is incomplete; every level must be ready with a chosen value")]
    SelectionIncomplete,

    #[error("level {0} is not part of the configured cascade layout")]
    LevelNotInLayout(SelectionLevel),

    #[error("level {0} is not ready for a selection")]
    LevelNotReady(SelectionLevel),

    #[error("'{value}' is not an available {level} option")]
    UnknownChoice { level: SelectionLevel, value: String },
}

impl ForgeError {
    /// Build an execution error from a backend fault, keeping the fault as
    /// the source. Unsupported-capability faults map to their own variant.
    pub fn from_fault(verb: impl Into<String>, fault: EngineFault) -> Self {
        match fault {
            EngineFault::Unsupported(capability) => {
                ForgeError::UnsupportedHostCapability(capability)
            }
            other => ForgeError::Execution {
                verb: verb.into(),
                message: other.to_string(),
                cause: Some(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
