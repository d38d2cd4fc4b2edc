// src/exec/mod.rs

//! Engine execution layer.
//!
//! Everything that talks to the automation engine goes through here:
//!
//! - [`command`] defines [`Command`] (verb + ordered parameters) and
//!   [`ResultRow`].
//! - [`backend`] provides the `EngineBackend` trait the pool drives, so tests
//!   can swap in a fake engine.
//! - [`pool`] owns the single engine context and serializes all commands
//!   through one worker ([`worker`]).
//! - [`module`] finds the engine module on disk.
//! - [`process`] and [`protocol`] implement the production backend: a child
//!   process speaking JSON lines.

pub mod backend;
pub mod command;
pub mod module;
pub mod pool;
pub mod process;
pub mod protocol;
mod worker;

pub use backend::{EngineBackend, EngineFault, EngineFuture};
pub use command::{Command, CommandBuilder, ParamValue, ResultRow};
pub use module::ModuleLocator;
pub use pool::{ExecutionPool, PoolOptions};
pub use process::ProcessEngine;
