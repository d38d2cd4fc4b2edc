// src/cascade/mod.rs

//! Cascading selection resolution.
//!
//! Levels are resolved top-down: a level's options depend on every choice
//! above it, so a change at one level invalidates everything below and the
//! lower levels are re-queried one at a time, in order.
//!
//! - [`core`] is the pure state machine (no Tokio, no IO).
//! - [`controller`] runs the queries it asks for and publishes snapshots.

pub mod controller;
pub mod core;

pub use self::controller::CascadeController;
pub use self::core::{CascadeCore, LevelQuery, LevelState, LevelView};
