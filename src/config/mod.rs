// src/config/mod.rs

//! Configuration loading and validation for isoforge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like non-empty verbs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_fs, load_from_path, load_or_default,
    load_or_default_from,
};
pub use model::{
    CascadeSection, ConfigFile, EngineSection, EngineVerbs, PoolSection, RawConfigFile,
};
