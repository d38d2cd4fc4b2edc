// src/catalog/mod.rs

//! Catalog levels and the queries that fill them.

pub mod level;
pub mod service;

pub use level::{Choice, Filters, Selection, SelectionLevel};
pub use service::{CatalogService, display_values, list_command, sort_rows};
