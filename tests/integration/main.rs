// tests/integration/main.rs

mod config_loading;
mod module_resolution;
mod process_engine;
