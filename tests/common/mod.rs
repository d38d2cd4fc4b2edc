#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use isoforge::catalog::SelectionLevel;
use isoforge::config::{ConfigFile, EngineVerbs};
use isoforge::exec::{Command, ExecutionPool, ModuleLocator, PoolOptions, ResultRow};
use isoforge::fs::mock::MockFileSystem;
use isoforge::session::Session;
use isoforge::types::CascadeLayout;
use isoforge_test_utils::builders::ConfigFileBuilder;
use isoforge_test_utils::{FakeEngine, Probe, RecordingSink, recording_host};

pub use isoforge_test_utils::{init_tracing, with_timeout};

pub const MODULE_DIR: &str = "/opt/isoforge/Modules";
pub const MODULE_NAME: &str = "MediaTool";

/// Catalog the fake engine serves: Version, Architecture, Language, Media,
/// Edition. Deliberately unsorted.
pub const CATALOG: &[[&str; 5]] = &[
    ["11", "x86", "fr-fr", "ISO", "Pro"],
    ["11", "x64", "en-us", "ISO", "Pro"],
    ["11", "x64", "en-us", "ISO", "Home"],
    ["11", "x64", "de-de", "ESD", "Pro"],
    ["10", "x64", "en-us", "ISO", "Education"],
    ["10", "x86", "en-us", "ISO", "Pro"],
];

pub fn verbs() -> EngineVerbs {
    EngineVerbs::default()
}

pub fn module_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir(MODULE_DIR);
    fs
}

pub fn locator() -> ModuleLocator {
    ModuleLocator::new(vec![PathBuf::from(MODULE_DIR)], MODULE_NAME)
}

pub fn config(layout: CascadeLayout) -> ConfigFile {
    ConfigFileBuilder::new()
        .with_module_dir(MODULE_DIR)
        .with_layout(layout)
        .build()
}

/// Rows of [`CATALOG`] matching the command's level parameters.
pub fn catalog_rows(cmd: &Command) -> Vec<ResultRow> {
    CATALOG
        .iter()
        .filter(|entry| {
            SelectionLevel::ALL
                .iter()
                .zip(entry.iter())
                .all(|(level, value)| cmd.text(level.param_name()).is_none_or(|f| f == *value))
        })
        .map(|entry| {
            SelectionLevel::ALL
                .iter()
                .zip(entry.iter())
                .map(|(level, value)| (level.display_field(), *value))
                .collect::<ResultRow>()
        })
        .collect()
}

/// Fake engine answering every catalog verb.
pub fn catalog_engine() -> FakeEngine {
    let v = verbs();
    FakeEngine::new()
        .rows(
            &v.initialize,
            vec![ResultRow::new().with("Status", "Ready")],
        )
        .on(&v.list_catalog, catalog_rows)
        .rows(
            &v.list_targets,
            vec![
                ResultRow::new().with("DriveLetter", "F").with("Label", "BACKUP"),
                ResultRow::new().with("DriveLetter", "E").with("Label", "STICK"),
            ],
        )
}

/// Which level a list command was asking for: the first level without a
/// filter parameter.
pub fn queried_level(cmd: &Command) -> Option<SelectionLevel> {
    SelectionLevel::ALL
        .into_iter()
        .find(|level| !cmd.has(level.param_name()))
}

pub async fn open_pool(engine: FakeEngine) -> (Arc<ExecutionPool>, Probe, RecordingSink) {
    let probe = engine.probe();
    let (host, sink) = recording_host();
    let pool = ExecutionPool::open(
        host,
        &locator(),
        &module_fs(),
        engine.boxed(),
        PoolOptions::default(),
    )
    .await
    .expect("pool opens");
    (Arc::new(pool), probe, sink)
}

pub async fn open_session(
    engine: FakeEngine,
    layout: CascadeLayout,
) -> (Arc<Session>, Probe, RecordingSink) {
    let probe = engine.probe();
    let (host, sink) = recording_host();
    let session = Session::open(&config(layout), host, engine.boxed(), &module_fs())
        .await
        .expect("session opens");
    (Arc::new(session), probe, sink)
}
