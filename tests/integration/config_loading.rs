// tests/integration/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use isoforge::config::{
    ConfigFile, RawConfigFile, default_config_path, load_and_validate, load_from_path, load_or_default,
    load_or_default_from,
};
use isoforge::errors::ForgeError;
use isoforge::fs::mock::MockFileSystem;
use isoforge::types::CascadeLayout;
use isoforge_test_utils::builders::ConfigFileBuilder;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn empty_file_yields_defaults() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.engine.program, "pwsh");
    assert_eq!(cfg.engine.module_name, "MediaTool");
    assert!(cfg.engine.module_dirs.is_empty());
    assert_eq!(cfg.pool.queue_length, 32);
    assert_eq!(cfg.cascade.layout, CascadeLayout::Full);
    assert_eq!(cfg.verbs.list_catalog, "Get-MediaToolList");
    assert_eq!(cfg.pool_options().queue_length, 32);
}

#[test]
fn sections_override_defaults() {
    let file = config_file(
        r#"
[engine]
program = "powershell"
args = ["-File", "bridge.ps1"]
module_name = "Fido"
module_dirs = ["/opt/a/Modules", "/opt/b/Modules"]

[pool]
queue_length = 4

[cascade]
layout = "simple"

[verbs]
build_artifact = "New-FidoMedia"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.engine.program, "powershell");
    assert_eq!(cfg.engine.args, vec!["-File", "bridge.ps1"]);
    assert_eq!(cfg.pool.queue_length, 4);
    assert_eq!(cfg.cascade.layout, CascadeLayout::Simple);
    assert_eq!(cfg.verbs.build_artifact, "New-FidoMedia");
    assert_eq!(cfg.verbs.initialize, "Initialize-MediaTool");

    let locator = cfg.module_locator().unwrap();
    assert_eq!(locator.module_name(), "Fido");
    assert_eq!(
        locator.candidates(),
        &[PathBuf::from("/opt/a/Modules"), PathBuf::from("/opt/b/Modules")]
    );
}

#[test]
fn zero_queue_length_is_a_config_error() {
    let file = config_file("[pool]\nqueue_length = 0\n");

    match load_and_validate(file.path()) {
        Err(ForgeError::ConfigError(msg)) => assert!(msg.contains("queue_length")),
        other => panic!("expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn verbs_must_be_single_non_empty_names() {
    let file = config_file("[verbs]\nlist_catalog = \"\"\n");
    match load_and_validate(file.path()) {
        Err(ForgeError::ConfigError(msg)) => assert!(msg.contains("list_catalog")),
        other => panic!("expected ConfigError, got: {other:?}"),
    }

    let file = config_file("[verbs]\ninitialize = \"Import-Module MediaTool\"\n");
    match load_and_validate(file.path()) {
        Err(ForgeError::ConfigError(msg)) => {
            assert!(msg.contains("initialize"));
            assert!(msg.contains("Import-Module MediaTool"));
        }
        other => panic!("expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn blank_engine_fields_are_rejected() {
    let mut raw = RawConfigFile::default();
    raw.engine.program = "  ".to_string();
    assert!(matches!(ConfigFile::try_from(raw), Err(ForgeError::ConfigError(_))));

    let raw = ConfigFileBuilder::new().with_module_name("").raw();
    assert!(matches!(ConfigFile::try_from(raw), Err(ForgeError::ConfigError(_))));

    let raw = ConfigFileBuilder::new().with_module_dir("").raw();
    assert!(matches!(ConfigFile::try_from(raw), Err(ForgeError::ConfigError(_))));
}

#[test]
fn unknown_layout_is_a_toml_error() {
    let file = config_file("[cascade]\nlayout = \"sideways\"\n");

    let err = load_from_path(file.path()).unwrap_err();

    assert!(matches!(err, ForgeError::TomlError(_)), "got {err:?}");
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Isoforge.toml");

    let err = load_or_default(Some(&missing)).unwrap_err();

    assert!(matches!(err, ForgeError::IoError(_)), "got {err:?}");
}

#[test]
fn layout_parses_from_cli_text() {
    assert_eq!(" Simple ".parse::<CascadeLayout>(), Ok(CascadeLayout::Simple));
    assert_eq!("full".parse::<CascadeLayout>(), Ok(CascadeLayout::Full));
    assert!("sideways".parse::<CascadeLayout>().is_err());
    assert_eq!(CascadeLayout::Simple.levels().len(), 3);
    assert_eq!(CascadeLayout::Full.levels().len(), 5);
}

#[test]
fn default_file_is_used_when_present() {
    let fs = MockFileSystem::new();
    fs.add_file_with_contents(default_config_path(), "[pool]\nqueue_length = 2\n");

    let cfg = load_or_default_from(&fs, None).unwrap();

    assert_eq!(cfg.pool.queue_length, 2);
}

#[test]
fn built_in_defaults_without_a_default_file() {
    let cfg = load_or_default_from(&MockFileSystem::new(), None).unwrap();
    assert_eq!(cfg.pool.queue_length, 32);
    assert_eq!(cfg.cascade.layout, CascadeLayout::Full);
}

#[test]
fn an_invalid_default_file_is_not_silently_ignored() {
    let fs = MockFileSystem::new();
    fs.add_file_with_contents(default_config_path(), "[pool]\nqueue_length = 0\n");

    assert!(matches!(
        load_or_default_from(&fs, None),
        Err(ForgeError::ConfigError(_))
    ));
}
