// tests/integration/module_resolution.rs

use std::path::{Path, PathBuf};

use isoforge::errors::ForgeError;
use isoforge::exec::ModuleLocator;
use isoforge::fs::RealFileSystem;
use isoforge::fs::mock::MockFileSystem;

#[test]
fn default_candidates_cover_install_and_development_layouts() {
    let candidates = ModuleLocator::default_candidates(Path::new("/work/isoforge/target/debug"));

    assert_eq!(
        candidates,
        vec![
            PathBuf::from("/work/isoforge/target/debug/Modules"),
            PathBuf::from("/work/isoforge/Modules"),
        ]
    );
}

#[test]
fn shallow_base_has_no_development_candidate() {
    let candidates = ModuleLocator::default_candidates(Path::new("/opt"));
    assert_eq!(candidates, vec![PathBuf::from("/opt/Modules")]);
}

#[test]
fn first_existing_candidate_wins() {
    let fs = MockFileSystem::new();
    fs.add_dir("/second/Modules");
    fs.add_dir("/third/Modules");
    let locator = ModuleLocator::new(
        vec![
            PathBuf::from("/first/Modules"),
            PathBuf::from("/second/Modules"),
            PathBuf::from("/third/Modules"),
        ],
        "MediaTool",
    );

    let path = locator.resolve(&fs).unwrap();

    assert_eq!(path, PathBuf::from("/second/Modules/MediaTool"));
}

#[test]
fn a_file_is_not_a_module_directory() {
    let fs = MockFileSystem::new();
    fs.add_file("/first/Modules");
    fs.add_dir("/second/Modules");
    let locator = ModuleLocator::new(
        vec![PathBuf::from("/first/Modules"), PathBuf::from("/second/Modules")],
        "MediaTool",
    );

    assert_eq!(
        locator.resolve(&fs).unwrap(),
        PathBuf::from("/second/Modules/MediaTool")
    );
}

#[test]
fn nothing_found_lists_every_candidate() {
    let locator = ModuleLocator::new(
        vec![PathBuf::from("/a/Modules"), PathBuf::from("/b/Modules")],
        "MediaTool",
    );

    match locator.resolve(&MockFileSystem::new()) {
        Err(ForgeError::Initialization(msg)) => {
            assert!(msg.contains("MediaTool"));
            assert!(msg.contains("/a/Modules"));
            assert!(msg.contains("/b/Modules"));
        }
        other => panic!("expected Initialization error, got: {other:?}"),
    }
}

#[test]
fn resolves_against_the_real_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let modules = dir.path().join("Modules");
    std::fs::create_dir(&modules).unwrap();
    let locator = ModuleLocator::new(vec![dir.path().join("Missing"), modules.clone()], "MediaTool");

    let path = locator.resolve(&RealFileSystem).unwrap();

    assert_eq!(path, modules.join("MediaTool"));
}
