use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use ftgen::application::services::{GeneratorService, OutputTarget};
use ftgen::application::ApplicationError;
use ftgen::domain::{ConfigurationError, TreeParams};
use ftgen::infrastructure::traits::{FileSystem, RealFileSystem};
use ftgen::util::testing::{init_test_setup, MemoryFileSystem};

#[test]
fn given_memory_fs_when_generating_then_writes_document_to_target() {
    // Arrange
    init_test_setup();
    let fs = Arc::new(MemoryFileSystem::new());
    let service = GeneratorService::new(fs.clone());
    let path = PathBuf::from("out/ft.xml");

    // Act
    let report = service
        .generate(&TreeParams::default(), OutputTarget::File(path.clone()))
        .unwrap();

    // Assert
    let written = fs.contents(&path).expect("document written");
    assert_eq!(report.primary_events, 10);
    assert_eq!(
        written.matches("<define-gate ").count(),
        report.gates,
        "report and document disagree"
    );
    assert!(written.contains("Name of a file to write the fault tree: out/ft.xml"));
    assert!((report.ratio - report.primary_events as f64 / report.gates as f64).abs() < 1e-12);
}

#[test]
fn given_invalid_parameters_when_generating_then_nothing_is_written() {
    init_test_setup();
    let fs = Arc::new(MemoryFileSystem::new());
    let service = GeneratorService::new(fs.clone());
    let path = PathBuf::from("ft.xml");
    let params = TreeParams {
        ptop: 5,
        nprimary: 3,
        ..TreeParams::default()
    };

    let result = service.generate(&params, OutputTarget::File(path.clone()));

    assert!(matches!(
        result,
        Err(ApplicationError::Configuration(
            ConfigurationError::PtopExceedsPrimary { ptop: 5, nprimary: 3 }
        ))
    ));
    assert!(!fs.exists(&path));
}

#[test]
fn given_real_fs_when_generating_into_missing_dir_then_creates_file() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("tree.xml");
    let service = GeneratorService::new(Arc::new(RealFileSystem));

    let report = service
        .generate(&TreeParams::default(), OutputTarget::File(path.clone()))
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\"?>"));
    assert!(content.ends_with("</opsa-mef>"));
    assert_eq!(report.target, OutputTarget::File(path));
}

#[test]
fn given_existing_file_when_generating_then_replaces_content() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tree.xml");
    std::fs::write(&path, "stale content that is longer than nothing").unwrap();
    let fs = RealFileSystem;
    let service = GeneratorService::new(Arc::new(RealFileSystem));

    service
        .generate(&TreeParams::default(), OutputTarget::File(path.clone()))
        .unwrap();

    let content = fs.read_to_string(&path).unwrap();
    assert!(!content.contains("stale"));
    assert!(content.contains("<opsa-mef>"));
}

#[test]
fn given_render_then_document_matches_built_tree() {
    init_test_setup();
    let service = GeneratorService::new(Arc::new(MemoryFileSystem::new()));
    let params = TreeParams {
        nprimary: 25,
        ..TreeParams::default()
    };

    let (tree, document) = service.render(&params, &OutputTarget::Stdout).unwrap();

    assert_eq!(tree.num_events(), 25);
    assert_eq!(document.matches("<define-basic-event ").count(), 25);
    assert!(document.contains("Name of a file to write the fault tree: -"));
}

#[test]
fn given_ctop_equal_ptop_when_building_then_root_holds_only_events() {
    init_test_setup();
    let service = GeneratorService::new(Arc::new(MemoryFileSystem::new()));
    let params = TreeParams {
        ptop: 3,
        ctop: 3,
        nprimary: 10,
        ..TreeParams::default()
    };

    let tree = service.build(&params).unwrap();

    assert_eq!(tree.num_gates(), 1);
    assert_eq!(tree.num_events(), 3);
}
