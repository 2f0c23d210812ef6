//! Environment overrides live in their own test binary: they mutate process state.

use std::fs;

use tempfile::TempDir;

use ftgen::config::Settings;
use ftgen::infrastructure::traits::RealFileSystem;
use ftgen::util::testing::init_test_setup;

#[test]
fn given_env_vars_when_loading_then_override_config_files() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ftgen.toml");
    fs::write(&path, "out = \"from_file.xml\"\n[tree]\nnprimary = 40\nratio = 1.5\n").unwrap();
    std::env::set_var("FTGEN_TREE__NPRIMARY", "77");
    std::env::set_var("FTGEN_TREE__ROOT", "TOP");
    std::env::set_var("FTGEN_OUT", "-");

    // Act
    let settings = Settings::load_from(&RealFileSystem, None, Some(&path)).unwrap();

    // Assert
    assert_eq!(settings.tree.nprimary, 77);
    assert_eq!(settings.tree.root, "TOP");
    assert_eq!(settings.tree.ratio, 1.5);
    assert_eq!(settings.out.to_string_lossy(), "-");

    std::env::remove_var("FTGEN_TREE__NPRIMARY");
    std::env::remove_var("FTGEN_TREE__ROOT");
    std::env::remove_var("FTGEN_OUT");
}
