//! Common test utilities for oval-session integration tests

use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding copies of the fixture documents
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new, empty test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    #[allow(dead_code)]
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Copy a fixture from `tests/common/fixtures` into the workspace
    pub fn copy_fixture(&self, name: &str) -> PathBuf {
        let target = self.path.join(name);
        std::fs::copy(fixture_path(name), &target).expect("Failed to copy fixture");
        target
    }
}

/// Path of a fixture in the source tree
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("common")
        .join("fixtures")
        .join(name)
}

/// Contents of a fixture in the source tree
#[allow(dead_code)]
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("Failed to read fixture")
}
