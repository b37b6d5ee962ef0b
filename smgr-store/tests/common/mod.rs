//! Shared fixtures for smgr-store integration tests
#![allow(dead_code)]

use smgr_common::config::ProjectConfig;
use smgr_store::MetadataStore;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Throw-away project directory with an opened store
pub struct TestProject {
    pub dir: TempDir,
    pub store: MetadataStore,
}

impl TestProject {
    /// Project with default config (`.unity` scenes under `Assets/`)
    pub fn new() -> Self {
        Self::with_config(ProjectConfig::default())
    }

    /// Project whose scenes use the given extension
    pub fn with_extension(extension: &str) -> Self {
        Self::with_config(ProjectConfig {
            scene_extension: extension.to_string(),
            ..ProjectConfig::default()
        })
    }

    pub fn with_config(config: ProjectConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::open(dir.path(), config).unwrap();
        Self { dir, store }
    }

    /// Absolute path of a project-relative path
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Create an empty file (and its parent directories); returns its path
    pub fn touch(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    }

    pub fn read_string(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Reopen the store from disk, as a second host process would
    pub fn reopen(&self) -> MetadataStore {
        MetadataStore::open(self.dir.path(), self.store.config().clone()).unwrap()
    }
}
