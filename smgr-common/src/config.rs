//! Configuration loading and project root resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the project root
pub const PROJECT_ROOT_ENV: &str = "SMGR_PROJECT_ROOT";

/// Per-project configuration file, looked up in the project root
pub const PROJECT_CONFIG_FILE: &str = "smgr.toml";

/// Default scene type seeded into a fresh registry
pub const DEFAULT_SCENE_TYPE: &str = "Level";

/// Project root resolution, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `SMGR_PROJECT_ROOT` environment variable
/// 3. Current working directory (fallback)
pub fn resolve_project_root(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(PROJECT_ROOT_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: Current directory
    Ok(std::env::current_dir()?)
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Project configuration (`smgr.toml`)
///
/// Every field is optional in the file; missing fields take the defaults
/// of a standard engine project layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project-relative directory holding all scene assets
    pub assets_dir: PathBuf,
    /// Scene file extension, without the leading dot
    pub scene_extension: String,
    /// Project-relative location of the type registry document
    pub registry_path: PathBuf,
    /// EventBus channel capacity
    pub event_capacity: usize,
    pub logging: LoggingConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("Assets"),
            scene_extension: "unity".to_string(),
            registry_path: PathBuf::from("Assets/Editor/.scenemanager/.scenetypes.json"),
            event_capacity: 100,
            logging: LoggingConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration for a project
    ///
    /// Lookup order: `<root>/smgr.toml`, then the user config file
    /// (`~/.config/smgr/config.toml` on Linux), then compiled defaults.
    /// A missing file is not an error; a malformed one is.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_with_fallback(root, user_config_file().as_deref())
    }

    /// Same as [`ProjectConfig::load`] with an explicit user config file
    pub fn load_with_fallback(root: &Path, user_file: Option<&Path>) -> Result<Self> {
        let project_file = root.join(PROJECT_CONFIG_FILE);
        if project_file.exists() {
            info!("Loading project config: {}", project_file.display());
            return Self::from_file(&project_file);
        }

        if let Some(user_file) = user_file {
            if user_file.exists() {
                info!("Loading user config: {}", user_file.display());
                return Self::from_file(user_file);
            }
        }

        warn!(
            "No config file found for {} (using defaults)",
            root.display()
        );
        Ok(Self::default())
    }

    /// Parse and validate a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        config.validated()
    }

    /// Normalize and check field values
    ///
    /// A leading dot on the extension is tolerated and stripped.
    pub fn validated(mut self) -> Result<Self> {
        self.scene_extension = self.scene_extension.trim().trim_start_matches('.').to_string();
        if self.scene_extension.is_empty() {
            return Err(Error::Config("scene_extension must not be empty".to_string()));
        }
        if self.assets_dir.is_absolute() || self.registry_path.is_absolute() {
            return Err(Error::Config(
                "assets_dir and registry_path must be project-relative".to_string(),
            ));
        }
        if self.registry_path.file_name().is_none() {
            return Err(Error::Config("registry_path must name a file".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        debug!(config = ?self, "Project config validated");
        Ok(self)
    }

    /// Absolute assets directory for a project root
    pub fn assets_root(&self, root: &Path) -> PathBuf {
        root.join(&self.assets_dir)
    }

    /// Absolute registry document path for a project root
    pub fn registry_file(&self, root: &Path) -> PathBuf {
        root.join(&self.registry_path)
    }
}

/// Platform user config file (`<config_dir>/smgr/config.toml`)
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smgr").join("config.toml"))
}

/// Write a project config atomically (temp file + rename)
pub fn write_project_config(config: &ProjectConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp = crate::document::temp_path(path)?;
    std::fs::write(&temp, content)?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}
