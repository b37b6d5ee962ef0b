//! Scene creation and deletion
//!
//! Creation validates everything up front and only then touches the
//! filesystem, so a rejected request leaves no trace. The scene file itself
//! is produced by a [`SceneFactory`]; the record is written immediately
//! after, and the scene is removed again if that fails.

use crate::record::SceneRecord;
use crate::store::MetadataStore;
use chrono::Utc;
use smgr_common::{document, Error, Result, SceneEvent};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Produces scene files on disk
///
/// Engine hosts implement this to instantiate real scene templates.
pub trait SceneFactory {
    /// Create the scene file at `target`, optionally from `template`
    fn create(&self, target: &Path, template: Option<&Path>) -> Result<()>;
}

/// Writes an empty scene, or a byte copy of the template
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSceneFactory;

impl SceneFactory for FileSceneFactory {
    fn create(&self, target: &Path, template: Option<&Path>) -> Result<()> {
        match template {
            Some(template) => {
                fs::copy(template, target)?;
            }
            None => fs::write(target, b"")?,
        }
        Ok(())
    }
}

/// Scene creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScene {
    /// Scene base name, without extension
    pub name: String,
    /// Target directory (project-relative or absolute)
    pub directory: PathBuf,
    /// Registered scene type for the new record
    pub scene_type: String,
    /// Optional template the scene is created from
    pub template: Option<PathBuf>,
}

impl MetadataStore {
    /// Create a scene and its record
    ///
    /// # Errors
    /// - `InvalidInput`: empty or path-like name, empty directory, empty or
    ///   unregistered type
    /// - `NotFound`: the template does not exist
    /// - `AlreadyExists`: a scene with that name already exists in the
    ///   directory
    pub fn create_scene(&self, request: &NewScene, factory: &dyn SceneFactory) -> Result<SceneRecord> {
        let target = self.validate_new_scene(request)?;
        let template = request.template.as_deref().map(|t| self.resolve(t));

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        factory.create(&target, template.as_deref())?;

        // A stale record left behind by an earlier scene of the same name is
        // overwritten, never adopted.
        let record = match self.write_record(&target, &request.scene_type) {
            Ok(record) => record,
            Err(e) => {
                warn!("Record creation failed for {}, removing scene: {}", target.display(), e);
                let _ = fs::remove_file(&target);
                return Err(e);
            }
        };

        info!(
            scene = %target.display(),
            scene_type = %request.scene_type,
            "Scene created"
        );
        self.emit(SceneEvent::SceneCreated {
            scene: target,
            scene_type: record.type_tag.clone(),
            timestamp: Utc::now(),
        });
        Ok(record)
    }

    /// Delete a scene with its record, engine `.meta` file and companion
    /// directory (same name as the scene, e.g. baked lighting data)
    pub fn delete_scene(&self, scene: &Path) -> Result<()> {
        let scene_path = self.existing_scene(scene)?;
        let record_path = self.record_path(&scene_path)?;

        // Side-cars go only once the scene itself is gone
        fs::remove_file(&scene_path)?;

        document::remove_document(&record_path)?;

        let mut meta = scene_path.clone().into_os_string();
        meta.push(".meta");
        document::remove_document(Path::new(&meta))?;

        let companion = scene_path.with_extension("");
        if companion.is_dir() {
            debug!(dir = %companion.display(), "Removing scene companion directory");
            fs::remove_dir_all(&companion)?;
        }

        info!(scene = %scene_path.display(), "Scene deleted");
        self.emit(SceneEvent::SceneDeleted {
            scene: scene_path,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Check a creation request; returns the target scene path
    fn validate_new_scene(&self, request: &NewScene) -> Result<PathBuf> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("scene name is empty".to_string()));
        }
        if name.contains(|c: char| c == '/' || c == '\\') || name == "." || name == ".." {
            return Err(Error::InvalidInput(format!("invalid scene name '{name}'")));
        }
        if request.directory.as_os_str().is_empty() {
            return Err(Error::InvalidInput("scene path is empty".to_string()));
        }
        if request.scene_type.is_empty() {
            return Err(Error::InvalidInput("no scene type selected".to_string()));
        }
        if !self.registry().contains(&request.scene_type) {
            return Err(Error::InvalidInput(format!(
                "unknown scene type '{}'",
                request.scene_type
            )));
        }
        if let Some(template) = &request.template {
            let template = self.resolve(template);
            if !template.is_file() {
                return Err(Error::NotFound(format!("scene template {}", template.display())));
            }
        }

        let target = self
            .resolve(&request.directory)
            .join(format!("{}.{}", name, self.config().scene_extension));
        if target.exists() {
            return Err(Error::AlreadyExists(target));
        }
        Ok(target)
    }
}
