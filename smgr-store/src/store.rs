//! Scene metadata store
//!
//! Owns the per-scene side-car records and the type registry of a project.
//! There is no central index: a record is found by deriving its path from
//! the scene's current path (`Assets/Scenes/Main.unity` →
//! `Assets/Scenes/.Main.json`).
//!
//! Reads are self-healing: a missing, empty or corrupt record is regenerated
//! with defaults instead of surfacing an error. Writes only happen on
//! explicit calls (`write`, `create_scene`, ...) and always reflect the
//! scene's live location at the time of the write.

use crate::identity::{IdentitySource, PathIdentity};
use crate::record::SceneRecord;
use crate::registry::TypeRegistry;
use chrono::Utc;
use smgr_common::config::ProjectConfig;
use smgr_common::{document, paths, DocumentStatus, Error, EventBus, Result, SceneEvent};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Metadata store for one project
pub struct MetadataStore {
    root: PathBuf,
    config: ProjectConfig,
    registry: TypeRegistry,
    identity: Box<dyn IdentitySource>,
    events: EventBus,
}

impl MetadataStore {
    /// Assemble a store from its parts
    ///
    /// The registry is attached to `events` so type changes are broadcast
    /// on the same bus as record changes.
    pub fn new(
        root: impl Into<PathBuf>,
        config: ProjectConfig,
        mut registry: TypeRegistry,
        events: EventBus,
    ) -> Self {
        registry.set_event_bus(events.clone());
        Self {
            root: root.into(),
            config,
            registry,
            identity: Box::new(PathIdentity),
            events,
        }
    }

    /// Open a project: import the registry at its configured location and
    /// create an event bus with the configured capacity
    pub fn open(root: impl Into<PathBuf>, config: ProjectConfig) -> Result<Self> {
        let root = root.into();
        let registry = TypeRegistry::open(config.registry_file(&root))?;
        let events = EventBus::new(config.event_capacity);
        info!(
            root = %root.display(),
            types = registry.len(),
            "Scene metadata store opened"
        );
        Ok(Self::new(root, config, registry, events))
    }

    /// Replace the identity source (e.g. with one backed by a host asset database)
    pub fn with_identity(mut self, identity: Box<dyn IdentitySource>) -> Self {
        self.identity = identity;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Absolute assets directory
    pub fn assets_root(&self) -> PathBuf {
        self.config.assets_root(&self.root)
    }

    /// Absolute form of a scene path (relative paths are project-relative)
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Co-located record path for a scene
    pub fn record_path(&self, scene: &Path) -> Result<PathBuf> {
        let scene = self.resolve(scene);
        paths::record_path_for(&scene)
            .ok_or_else(|| Error::InvalidInput(format!("not a scene path: {}", scene.display())))
    }

    // ========================================================================
    // Record CRUD
    // ========================================================================

    /// Make sure a valid record exists for `scene`
    ///
    /// A missing or unparsable record is (re)written with identity, name and
    /// containing path from the scene's current location and
    /// `default_type` (the registry's first type when None). An existing
    /// valid record is never touched.
    pub fn ensure_record(&self, scene: &Path, default_type: Option<&str>) -> Result<DocumentStatus> {
        let scene_path = self.existing_scene(scene)?;
        let record_path = self.record_path(&scene_path)?;
        let scene_type = default_type.unwrap_or_else(|| self.registry.default_type());

        let status = document::ensure_valid_document(&record_path, || {
            self.record_for(&scene_path, scene_type)
        })?;

        if status.was_written() {
            info!(
                scene = %scene_path.display(),
                scene_type,
                status = ?status,
                "Scene record written"
            );
            self.emit(SceneEvent::RecordCreated {
                scene: scene_path,
                record: record_path,
                timestamp: Utc::now(),
            });
        }
        Ok(status)
    }

    /// Read a scene's record, creating or repairing it first if needed
    pub fn read(&self, scene: &Path) -> Result<SceneRecord> {
        self.ensure_record(scene, None)?;
        document::read_document(&self.record_path(scene)?)
    }

    /// Save a scene's record with the given type
    ///
    /// Identity, name and containing path are recomputed from the scene's
    /// current location. Emits `RecordChanged` once the write succeeded.
    pub fn write(&self, scene: &Path, type_tag: &str) -> Result<SceneRecord> {
        if type_tag.is_empty() {
            return Err(Error::InvalidInput("no scene type selected".to_string()));
        }
        let scene_path = self.existing_scene(scene)?;
        let record = self.write_record(&scene_path, type_tag)?;

        self.emit(SceneEvent::RecordChanged {
            scene: scene_path,
            scene_type: record.type_tag.clone(),
            timestamp: Utc::now(),
        });
        Ok(record)
    }

    /// Delete a scene's record; returns false if there was none
    pub fn delete_record(&self, scene: &Path) -> Result<bool> {
        let record_path = self.record_path(scene)?;
        let removed = document::remove_document(&record_path)?;
        if removed {
            info!(record = %record_path.display(), "Scene record deleted");
            self.emit(SceneEvent::RecordDeleted {
                record: record_path,
                timestamp: Utc::now(),
            });
        }
        Ok(removed)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Record describing the scene at its current location
    pub(crate) fn record_for(&self, scene_path: &Path, type_tag: &str) -> SceneRecord {
        let relative = paths::project_relative(&self.root, scene_path);
        SceneRecord {
            identity: self.identity.identity_for(&relative),
            name: paths::scene_name(scene_path).unwrap_or_default(),
            containing_path: paths::containing_path(&self.root, scene_path),
            type_tag: type_tag.to_string(),
        }
    }

    /// Unconditionally write a fresh record for `scene_path`
    pub(crate) fn write_record(&self, scene_path: &Path, type_tag: &str) -> Result<SceneRecord> {
        let record_path = self.record_path(scene_path)?;
        let record = self.record_for(scene_path, type_tag);
        document::write_document(&record_path, &record)?;
        debug!(record = %record_path.display(), type_tag, "Scene record saved");
        Ok(record)
    }

    /// Resolve `scene` and check it is an existing scene file
    pub(crate) fn existing_scene(&self, scene: &Path) -> Result<PathBuf> {
        let path = self.resolve(scene);
        if !self.is_scene(&path) {
            return Err(Error::InvalidInput(format!(
                "not a .{} scene: {}",
                self.config.scene_extension,
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(Error::NotFound(format!("scene {}", path.display())));
        }
        Ok(path)
    }

    pub(crate) fn is_scene(&self, path: &Path) -> bool {
        paths::is_scene_file(path, &self.config.scene_extension)
    }

    pub(crate) fn emit(&self, event: SceneEvent) {
        debug!(kind = event.kind(), "Emitting scene event");
        self.events.emit_lossy(event);
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
