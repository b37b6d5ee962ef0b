//! Scene type registry
//!
//! The registry is the ordered set of type tags users can assign to scenes,
//! persisted as a JSON array (`["Level","UI","Test"]`). It is an explicit
//! service object: callers hold it (usually through `MetadataStore`) instead
//! of reaching for process-wide state.
//!
//! # Lifecycle
//! - `import()` loads (or seeds with `["Level"]`) and fully replaces memory
//! - every successful `add`/`remove` immediately persists the full set
//! - removing a type never touches records that reference it

use chrono::Utc;
use smgr_common::config::DEFAULT_SCENE_TYPE;
use smgr_common::{document, Error, EventBus, Result, SceneEvent};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn default_types() -> Vec<String> {
    vec![DEFAULT_SCENE_TYPE.to_string()]
}

/// Ordered, de-duplicated set of scene type tags
#[derive(Clone)]
pub struct TypeRegistry {
    path: PathBuf,
    types: Vec<String>,
    events: Option<EventBus>,
}

impl TypeRegistry {
    /// Create an unloaded registry bound to a document path
    ///
    /// Call [`TypeRegistry::import`] before use, or use [`TypeRegistry::open`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            types: Vec::new(),
            events: None,
        }
    }

    /// Create and import in one step
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut registry = Self::new(path);
        registry.import()?;
        Ok(registry)
    }

    /// Emit `TypesChanged` on the given bus after each mutation
    pub fn set_event_bus(&mut self, events: EventBus) {
        self.events = Some(events);
    }

    /// Registry document path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload from disk, replacing the in-memory set
    ///
    /// A missing or corrupt document is regenerated as `["Level"]`. Duplicate
    /// and blank entries in the file are dropped (first occurrence wins). An
    /// empty list is re-seeded so the registry is never empty after import.
    pub fn import(&mut self) -> Result<()> {
        let loaded: Vec<String> = document::load_or_default(&self.path, default_types)?;
        let loaded_len = loaded.len();

        self.types.clear();
        for scene_type in loaded {
            if scene_type.trim().is_empty() || self.types.contains(&scene_type) {
                continue;
            }
            self.types.push(scene_type);
        }

        if self.types.is_empty() {
            warn!(path = %self.path.display(), "Type registry was empty, seeding default");
            self.types = default_types();
            self.export()?;
        } else if self.types.len() != loaded_len {
            debug!(
                path = %self.path.display(),
                dropped = loaded_len - self.types.len(),
                "Dropped duplicate scene types on import"
            );
        }

        debug!(count = self.types.len(), "Scene types imported");
        Ok(())
    }

    /// Persist the in-memory set (atomic replace)
    pub fn export(&self) -> Result<()> {
        document::write_document(&self.path, &self.types)
    }

    /// Add a type; returns false if it was already present
    ///
    /// Empty and whitespace-only names are rejected.
    pub fn add(&mut self, scene_type: &str) -> Result<bool> {
        if scene_type.trim().is_empty() {
            return Err(Error::InvalidInput("scene type name is empty".to_string()));
        }
        if self.contains(scene_type) {
            return Ok(false);
        }

        self.types.push(scene_type.to_string());
        if let Err(e) = self.export() {
            self.types.pop();
            return Err(e);
        }

        info!(scene_type, "Scene type added");
        self.notify();
        Ok(true)
    }

    /// Remove a type; returns false if it was absent
    ///
    /// Records still tagged with the type keep it (stale references are
    /// allowed). The last remaining type cannot be removed.
    pub fn remove(&mut self, scene_type: &str) -> Result<bool> {
        let Some(index) = self.index_of(scene_type) else {
            return Ok(false);
        };
        if self.types.len() == 1 {
            return Err(Error::InvalidInput(format!(
                "cannot remove the last scene type '{scene_type}'"
            )));
        }

        let removed = self.types.remove(index);
        if let Err(e) = self.export() {
            self.types.insert(index, removed);
            return Err(e);
        }

        info!(scene_type, "Scene type removed");
        self.notify();
        Ok(true)
    }

    /// Case-sensitive membership test
    pub fn contains(&self, scene_type: &str) -> bool {
        self.types.iter().any(|t| t == scene_type)
    }

    /// Position of a type in insertion order
    pub fn index_of(&self, scene_type: &str) -> Option<usize> {
        self.types.iter().position(|t| t == scene_type)
    }

    /// Type at `index`, or `""` when out of range
    pub fn by_index(&self, index: usize) -> &str {
        self.types.get(index).map(String::as_str).unwrap_or("")
    }

    /// Type used when a caller does not pick one: the first registered type
    pub fn default_type(&self) -> &str {
        self.types
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_SCENE_TYPE)
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn notify(&self) {
        if let Some(events) = &self.events {
            events.emit_lossy(SceneEvent::TypesChanged {
                types: self.types.clone(),
                timestamp: Utc::now(),
            });
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("path", &self.path)
            .field("types", &self.types)
            .finish()
    }
}
