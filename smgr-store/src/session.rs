//! Edit session for a single scene record
//!
//! Mirrors how an inspector panel edits a record:
//!
//! ```text
//! Viewing --begin_edit--> Editing --save----> Viewing (record written)
//!                                 \-discard-> Viewing (type reset from disk)
//! ```
//!
//! Nothing is written while editing; `save` is the only write.

use crate::record::SceneRecord;
use crate::registry::TypeRegistry;
use crate::store::MetadataStore;
use chrono::Utc;
use smgr_common::{Error, Result, SceneEvent};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
}

/// In-memory view of one record with a pending type edit
#[derive(Debug, Clone)]
pub struct EditSession {
    scene: PathBuf,
    record: SceneRecord,
    scene_type: String,
    mode: EditMode,
}

impl EditSession {
    /// Load a scene's record (creating it if needed) in viewing mode
    pub fn open(store: &MetadataStore, scene: &Path) -> Result<Self> {
        let record = store.read(scene)?;
        Ok(Self {
            scene: store.resolve(scene),
            scene_type: record.type_tag.clone(),
            record,
            mode: EditMode::Viewing,
        })
    }

    pub fn scene(&self) -> &Path {
        &self.scene
    }

    /// Last persisted record
    pub fn record(&self) -> &SceneRecord {
        &self.record
    }

    /// Type currently shown (pending while editing)
    pub fn scene_type(&self) -> &str {
        &self.scene_type
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Enter edit mode
    ///
    /// Re-imports the registry so the picker shows types added elsewhere,
    /// then emits `EditStarted`. No-op when already editing.
    pub fn begin_edit(&mut self, store: &mut MetadataStore) -> Result<()> {
        if self.mode == EditMode::Editing {
            return Ok(());
        }
        store.registry_mut().import()?;
        self.mode = EditMode::Editing;
        store.emit(SceneEvent::EditStarted {
            scene: self.scene.clone(),
            timestamp: Utc::now(),
        });
        debug!(scene = %self.scene.display(), "Edit started");
        Ok(())
    }

    /// Change the pending type
    pub fn set_type(&mut self, scene_type: &str) -> Result<()> {
        self.require_editing()?;
        self.scene_type = scene_type.to_string();
        Ok(())
    }

    /// Pick the pending type by registry position
    ///
    /// An out-of-range index selects nothing (empty type), which `save`
    /// rejects.
    pub fn select_index(&mut self, registry: &TypeRegistry, index: usize) -> Result<()> {
        self.require_editing()?;
        self.scene_type = registry.by_index(index).to_string();
        Ok(())
    }

    /// Persist the pending type and return to viewing mode
    pub fn save(&mut self, store: &MetadataStore) -> Result<&SceneRecord> {
        self.require_editing()?;
        self.record = store.write(&self.scene, &self.scene_type)?;
        self.mode = EditMode::Viewing;
        Ok(&self.record)
    }

    /// Drop the pending edit, reloading the record from disk
    pub fn discard(&mut self, store: &MetadataStore) -> Result<()> {
        self.record = store.read(&self.scene)?;
        self.scene_type = self.record.type_tag.clone();
        self.mode = EditMode::Viewing;
        Ok(())
    }

    fn require_editing(&self) -> Result<()> {
        if self.mode == EditMode::Editing {
            Ok(())
        } else {
            Err(Error::InvalidInput("record is not in edit mode".to_string()))
        }
    }
}
