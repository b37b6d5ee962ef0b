//! Reconciliation of records against the live asset tree
//!
//! Scene files are renamed, moved and deleted outside the store's control.
//! This module reacts to those changes:
//! - `on_asset_moved` relocates a record after its scene moved
//! - `on_asset_deleted` drops the record of a deleted scene
//! - `reconcile_orphans` is the full scan run on explicit refresh
//!
//! All three are idempotent and treat files that vanish mid-operation as
//! already handled.

use crate::record::SceneRecord;
use crate::store::MetadataStore;
use chrono::Utc;
use smgr_common::{document, paths, Result, SceneEvent};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use serde_json::Value;
use walkdir::WalkDir;

/// On-disk field names of a record
const RECORD_FIELDS: [&str; 4] = ["guid", "name", "path", "type"];

/// Low-level asset change reported by an observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetEvent {
    /// A file was moved and/or renamed
    Moved { from: PathBuf, to: PathBuf },
    /// A file was deleted
    Deleted(PathBuf),
    /// The observer lost track; a full reconciliation is needed
    Rescan,
}

/// Result of [`MetadataStore::on_asset_moved`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The record was moved from `from` to `to`
    Relocated { from: PathBuf, to: PathBuf },
    /// Destination is not a scene file; nothing to do
    NotAScene,
    /// No record at the source (never created, or already relocated)
    NoSourceRecord,
    /// A record already exists at the destination; left untouched
    DestinationExists,
}

/// Summary of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Record documents examined, corrupt ones included
    pub scanned: usize,
    /// Orphaned records that were deleted
    pub removed: Vec<PathBuf>,
    /// Record-named files holding unrelated JSON, left alone
    pub skipped: usize,
}

/// True if a record-named file holds (or once held) a record
///
/// Valid records, empty files, unparsable content and objects carrying
/// record fields all qualify. Well-formed JSON of any other shape belongs
/// to someone else.
fn is_record_document(path: &Path) -> bool {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::InvalidData => return true,
        Err(e) => {
            debug!(path = %path.display(), "Unreadable during reconcile: {}", e);
            return false;
        }
    };
    if content.trim().is_empty() || serde_json::from_str::<SceneRecord>(&content).is_ok() {
        return true;
    }
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(fields)) => RECORD_FIELDS.iter().any(|f| fields.contains_key(*f)),
        Ok(_) => false,
        Err(_) => true,
    }
}

impl MetadataStore {
    /// Delete every record whose scene file no longer exists
    ///
    /// Walks the whole assets directory. A `.<name>.json` file is an orphan
    /// when no file named `<name>` with the scene extension (any ASCII case)
    /// sits next to it. Corrupt records count as records; the registry
    /// document and dot-files holding other JSON data are never removed.
    pub fn reconcile_orphans(&self) -> Result<ReconcileReport> {
        let assets_root = self.assets_root();
        let registry_file = self.registry().path().to_path_buf();
        let mut report = ReconcileReport::default();

        if !assets_root.is_dir() {
            debug!(assets = %assets_root.display(), "Assets directory missing, nothing to reconcile");
            return Ok(report);
        }

        for entry in WalkDir::new(&assets_root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let record_path = entry.path();
            if record_path == registry_file.as_path() {
                continue;
            }
            let Some(name) = paths::scene_name_from_record(record_path) else {
                continue;
            };
            if !is_record_document(record_path) {
                report.skipped += 1;
                continue;
            }
            report.scanned += 1;

            if self.scene_exists(record_path, &name) {
                continue;
            }

            match document::remove_document(record_path) {
                Ok(true) => {
                    debug!(record = %record_path.display(), "Removed orphaned record");
                    report.removed.push(record_path.to_path_buf());
                }
                Ok(false) => {}
                Err(e) => warn!("Failed to remove {}: {}", record_path.display(), e),
            }
        }

        info!(
            scanned = report.scanned,
            removed = report.removed.len(),
            skipped = report.skipped,
            "Record reconciliation complete"
        );

        if !report.removed.is_empty() {
            self.emit(SceneEvent::RecordsPurged {
                records: report.removed.clone(),
                timestamp: Utc::now(),
            });
        }
        Ok(report)
    }

    /// Follow a scene move/rename with its record
    ///
    /// The record is moved from the source directory to the destination
    /// directory and renamed after the new scene name. Its `name` and `path`
    /// fields are refreshed; identity and type are kept. Calling this again
    /// for the same move is a no-op.
    pub fn on_asset_moved(&self, source: &Path, destination: &Path) -> Result<MoveOutcome> {
        let from = self.resolve(source);
        let to = self.resolve(destination);

        if !self.is_scene(&to) {
            return Ok(MoveOutcome::NotAScene);
        }

        let source_record = self.record_path(&from)?;
        let destination_record = self.record_path(&to)?;

        if !source_record.exists() {
            debug!(record = %source_record.display(), "No record to relocate");
            return Ok(MoveOutcome::NoSourceRecord);
        }
        if destination_record.exists() {
            debug!(record = %destination_record.display(), "Destination record exists, not relocating");
            return Ok(MoveOutcome::DestinationExists);
        }

        if let Some(parent) = destination_record.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::rename(&source_record, &destination_record) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MoveOutcome::NoSourceRecord),
            Err(e) => return Err(e.into()),
        }

        self.refresh_location(&destination_record, &to);

        info!(
            from = %source_record.display(),
            to = %destination_record.display(),
            "Scene record relocated"
        );
        self.emit(SceneEvent::RecordRelocated {
            from: source_record.clone(),
            to: destination_record.clone(),
            timestamp: Utc::now(),
        });
        Ok(MoveOutcome::Relocated {
            from: source_record,
            to: destination_record,
        })
    }

    /// Drop the record of a deleted scene; returns true if one was removed
    ///
    /// Ignored when the path is not a scene or the scene still exists.
    pub fn on_asset_deleted(&self, path: &Path) -> Result<bool> {
        let scene = self.resolve(path);
        if !self.is_scene(&scene) || scene.exists() {
            return Ok(false);
        }

        let record_path = self.record_path(&scene)?;
        let removed = document::remove_document(&record_path)?;
        if removed {
            info!(record = %record_path.display(), "Removed record of deleted scene");
            self.emit(SceneEvent::RecordsPurged {
                records: vec![record_path],
                timestamp: Utc::now(),
            });
        }
        Ok(removed)
    }

    /// Dispatch an observer event
    pub fn handle(&self, event: &AssetEvent) -> Result<()> {
        match event {
            AssetEvent::Moved { from, to } => {
                self.on_asset_moved(from, to)?;
            }
            AssetEvent::Deleted(path) => {
                self.on_asset_deleted(path)?;
            }
            AssetEvent::Rescan => {
                self.reconcile_orphans()?;
            }
        }
        Ok(())
    }

    /// True if the directory of `record_path` holds the scene `name`
    ///
    /// Matches the extension the same way scene detection does, so
    /// `Boss.UNITY` owns `.Boss.json`.
    fn scene_exists(&self, record_path: &Path, name: &str) -> bool {
        let exact = paths::scene_path_for_record(record_path, &self.config().scene_extension);
        if exact.is_some_and(|scene| scene.is_file()) {
            return true;
        }

        let dir = record_path.parent().unwrap_or_else(|| Path::new(""));
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                // Cannot prove the scene is gone
                warn!("Failed to list {}: {}", dir.display(), e);
                return true;
            }
        };
        entries.filter_map(|e| e.ok()).any(|entry| {
            let path = entry.path();
            path.file_stem().is_some_and(|stem| stem == name)
                && self.is_scene(&path)
                && path.is_file()
        })
    }

    /// Rewrite `name`/`path` of a relocated record; identity and type stay
    ///
    /// An unparsable record is left as is and repaired on its next read.
    fn refresh_location(&self, record_path: &Path, scene_path: &Path) {
        let mut record = match document::read_document::<SceneRecord>(record_path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Relocated record {} unreadable: {}", record_path.display(), e);
                return;
            }
        };

        record.name = paths::scene_name(scene_path).unwrap_or_default();
        record.containing_path = paths::containing_path(self.root(), scene_path);
        if let Err(e) = document::write_document(record_path, &record) {
            warn!("Failed to refresh {}: {}", record_path.display(), e);
        }
    }
}
