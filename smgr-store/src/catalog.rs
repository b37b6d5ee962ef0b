//! Scene catalog: every scene in the project, grouped for browsing
//!
//! Grouping by type yields `Level/Main`-style menu trees; grouping by folder
//! yields `Assets/Scenes/Main`. Listing reads each scene's record, so scenes
//! without one get a default record on the way.

use crate::record::SceneRecord;
use crate::store::MetadataStore;
use smgr_common::{paths, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// How catalog entries are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    #[default]
    ByType,
    ByFolder,
}

/// One scene with its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub scene: PathBuf,
    pub record: SceneRecord,
}

/// Scenes grouped by type tag or containing folder, sorted by group then name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub grouping: Grouping,
    pub groups: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Catalog {
    /// Total number of scenes
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Flat menu paths, e.g. `Level/Main` or `Assets/Scenes/Main`
    pub fn menu_paths(&self) -> Vec<String> {
        let mut menu = Vec::with_capacity(self.len());
        for (group, entries) in &self.groups {
            for entry in entries {
                menu.push(match self.grouping {
                    Grouping::ByType => format!("{}/{}", group, entry.record.name),
                    // Folder keys already end with '/'
                    Grouping::ByFolder => format!("{}{}", group, entry.record.name),
                });
            }
        }
        menu
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
}

impl MetadataStore {
    /// All scene files under the assets directory, sorted
    ///
    /// Hidden files and directories are skipped.
    pub fn list_scenes(&self) -> Result<Vec<PathBuf>> {
        let assets_root = self.assets_root();
        if !assets_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut scenes = Vec::new();
        let walker = WalkDir::new(&assets_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_scene(entry.path()) {
                        scenes.push(entry.into_path());
                    }
                }
                Err(e) => warn!("Error accessing entry: {}", e),
            }
        }

        scenes.sort();
        debug!(count = scenes.len(), "Scenes discovered");
        Ok(scenes)
    }

    /// Build the catalog, creating missing records with the default type
    ///
    /// A scene whose record cannot be read (I/O failure) is logged and left
    /// out rather than failing the whole listing.
    pub fn catalog(&self, grouping: Grouping) -> Result<Catalog> {
        let mut groups: BTreeMap<String, Vec<CatalogEntry>> = BTreeMap::new();

        for scene in self.list_scenes()? {
            let record = match self.read(&scene) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping {}: {}", scene.display(), e);
                    continue;
                }
            };

            let key = match grouping {
                Grouping::ByType => record.type_tag.clone(),
                Grouping::ByFolder => paths::containing_path(self.root(), &scene),
            };
            groups.entry(key).or_default().push(CatalogEntry { scene, record });
        }

        for entries in groups.values_mut() {
            entries.sort_by(|a, b| a.record.name.cmp(&b.record.name).then(a.scene.cmp(&b.scene)));
        }

        Ok(Catalog { grouping, groups })
    }
}
