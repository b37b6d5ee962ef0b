//! # Scene Metadata Store
//!
//! Keeps a small JSON side-car record (`.<name>.json`) next to every scene
//! file of a project and a registry of the type tags those records may
//! carry. Records follow their scenes through moves and renames, and
//! orphaned records are cleaned up by reconciliation.
//!
//! **Components:**
//! - [`TypeRegistry`]: ordered, persisted set of scene type tags
//! - [`MetadataStore`]: record create/read/write/delete, scene creation,
//!   catalog listing and reconciliation
//! - [`EditSession`]: view/edit/save state for a single record
//! - [`SceneWatcher`]: filesystem observer feeding [`AssetEvent`]s

pub mod catalog;
pub mod identity;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod scenes;
pub mod session;
pub mod store;
pub mod watcher;

pub use catalog::{Catalog, CatalogEntry, Grouping};
pub use identity::{IdentitySource, PathIdentity};
pub use reconcile::{AssetEvent, MoveOutcome, ReconcileReport};
pub use record::SceneRecord;
pub use registry::TypeRegistry;
pub use scenes::{FileSceneFactory, NewScene, SceneFactory};
pub use session::{EditMode, EditSession};
pub use store::MetadataStore;
pub use watcher::{EventTranslator, SceneWatcher};
