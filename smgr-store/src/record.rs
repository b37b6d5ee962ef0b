//! Per-scene metadata record

use serde::{Deserialize, Serialize};

/// Metadata document stored next to each scene as `.<name>.json`
///
/// On disk: `{"guid":"…","name":"…","path":"…","type":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Opaque scene identity
    #[serde(rename = "guid")]
    pub identity: String,
    /// Scene file base name
    pub name: String,
    /// Project-relative containing directory, with trailing `/`
    #[serde(rename = "path")]
    pub containing_path: String,
    /// Scene type tag; may reference a type no longer in the registry
    #[serde(rename = "type")]
    pub type_tag: String,
}
