//! Record path derivation
//!
//! Records are co-located with their scene: `Assets/Scenes/Main.unity` owns
//! `Assets/Scenes/.Main.json`. Everything here is pure path arithmetic and
//! never touches the filesystem.

use std::path::{Component, Path, PathBuf};

const RECORD_PREFIX: &str = ".";
const RECORD_SUFFIX: &str = ".json";

/// Record file name for a scene base name: `Main` -> `.Main.json`
pub fn record_file_name(scene_name: &str) -> String {
    format!("{RECORD_PREFIX}{scene_name}{RECORD_SUFFIX}")
}

/// Scene base name (file stem) of a scene path
pub fn scene_name(scene_path: &Path) -> Option<String> {
    scene_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Expected record path for a scene path
///
/// Returns None when the path has no usable file stem.
pub fn record_path_for(scene_path: &Path) -> Option<PathBuf> {
    let name = scene_name(scene_path)?;
    let dir = scene_path.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(record_file_name(&name)))
}

/// Scene base name a record file claims to describe
///
/// `.Main.json` -> `Main`. Returns None for anything not shaped like a
/// record file name.
pub fn scene_name_from_record(record_path: &Path) -> Option<String> {
    let file_name = record_path.file_name()?.to_str()?;
    let name = file_name
        .strip_prefix(RECORD_PREFIX)?
        .strip_suffix(RECORD_SUFFIX)?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Scene file a record belongs to, given the scene extension
pub fn scene_path_for_record(record_path: &Path, scene_extension: &str) -> Option<PathBuf> {
    let name = scene_name_from_record(record_path)?;
    let dir = record_path.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(format!("{name}.{scene_extension}")))
}

/// True if `path` has the scene extension (ASCII case-insensitive)
pub fn is_scene_file(path: &Path, scene_extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(scene_extension))
        .unwrap_or(false)
}

/// Project-relative, `/`-separated form of `path`
///
/// Paths outside `root` are rendered as given.
pub fn project_relative(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Project-relative directory of a scene, with a trailing `/`
///
/// `Assets/Scenes/Main.unity` -> `Assets/Scenes/`. A scene at the project
/// root yields an empty string.
pub fn containing_path(root: &Path, scene_path: &Path) -> String {
    let dir = scene_path.parent().unwrap_or_else(|| Path::new(""));
    let relative = project_relative(root, dir);
    if relative.is_empty() {
        relative
    } else {
        format!("{relative}/")
    }
}
