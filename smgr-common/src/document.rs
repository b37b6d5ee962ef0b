//! JSON document helpers
//!
//! Every document the store owns (the type registry and the per-scene
//! records) goes through these helpers:
//! - `ensure_valid_document` guarantees a parseable file, regenerating it
//!   from a default when it is missing, empty or corrupt
//! - `write_document` writes atomically (temp file + rename)
//!
//! Documents are compact single-line JSON.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of [`ensure_valid_document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// File existed and parsed; left untouched
    Valid,
    /// File was missing and has been created from the default
    Created,
    /// File was empty or unparsable and has been overwritten with the default
    Repaired,
}

impl DocumentStatus {
    /// True if the document was (re)written by the call
    pub fn was_written(self) -> bool {
        !matches!(self, DocumentStatus::Valid)
    }
}

/// Guarantee that `path` exists and parses as `T`
///
/// Parse failures are a recoverable condition, not an error: the file is
/// overwritten with `default()`. Only I/O failures are returned.
pub fn ensure_valid_document<T, F>(path: &Path, default: F) -> Result<DocumentStatus>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            write_document(path, &default())?;
            debug!(path = %path.display(), "Created missing document");
            return Ok(DocumentStatus::Created);
        }
        // Not UTF-8: same treatment as any other unparsable content
        Err(e) if e.kind() == ErrorKind::InvalidData => String::new(),
        Err(e) => return Err(e.into()),
    };

    if !content.trim().is_empty() && serde_json::from_str::<T>(&content).is_ok() {
        return Ok(DocumentStatus::Valid);
    }

    warn!(path = %path.display(), "Document empty or unparsable, regenerating default");
    write_document(path, &default())?;
    Ok(DocumentStatus::Repaired)
}

/// Read and parse a document
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Ensure `path` is valid, then read it
pub fn load_or_default<T, F>(path: &Path, default: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    ensure_valid_document(path, default)?;
    read_document(path)
}

/// Serialize `value` and atomically replace `path`
///
/// Writes `<path>.tmp` first, then renames it over the target so readers
/// never observe a missing or half-written document. Parent directories
/// are created as needed.
pub fn write_document<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp = temp_path(path)?;
    fs::write(&temp, json)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}

/// Remove a document, treating "already gone" as success
///
/// Returns true if a file was actually removed.
pub fn remove_document(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Sibling temp file used by atomic writes: `<file name>.tmp`
pub fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("not a file path: {}", path.display())))?;
    let mut name = OsString::from(file_name);
    name.push(".tmp");
    Ok(path.with_file_name(name))
}
