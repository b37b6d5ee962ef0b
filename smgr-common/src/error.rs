//! Common error types for the scene metadata store

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for scene manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the store and its hosts
///
/// Corrupt or missing documents never surface here: they are regenerated
/// by [`crate::document::ensure_valid_document`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error outside of the self-healing read path
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested scene, record or template not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input (empty name, unknown type, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Target file already exists
    #[error("Already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Filesystem watcher setup or delivery error
    #[error("Watcher error: {0}")]
    Watcher(String),
}

impl Error {
    /// True for errors caused by caller input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::AlreadyExists(_) | Error::NotFound(_)
        )
    }
}
