//! # Scene Manager Common Library
//!
//! Shared code for the scene metadata store and its hosts:
//! - Error type and result alias
//! - Project configuration loading and root resolution
//! - Event types (SceneEvent) and the EventBus
//! - JSON document read/repair/atomic-write helpers
//! - Record path derivation for co-located side-car documents

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod paths;

pub use document::DocumentStatus;
pub use error::{Error, Result};
pub use events::{EventBus, SceneEvent};
