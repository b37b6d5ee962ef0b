//! Scene identity
//!
//! A record's `guid` is derived from the scene's project-relative path. Hosts
//! with their own asset database (and move-stable ids) plug in their own
//! [`IdentitySource`].

use uuid::Uuid;

/// Produces the opaque identity string stored in a record
pub trait IdentitySource: Send + Sync {
    /// Identity for a scene at `relative_path` (project-relative, `/`-separated)
    fn identity_for(&self, relative_path: &str) -> String;
}

/// Namespace for path-derived scene identities
const SCENE_NAMESPACE: Uuid = Uuid::from_u128(0x5c3e_7a41_d2b8_4f06_9e1c_83a0_4b6f_d217);

/// Deterministic identity: UUIDv5 of the project-relative path, rendered as
/// 32 lowercase hex digits (the engine's GUID text form)
#[derive(Debug, Clone, Copy, Default)]
pub struct PathIdentity;

impl IdentitySource for PathIdentity {
    fn identity_for(&self, relative_path: &str) -> String {
        Uuid::new_v5(&SCENE_NAMESPACE, relative_path.as_bytes())
            .simple()
            .to_string()
    }
}
