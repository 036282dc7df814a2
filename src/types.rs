//!
//! Shared types used across the tree, filter and engine modules.

use std::collections::BTreeMap;

/// PermissionMask, a 32-bit field of permission flags.
/// The interpretation of its bits depends on the configured [`crate::rights::Mode`]:
/// - Bits 0-1: `READ`, `WRITE` (`UPDATE` in crud mode).
/// - Bits 2-3: `CREATE`, `DELETE` (crud mode only).
/// - Bits 4-31: unused by the engine but preserved and matched like any other bit.
pub type PermissionMask = u32;

/// A flat mapping of namespace string to permission mask, as produced by a grant source.
///
/// A `BTreeMap` keeps iteration deterministic, which keeps tree builds and logs stable.
pub type FlatGrants = BTreeMap<String, PermissionMask>;

/// Identity of a principal, used as the cache key for its permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct PrincipalId(pub uuid::Uuid);

impl PrincipalId {
    /// Generates a fresh random identity.
    pub fn new_v4() -> Self {
        PrincipalId(uuid::Uuid::new_v4())
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PrincipalId {
    fn from(id: uuid::Uuid) -> Self {
        PrincipalId(id)
    }
}
