//! Per-principal permission sets and the cache that memoizes them.
//!
//! The cache is owned by the caller (usually through [`crate::engine::Engine`]) and keyed by
//! principal identity. Nothing invalidates it automatically: whoever changes a principal's
//! grants calls [`PermissionCache::invalidate`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::NspError;
use crate::tree::NamespaceTree;
use crate::types::{FlatGrants, PrincipalId};

/// A principal's effective grants together with the tree built from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    grants: FlatGrants,
    tree: NamespaceTree,
}

impl PermissionSet {
    /// # Errors
    /// `NspError::InvalidNamespace` if any grant namespace is malformed.
    pub fn new(grants: FlatGrants) -> Result<Self, NspError> {
        let tree = NamespaceTree::build(grants.iter().map(|(ns, mask)| (ns.as_str(), *mask)))?;
        Ok(PermissionSet { grants, tree })
    }

    pub fn grants(&self) -> &FlatGrants {
        &self.grants
    }

    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }
}

/// Memoizes [`PermissionSet`]s by principal.
#[derive(Debug, Default)]
pub struct PermissionCache {
    entries: RwLock<HashMap<PrincipalId, Arc<PermissionSet>>>,
}

impl PermissionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &PrincipalId) -> Option<Arc<PermissionSet>> {
        self.entries.read().get(id).cloned()
    }

    /// Returns the cached set for `id`, or loads, builds and caches it.
    ///
    /// `load` runs without holding the lock. If two callers race, the first set inserted wins
    /// and both receive it.
    pub fn get_or_load<F>(&self, id: PrincipalId, load: F) -> Result<Arc<PermissionSet>, NspError>
    where
        F: FnOnce() -> Result<FlatGrants, NspError>,
    {
        if let Some(hit) = self.get(&id) {
            tracing::trace!("Permission cache hit for {}", id);
            return Ok(hit);
        }
        tracing::debug!("Permission cache miss for {}, loading grants", id);
        let set = Arc::new(PermissionSet::new(load()?)?);
        let mut entries = self.entries.write();
        Ok(entries.entry(id).or_insert(set).clone())
    }

    /// Replaces any cached set for `id`.
    pub fn insert(&self, id: PrincipalId, set: PermissionSet) -> Arc<PermissionSet> {
        let set = Arc::new(set);
        self.entries.write().insert(id, Arc::clone(&set));
        set
    }

    /// Drops the cached set for `id`, forcing the next lookup to rebuild it.
    /// Returns true if an entry was removed.
    pub fn invalidate(&self, id: &PrincipalId) -> bool {
        let removed = self.entries.write().remove(id).is_some();
        if removed {
            tracing::debug!("Invalidated cached permissions for {}", id);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
