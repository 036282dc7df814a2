//!
//! Principals and the external grant source.
//!
//! The engine never stores grants itself. A [`GrantSource`] supplies a principal's direct
//! grants, its group memberships and each group's grants; [`load_grants`] merges them.

use std::collections::HashMap;

use crate::config::NspConfig;
use crate::error::NspError;
use crate::namespace::Namespace;
use crate::types::{FlatGrants, PermissionMask, PrincipalId};

/// The subject of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    /// False for anonymous visitors, who receive the guest group's grants.
    pub authenticated: bool,
    /// Superusers pass every check without their grants being consulted.
    pub superuser: bool,
}

impl Principal {
    pub fn user(id: PrincipalId) -> Self {
        Principal { id, authenticated: true, superuser: false }
    }

    pub fn superuser(id: PrincipalId) -> Self {
        Principal { id, authenticated: true, superuser: true }
    }

    /// An unauthenticated principal. All guests share the nil id and thus one cache entry.
    pub fn guest() -> Self {
        Principal {
            id: PrincipalId(uuid::Uuid::nil()),
            authenticated: false,
            superuser: false,
        }
    }
}

/// Storage of raw user and group grants, implemented outside the engine.
pub trait GrantSource: Send + Sync {
    /// Grants attached directly to the principal.
    fn principal_grants(&self, principal: &PrincipalId) -> Result<FlatGrants, NspError>;

    /// Names of the groups the principal belongs to, in the order their grants are applied.
    fn groups_of(&self, principal: &PrincipalId) -> Result<Vec<String>, NspError>;

    /// Grants of a group, or `None` if no such group exists.
    fn group_grants(&self, group: &str) -> Result<Option<FlatGrants>, NspError>;
}

/// Loads the effective grants of `principal`.
///
/// Group grants are applied first, in membership order, then the principal's own grants,
/// so a direct grant overrides any group grant on the same namespace. Unauthenticated
/// principals get the grants of `config.guest_group`, or nothing if that group is missing.
/// Namespaces are normalised, so `A.b` and `a.b` collide.
///
/// # Errors
/// Source failures, and `NspError::InvalidNamespace` for a malformed stored namespace.
pub fn load_grants<S: GrantSource + ?Sized>(
    source: &S,
    principal: &Principal,
    config: &NspConfig,
) -> Result<FlatGrants, NspError> {
    let mut merged = FlatGrants::new();

    if !principal.authenticated {
        match source.group_grants(&config.guest_group)? {
            Some(grants) => apply_layer(&mut merged, grants)?,
            None => tracing::warn!(
                "Guest group '{}' not found, guest principal has no grants",
                config.guest_group
            ),
        }
        return Ok(merged);
    }

    for group in source.groups_of(&principal.id)? {
        if let Some(grants) = source.group_grants(&group)? {
            apply_layer(&mut merged, grants)?;
        }
    }
    apply_layer(&mut merged, source.principal_grants(&principal.id)?)?;

    tracing::debug!("Loaded {} grants for principal {}", merged.len(), principal.id);
    Ok(merged)
}

fn apply_layer(merged: &mut FlatGrants, layer: FlatGrants) -> Result<(), NspError> {
    for (ns, mask) in layer {
        let normalised = Namespace::parse(&ns)?;
        merged.insert(normalised.to_string(), mask);
    }
    Ok(())
}

/// A [`GrantSource`] backed by hash maps, for tests and embedded use.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrantSource {
    principals: HashMap<PrincipalId, FlatGrants>,
    memberships: HashMap<PrincipalId, Vec<String>>,
    groups: HashMap<String, FlatGrants>,
}

impl InMemoryGrantSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_principal(&mut self, id: PrincipalId, namespace: &str, mask: PermissionMask) -> &mut Self {
        self.principals.entry(id).or_default().insert(namespace.to_string(), mask);
        self
    }

    /// Creates the group if needed and adds a grant to it.
    pub fn grant_group(&mut self, group: &str, namespace: &str, mask: PermissionMask) -> &mut Self {
        self.groups.entry(group.to_string()).or_default().insert(namespace.to_string(), mask);
        self
    }

    /// Creates an empty group.
    pub fn add_group(&mut self, group: &str) -> &mut Self {
        self.groups.entry(group.to_string()).or_default();
        self
    }

    pub fn add_member(&mut self, id: PrincipalId, group: &str) -> &mut Self {
        let groups = self.memberships.entry(id).or_default();
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
        self
    }
}

impl GrantSource for InMemoryGrantSource {
    fn principal_grants(&self, principal: &PrincipalId) -> Result<FlatGrants, NspError> {
        Ok(self.principals.get(principal).cloned().unwrap_or_default())
    }

    fn groups_of(&self, principal: &PrincipalId) -> Result<Vec<String>, NspError> {
        Ok(self.memberships.get(principal).cloned().unwrap_or_default())
    }

    fn group_grants(&self, group: &str) -> Result<Option<FlatGrants>, NspError> {
        Ok(self.groups.get(group).cloned())
    }
}
