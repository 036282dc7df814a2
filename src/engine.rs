//!
//! The engine facade tying configuration, grant loading, caching, checks and filtering together.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::{PermissionCache, PermissionSet};
use crate::config::NspConfig;
use crate::error::NspError;
use crate::filter::{self, Ruleset};
use crate::grants::{load_grants, GrantSource, Principal};
use crate::namespace::Namespace;
use crate::resource::{DottedConvention, NamespaceConvention, Target};
use crate::rights::Mode;
use crate::tree::NamespaceTree;
use crate::types::PermissionMask;

/// Flags modifying how a check resolves its namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Only an exact grant on the full path counts; no inheritance from ancestors.
    pub explicit: bool,
    /// Also pass if any grant lies below, or wildcard-matches, the namespace.
    pub ambiguous: bool,
}

impl CheckOptions {
    pub fn explicit() -> Self {
        CheckOptions { explicit: true, ambiguous: false }
    }

    pub fn ambiguous() -> Self {
        CheckOptions { explicit: false, ambiguous: true }
    }
}

/// Checks `namespace` against `tree` with the given options.
///
/// `ambiguous` takes precedence over `explicit`.
pub fn check_tree(tree: &NamespaceTree, namespace: &Namespace, level: PermissionMask, opts: CheckOptions) -> bool {
    if opts.ambiguous {
        tree.check_ambiguous(namespace, level)
    } else {
        tree.check(namespace, level, opts.explicit)
    }
}

/// Permission engine over a [`GrantSource`].
///
/// One engine is created per process; its mode and guest group are fixed at construction.
pub struct Engine<S: GrantSource> {
    config: NspConfig,
    source: S,
    cache: PermissionCache,
    convention: Box<dyn NamespaceConvention>,
}

impl<S: GrantSource> Engine<S> {
    /// Creates an engine naming convention-hooked resources with [`DottedConvention`].
    pub fn new(config: NspConfig, source: S) -> Self {
        Self::with_convention(config, source, DottedConvention)
    }

    pub fn with_convention<C>(config: NspConfig, source: S, convention: C) -> Self
    where
        C: NamespaceConvention + 'static,
    {
        tracing::debug!("Creating permission engine in {:?} mode", config.mode);
        Engine {
            config,
            source,
            cache: PermissionCache::new(),
            convention: Box::new(convention),
        }
    }

    pub fn config(&self) -> &NspConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Maps an operation name onto the flag it requires in the engine's mode.
    pub fn permission_flag_for(&self, op: &str) -> Result<PermissionMask, NspError> {
        self.config.mode.permission_flag_for(op)
    }

    /// The principal's cached permission set, loading it from the grant source on first use.
    pub fn permissions(&self, principal: &Principal) -> Result<Arc<PermissionSet>, NspError> {
        self.cache
            .get_or_load(principal.id, || load_grants(&self.source, principal, &self.config))
    }

    /// Drops the principal's cached set and loads it again.
    pub fn reload(&self, principal: &Principal) -> Result<Arc<PermissionSet>, NspError> {
        self.cache.invalidate(&principal.id);
        self.permissions(principal)
    }

    /// Checks whether `principal` holds at least `level` on `target`.
    ///
    /// Superusers pass without their target being resolved or their grants loaded.
    ///
    /// # Errors
    /// - `NspError::InvalidNamespace` / `NspError::Usage` if the target cannot be resolved.
    /// - Grant source failures on a cache miss.
    pub fn check(
        &self,
        principal: &Principal,
        target: &Target<'_>,
        level: PermissionMask,
        opts: CheckOptions,
    ) -> Result<bool, NspError> {
        if principal.superuser {
            tracing::trace!("Superuser {} bypasses check on {:?}", principal.id, target);
            return Ok(true);
        }
        let namespace = target.namespace(self.convention.as_ref())?;
        let perms = self.permissions(principal)?;
        let allowed = check_tree(perms.tree(), &namespace, level, opts);
        tracing::trace!(
            "Check {} on '{}' for {}: {}",
            level,
            namespace,
            principal.id,
            if allowed { "allowed" } else { "denied" }
        );
        Ok(allowed)
    }

    /// Like [`Engine::check`] but with the level given as an operation name.
    pub fn check_op(
        &self,
        principal: &Principal,
        target: &Target<'_>,
        op: &str,
        opts: CheckOptions,
    ) -> Result<bool, NspError> {
        let level = self.permission_flag_for(op)?;
        self.check(principal, target, level, opts)
    }

    /// Filters `data` to what `principal` may see. Superusers receive an unfiltered copy.
    pub fn filter(&self, principal: &Principal, data: &Value, ruleset: Option<&Ruleset>) -> Result<Value, NspError> {
        if principal.superuser {
            tracing::trace!("Superuser {} receives unfiltered data", principal.id);
            return Ok(data.clone());
        }
        let perms = self.permissions(principal)?;
        filter::filter(data, perms.tree(), ruleset)
    }
}

impl<S: GrantSource + std::fmt::Debug> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("source", &self.source)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
