#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! nsperms is a hierarchical namespace permission engine.
//!
//! Grants map dot-separated namespaces such as `org.42.members` to permission bitmasks.
//! They are compiled into a [`NamespaceTree`] that answers access checks with ancestor
//! inheritance and `*` wildcards, and that prunes nested JSON data down to what a
//! principal may see.

// Module for shared data types (PermissionMask, FlatGrants, PrincipalId).
pub mod types;

// Module for permission flags and the rw/crud operating mode.
pub mod rights;

// Module for namespace parsing and normalisation.
pub mod namespace;

// Module for the grant tree and resolver.
pub mod tree;

// Module for permission-based data filtering.
pub mod filter;

// Module for principals and grant sources.
pub mod grants;

// Module for the per-principal permission cache.
pub mod cache;

// Module for engine configuration.
pub mod config;

// Module for resource-to-namespace mapping.
pub mod resource;

// Module for the engine facade.
pub mod engine;

// Module for error types.
pub mod error;

#[cfg(feature = "test-utils")]
pub mod test_support;

pub use cache::{PermissionCache, PermissionSet};
pub use config::NspConfig;
pub use engine::{check_tree, CheckOptions, Engine};
pub use error::{ConfigError, NspError};
pub use filter::{filter, ListHandler, Ruleset};
pub use grants::{load_grants, GrantSource, InMemoryGrantSource, Principal};
pub use namespace::Namespace;
pub use resource::{DottedConvention, NamespaceConvention, NamespaceHook, Resource, ResourceParts, Target};
pub use rights::{flags, Mode};
pub use tree::{NamespaceTree, Node};
pub use types::{FlatGrants, PermissionMask, PrincipalId};
