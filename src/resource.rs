//!
//! Mapping resource references to namespaces.
//!
//! A resource tells the engine how it wants to be named through a [`NamespaceHook`]:
//! an explicit namespace, a class-level base/create namespace, or parts handed to a
//! pluggable [`NamespaceConvention`]. The engine never hardcodes a naming scheme beyond the
//! [`DottedConvention`] default.

use crate::error::NspError;
use crate::namespace::Namespace;

/// Inputs for a naming convention, e.g. `("crm", "contact", Some("42"))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceParts<'a> {
    /// The application or container the type lives in.
    pub container: &'a str,
    /// The type of resource.
    pub kind: &'a str,
    /// Instance identifier; `None` for type-level references.
    pub id: Option<&'a str>,
}

/// How a resource wants its namespace derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceHook<'a> {
    /// The resource overrides its namespace entirely.
    Explicit(String),
    /// A class-level reference. `create` is the namespace guarding creation of new instances.
    Class { base: String, create: Option<String> },
    /// Let the configured convention name it.
    Convention(ResourceParts<'a>),
}

/// Implemented by anything that can be permission-checked by reference.
pub trait Resource {
    fn namespace_hook(&self) -> NamespaceHook<'_>;
}

/// Caller-supplied naming scheme for resources using [`NamespaceHook::Convention`].
pub trait NamespaceConvention: Send + Sync {
    fn namespace(&self, parts: &ResourceParts<'_>) -> Result<Namespace, NspError>;
}

/// `<container>.<kind>[.<id>]`
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedConvention;

impl NamespaceConvention for DottedConvention {
    fn namespace(&self, parts: &ResourceParts<'_>) -> Result<Namespace, NspError> {
        let mut segments = vec![parts.container, parts.kind];
        segments.extend(parts.id);
        Namespace::from_segments(segments)
    }
}

/// What a permission check is about.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    /// A namespace string, parsed and normalised before use.
    Namespace(&'a str),
    /// An already parsed namespace.
    Parsed(&'a Namespace),
    /// A resource, named through its hook.
    Resource(&'a dyn Resource),
    /// A field of a resource: the resource's namespace plus one segment.
    Field(&'a dyn Resource, &'a str),
    /// The namespace guarding creation of a class-level resource.
    Create(&'a dyn Resource),
}

impl<'a> Target<'a> {
    /// Resolves the target to its canonical namespace.
    ///
    /// # Errors
    /// - `NspError::InvalidNamespace` if the derived namespace is malformed.
    /// - `NspError::Usage` for a field name that is not exactly one segment, or a
    ///   `Create` target whose resource is not class-level.
    pub fn namespace(&self, convention: &dyn NamespaceConvention) -> Result<Namespace, NspError> {
        match self {
            Target::Namespace(raw) => Namespace::parse(raw),
            Target::Parsed(ns) => Ok((*ns).clone()),
            Target::Resource(resource) => resource_namespace(*resource, convention),
            Target::Field(resource, field) => resource_namespace(*resource, convention)?.child(field),
            Target::Create(resource) => match resource.namespace_hook() {
                NamespaceHook::Class { create: Some(create), .. } => Namespace::parse(&create),
                NamespaceHook::Class { base, create: None } => Namespace::parse(&base),
                _ => Err(NspError::Usage(
                    "a create namespace needs a class-level resource reference".to_string(),
                )),
            },
        }
    }
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Namespace(raw) => f.debug_tuple("Namespace").field(raw).finish(),
            Target::Parsed(ns) => f.debug_tuple("Parsed").field(ns).finish(),
            Target::Resource(r) => f.debug_tuple("Resource").field(&r.namespace_hook()).finish(),
            Target::Field(r, field) => f
                .debug_tuple("Field")
                .field(&r.namespace_hook())
                .field(field)
                .finish(),
            Target::Create(r) => f.debug_tuple("Create").field(&r.namespace_hook()).finish(),
        }
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(raw: &'a str) -> Self {
        Target::Namespace(raw)
    }
}

impl<'a> From<&'a Namespace> for Target<'a> {
    fn from(ns: &'a Namespace) -> Self {
        Target::Parsed(ns)
    }
}

fn resource_namespace(resource: &dyn Resource, convention: &dyn NamespaceConvention) -> Result<Namespace, NspError> {
    match resource.namespace_hook() {
        NamespaceHook::Explicit(ns) => Namespace::parse(&ns),
        NamespaceHook::Class { base, .. } => Namespace::parse(&base),
        NamespaceHook::Convention(parts) => convention.namespace(&parts),
    }
}
