//! Permission resolution over a [`NamespaceTree`].
//!
//! For each path segment the walk tries, in order: the exact child's subtree (or its mask
//! when it is a leaf), the exact child's own mask when it is dual, then the wildcard child
//! in the same way. The first present value wins; nothing is aggregated across branches.

use crate::error::NspError;
use crate::namespace::{pattern_matches_prefix, Namespace, WILDCARD};
use crate::rights;
use crate::tree::node::{NamespaceTree, Node};
use crate::types::PermissionMask;

impl NamespaceTree {
    /// Resolves the effective mask for a path given as segments.
    ///
    /// With `explicit` set, a grant only counts when it sits exactly at the full path;
    /// ancestor grants are ignored (a wildcard at the right depth still matches).
    ///
    /// # Returns
    /// `None` when no grant covers the path. A present `Some(0)` is an explicit deny.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S], explicit: bool) -> Option<PermissionMask> {
        let (head, rest) = path.split_first()?;
        let head = head.as_ref();
        let exact = self.get(head).and_then(|node| resolve_node(node, rest, explicit));
        if exact.is_some() || head == WILDCARD {
            return exact;
        }
        self.wildcard().and_then(|node| resolve_node(node, rest, explicit))
    }

    pub fn resolve_namespace(&self, namespace: &Namespace, explicit: bool) -> Option<PermissionMask> {
        self.resolve(namespace.segments(), explicit)
    }

    /// Returns true if the grant covering `namespace` contains every bit of `level`.
    /// An uncovered namespace is denied.
    pub fn check(&self, namespace: &Namespace, level: PermissionMask, explicit: bool) -> bool {
        let have = self.resolve_namespace(namespace, explicit).unwrap_or(0);
        rights::sufficient(have, level)
    }

    /// Parses `namespace` and checks it, see [`NamespaceTree::check`].
    ///
    /// # Errors
    /// `NspError::InvalidNamespace` if `namespace` is malformed.
    pub fn check_str(&self, namespace: &str, level: PermissionMask, explicit: bool) -> Result<bool, NspError> {
        let ns = Namespace::parse(namespace)?;
        Ok(self.check(&ns, level, explicit))
    }

    /// Deprecated reverse-wildcard check.
    ///
    /// Succeeds when the ordinary check succeeds, or when any stored grant that is
    /// sufficient for `level` lies at or below `namespace` read as a pattern
    /// (so `a.b.*` is satisfied by a grant on `a.b.c`).
    ///
    /// This scans every grant in the tree: O(number of grants) per call.
    pub fn check_ambiguous(&self, namespace: &Namespace, level: PermissionMask) -> bool {
        if self.check(namespace, level, false) {
            return true;
        }
        let mut found = false;
        self.for_each_grant(&mut Vec::new(), &mut |segments, mask| {
            if !found && rights::sufficient(mask, level) && pattern_matches_prefix(namespace.segments(), segments) {
                found = true;
            }
        });
        if found {
            tracing::trace!("Ambiguous match for namespace {}", namespace);
        }
        found
    }
}

fn resolve_node<S: AsRef<str>>(node: &Node, rest: &[S], explicit: bool) -> Option<PermissionMask> {
    match node {
        Node::Leaf(mask) => resolve_leaf(*mask, rest, explicit),
        Node::Branch(tree) => tree.resolve(rest, explicit),
        Node::Dual(mask, tree) => tree
            .resolve(rest, explicit)
            .or_else(|| resolve_leaf(*mask, rest, explicit)),
    }
}

fn resolve_leaf<S>(mask: PermissionMask, rest: &[S], explicit: bool) -> Option<PermissionMask> {
    if explicit && !rest.is_empty() {
        None
    } else {
        Some(mask)
    }
}
