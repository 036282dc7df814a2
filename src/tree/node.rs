//!
//! The namespace permission tree and its builder.
//!
//! A flat set of grants such as `{"a.b": 1, "a.b.c": 3}` becomes a tree keyed by segment.
//! A position holding both a grant and deeper grants is a [`Node::Dual`].

use std::collections::BTreeMap;

use crate::error::NspError;
use crate::namespace::{Namespace, WILDCARD};
use crate::types::{FlatGrants, PermissionMask};

/// A single position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A grant exists exactly here and nothing deeper.
    Leaf(PermissionMask),
    /// Grants exist only deeper than this position.
    Branch(NamespaceTree),
    /// A grant exists here and deeper grants exist below.
    Dual(PermissionMask, NamespaceTree),
}

impl Node {
    fn from_parts(mask: Option<PermissionMask>, subtree: NamespaceTree) -> Node {
        match mask {
            Some(mask) if subtree.is_empty() => Node::Leaf(mask),
            Some(mask) => Node::Dual(mask, subtree),
            None => Node::Branch(subtree),
        }
    }

    fn into_parts(self) -> (Option<PermissionMask>, NamespaceTree) {
        match self {
            Node::Leaf(mask) => (Some(mask), NamespaceTree::default()),
            Node::Branch(tree) => (None, tree),
            Node::Dual(mask, tree) => (Some(mask), tree),
        }
    }

    /// The grant stored exactly at this position, if any.
    pub fn mask(&self) -> Option<PermissionMask> {
        match self {
            Node::Leaf(mask) | Node::Dual(mask, _) => Some(*mask),
            Node::Branch(_) => None,
        }
    }

    /// The deeper grants below this position, if any.
    pub fn subtree(&self) -> Option<&NamespaceTree> {
        match self {
            Node::Branch(tree) | Node::Dual(_, tree) => Some(tree),
            Node::Leaf(_) => None,
        }
    }
}

/// Lookup structure built from a principal's flat grants.
///
/// Immutable once built; share it behind an `Arc` across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTree {
    children: BTreeMap<String, Node>,
}

impl NamespaceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a flat namespace → mask mapping.
    ///
    /// Every namespace is parsed (and lower-cased) before anything is inserted, so a
    /// malformed entry fails the whole build and no partial tree is observable.
    /// Insertion order does not affect the result. If the same namespace appears twice
    /// the later mask wins.
    ///
    /// # Errors
    /// `NspError::InvalidNamespace` for the first malformed namespace.
    pub fn build<I, S>(grants: I) -> Result<Self, NspError>
    where
        I: IntoIterator<Item = (S, PermissionMask)>,
        S: AsRef<str>,
    {
        let parsed = grants
            .into_iter()
            .map(|(ns, mask)| Namespace::parse(ns.as_ref()).map(|ns| (ns, mask)))
            .collect::<Result<Vec<_>, _>>()?;
        let tree = Self::from_namespaces(parsed);
        tracing::debug!("Built namespace tree with {} top-level keys", tree.len());
        Ok(tree)
    }

    /// Builds a tree from already validated namespaces.
    pub fn from_namespaces<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = (Namespace, PermissionMask)>,
    {
        let mut tree = NamespaceTree::default();
        for (ns, mask) in grants {
            tree.insert(&ns, mask);
        }
        tree
    }

    /// Inserts a single grant.
    pub fn insert(&mut self, namespace: &Namespace, mask: PermissionMask) {
        self.insert_segments(namespace.segments(), mask);
    }

    fn insert_segments(&mut self, segments: &[String], mask: PermissionMask) {
        let Some((head, rest)) = segments.split_first() else {
            return;
        };
        let (existing_mask, mut subtree) = self
            .children
            .remove(head)
            .map(Node::into_parts)
            .unwrap_or((None, NamespaceTree::default()));

        let node = if rest.is_empty() {
            Node::from_parts(Some(mask), subtree)
        } else {
            subtree.insert_segments(rest, mask);
            Node::from_parts(existing_mask, subtree)
        };
        self.children.insert(head.clone(), node);
    }

    /// Child node for an exact segment.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.children.get(segment)
    }

    /// Child node stored under the wildcard key.
    pub fn wildcard(&self) -> Option<&Node> {
        self.children.get(WILDCARD)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Recovers the flat grants the tree was built from.
    pub fn grants(&self) -> FlatGrants {
        let mut out = FlatGrants::new();
        self.for_each_grant(&mut Vec::new(), &mut |segments, mask| {
            out.insert(segments.join("."), mask);
        });
        out
    }

    /// Visits every stored grant with its full segment path.
    pub(crate) fn for_each_grant<'a, F>(&'a self, prefix: &mut Vec<&'a str>, visit: &mut F)
    where
        F: FnMut(&[&'a str], PermissionMask),
    {
        for (key, node) in &self.children {
            prefix.push(key.as_str());
            if let Some(mask) = node.mask() {
                visit(prefix.as_slice(), mask);
            }
            if let Some(subtree) = node.subtree() {
                subtree.for_each_grant(prefix, visit);
            }
            prefix.pop();
        }
    }
}
