#![cfg(test)]

use crate::error::NspError;
use crate::namespace::Namespace;
use crate::rights::flags::{DENY, READ, WRITE};
use crate::tree::{NamespaceTree, Node};
use crate::types::FlatGrants;

// --- Test Utilities ---

fn ns(raw: &str) -> Namespace {
    Namespace::parse(raw).unwrap()
}

fn tree_of(grants: &[(&str, u32)]) -> NamespaceTree {
    NamespaceTree::build(grants.iter().copied()).unwrap()
}

/// Grants used throughout the resolver tests.
fn sample_tree() -> NamespaceTree {
    tree_of(&[
        ("a.b", READ),
        ("a.b.c", READ | WRITE),
        ("a.b.d", DENY),
        ("b", READ),
    ])
}

// --- Builder ---

#[test]
fn test_empty_input_builds_empty_tree() {
    let tree = NamespaceTree::build(Vec::<(String, u32)>::new()).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.resolve(&["a"], false), None);
}

#[test]
fn test_leaf_then_deeper_grant_becomes_dual() {
    let tree = tree_of(&[("a.b", READ), ("a.b.c", READ | WRITE)]);
    let a = tree.get("a").and_then(Node::subtree).unwrap();
    match a.get("b") {
        Some(Node::Dual(mask, sub)) => {
            assert_eq!(*mask, READ);
            assert_eq!(sub.get("c"), Some(&Node::Leaf(READ | WRITE)));
        }
        other => panic!("expected dual node at a.b, got {:?}", other),
    }
}

#[test]
fn test_insertion_order_does_not_matter() {
    let forward = tree_of(&[("a.b", READ), ("a.b.c", WRITE), ("a", DENY)]);
    let backward = tree_of(&[("a", DENY), ("a.b.c", WRITE), ("a.b", READ)]);
    assert_eq!(forward, backward);
}

#[test]
fn test_duplicate_namespace_last_wins() {
    let tree = tree_of(&[("a.b", READ), ("a.b", WRITE)]);
    assert_eq!(tree.resolve(&["a", "b"], false), Some(WRITE));
}

#[test]
fn test_malformed_namespace_fails_build() {
    let err = NamespaceTree::build(vec![("a.b", READ), ("a..c", READ)]).unwrap_err();
    assert!(matches!(err, NspError::InvalidNamespace { ref namespace, .. } if namespace == "a..c"));
}

#[test]
fn test_build_lowercases_namespaces() {
    let tree = tree_of(&[("Org.42.Members", READ)]);
    assert!(tree.check(&ns("org.42.members"), READ, false));
}

#[test]
fn test_grants_are_recovered_losslessly() {
    let input: FlatGrants = [
        ("a.b".to_string(), READ),
        ("a.b.c".to_string(), READ | WRITE),
        ("a.b.d".to_string(), DENY),
        ("x.*.z".to_string(), READ),
        ("x.*".to_string(), WRITE),
    ]
    .into_iter()
    .collect();
    let tree = NamespaceTree::build(input.clone()).unwrap();
    assert_eq!(tree.grants(), input);
}

// --- Resolver ---

#[test]
fn test_dual_node_resolution() {
    let tree = sample_tree();
    assert!(tree.check(&ns("a.b"), READ, false));
    assert!(!tree.check(&ns("a.b"), WRITE, false));
    assert!(tree.check(&ns("a.b.c"), WRITE, false));
    assert!(tree.check(&ns("a.b.c"), READ, false));
}

#[test]
fn test_deny_leaf_overrides_ancestor() {
    let tree = sample_tree();
    assert_eq!(tree.resolve(&["a", "b", "d"], false), Some(DENY));
    assert!(!tree.check(&ns("a.b.d"), READ, false));
    assert!(!tree.check(&ns("a.b.d"), WRITE, false));
}

#[test]
fn test_ancestor_grant_covers_descendants() {
    let tree = sample_tree();
    assert!(tree.check(&ns("b.anything.deeper"), READ, false));
    assert!(tree.check(&ns("a.b.e"), READ, false));
    assert!(!tree.check(&ns("a.x"), READ, false));
    assert!(!tree.check(&ns("a"), READ, false));
}

#[test]
fn test_wildcard_matches_exactly_one_segment() {
    let tree = tree_of(&[("x.*.z", READ)]);
    assert!(tree.check(&ns("x.y.z"), READ, false));
    assert!(!tree.check(&ns("x.y.w.z"), READ, false));
    assert!(!tree.check(&ns("x.y"), READ, false));
}

#[test]
fn test_exact_child_beats_wildcard() {
    let tree = tree_of(&[("x.*", READ | WRITE), ("x.secret", DENY)]);
    assert_eq!(tree.resolve(&["x", "secret"], false), Some(DENY));
    assert_eq!(tree.resolve(&["x", "open"], false), Some(READ | WRITE));
}

#[test]
fn test_wildcard_fallback_when_exact_branch_has_no_answer() {
    let tree = tree_of(&[("x.y.z", WRITE), ("x.*", READ)]);
    // x.y is a branch without its own grant, so the walk falls through to x.*
    assert_eq!(tree.resolve(&["x", "y"], false), Some(READ));
    assert_eq!(tree.resolve(&["x", "y", "z"], false), Some(WRITE));
}

#[test]
fn test_dual_wildcard_keeps_its_own_grant() {
    let tree = tree_of(&[("x.*", READ), ("x.*.secret", DENY)]);
    assert_eq!(tree.resolve(&["x", "y"], false), Some(READ));
    assert_eq!(tree.resolve(&["x", "y", "secret"], false), Some(DENY));
    assert_eq!(tree.resolve(&["x", "y", "other"], false), Some(READ));
}

#[test]
fn test_explicit_ignores_ancestor_grants() {
    let tree = tree_of(&[("g", READ), ("g.c.3", READ)]);
    assert_eq!(tree.resolve(&["g", "c", "1"], false), Some(READ));
    assert_eq!(tree.resolve(&["g", "c", "1"], true), None);
    assert_eq!(tree.resolve(&["g", "c", "3"], true), Some(READ));
    assert_eq!(tree.resolve(&["g"], true), Some(READ));
}

#[test]
fn test_explicit_accepts_wildcard_at_exact_depth() {
    let tree = tree_of(&[("g.c.*", READ)]);
    assert_eq!(tree.resolve(&["g", "c", "7"], true), Some(READ));
    assert_eq!(tree.resolve(&["g", "c", "7", "name"], true), None);
}

#[test]
fn test_check_requires_every_requested_bit() {
    let tree = tree_of(&[("a", READ)]);
    assert!(!tree.check(&ns("a"), READ | WRITE, false));
}

#[test]
fn test_check_str_rejects_malformed_namespace() {
    let tree = sample_tree();
    assert!(matches!(tree.check_str("a..b", READ, false), Err(NspError::InvalidNamespace { .. })));
    assert_eq!(tree.check_str("A.B", READ, false), Ok(true));
}

#[test]
fn test_wildcard_in_query_is_covered_by_leaf() {
    let tree = sample_tree();
    assert!(tree.check(&ns("b.*"), READ, false));
}

// --- Ambiguous (deprecated) ---

#[test]
fn test_ambiguous_only_when_requested() {
    let tree = tree_of(&[("a.b.c", READ)]);
    assert!(!tree.check(&ns("a.b.*"), READ, false));
    assert!(tree.check_ambiguous(&ns("a.b.*"), READ));
    assert!(!tree.check_ambiguous(&ns("a.b.*"), WRITE));
    assert!(!tree.check_ambiguous(&ns("c.*"), READ));
}

#[test]
fn test_ambiguous_falls_back_to_strict_result() {
    let tree = sample_tree();
    assert!(tree.check_ambiguous(&ns("a.b.*"), READ));
    assert!(tree.check_ambiguous(&ns("b"), READ));
}
