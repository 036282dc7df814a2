//! Fixtures and helpers shared by unit tests, integration tests, benches and fuzz targets.
//! Only compiled with the `test-utils` feature.

use serde_json::{json, Value};

use crate::rights::flags::{DENY, READ, WRITE};
use crate::tree::NamespaceTree;
use crate::types::{FlatGrants, PermissionMask};

/// Installs a `tracing` subscriber writing to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub fn flat_grants(grants: &[(&str, PermissionMask)]) -> FlatGrants {
    grants.iter().map(|(ns, mask)| (ns.to_string(), *mask)).collect()
}

/// Builds a tree, panicking on malformed namespaces.
pub fn tree_of(grants: &[(&str, PermissionMask)]) -> NamespaceTree {
    NamespaceTree::build(grants.iter().copied()).expect("fixture grants are well-formed")
}

/// Grants covering a dual node, a nested deny and a top-level leaf.
pub fn sample_grants() -> FlatGrants {
    flat_grants(&[("a.b", READ), ("a.b.c", READ | WRITE), ("a.b.d", DENY), ("b", READ)])
}

/// Data matching [`sample_grants`]; see [`sample_filtered`] for the visible part.
pub fn sample_data() -> Value {
    json!({
        "a": {"b": {"c": "This should be here", "d": "This should be gone"}},
        "b": "This should be here",
        "c": "This should be gone"
    })
}

pub fn sample_filtered() -> Value {
    json!({
        "a": {"b": {"c": "This should be here"}},
        "b": "This should be here"
    })
}

/// An object holding a list of `n` records under `items`, each with an `id` and a `cost`.
pub fn item_list(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| json!({"id": i, "name": format!("item {}", i), "cost": i * 10}))
        .collect();
    json!({ "shop": { "items": items } })
}
