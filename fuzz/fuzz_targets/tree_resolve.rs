#![no_main]

// Harness: tree_resolve
// Builds a tree from arbitrary grant strings and resolves arbitrary queries.
// Malformed namespaces must be rejected, never panic. Every accepted grant
// must resolve back to its own mask.

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use nsperms::{Namespace, NamespaceTree};

#[derive(Arbitrary, Debug)]
struct Input {
    grants: Vec<(String, u32)>,
    queries: Vec<String>,
}

fuzz_target!(|input: Input| {
    let Ok(tree) = NamespaceTree::build(input.grants.iter().map(|(ns, m)| (ns.as_str(), *m))) else {
        return;
    };
    for (ns, mask) in tree.grants() {
        let parsed = Namespace::parse(&ns).expect("stored grants are valid namespaces");
        assert_eq!(tree.resolve_namespace(&parsed, true), Some(mask));
    }
    for query in &input.queries {
        if let Ok(ns) = Namespace::parse(query) {
            let _ = tree.check(&ns, 1, false);
            let _ = tree.check_ambiguous(&ns, 1);
        }
    }
});
