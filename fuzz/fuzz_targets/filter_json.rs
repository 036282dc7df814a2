#![no_main]

// Harness: filter_json
// Filters arbitrary JSON through a tree built from arbitrary grants and
// checks that a second filter pass changes nothing.

use libfuzzer_sys::fuzz_target;
use arbitrary::Arbitrary;
use nsperms::{filter, NamespaceTree};

#[derive(Arbitrary, Debug)]
struct Input {
    grants: Vec<(String, u32)>,
    json: String,
}

fuzz_target!(|input: Input| {
    let Ok(tree) = NamespaceTree::build(input.grants.iter().map(|(ns, m)| (ns.as_str(), *m))) else {
        return;
    };
    let Ok(data) = serde_json::from_str::<serde_json::Value>(&input.json) else {
        return;
    };
    let once = filter(&data, &tree, None).expect("no ruleset, no error");
    let twice = filter(&once, &tree, None).expect("no ruleset, no error");
    assert_eq!(once, twice);
});
