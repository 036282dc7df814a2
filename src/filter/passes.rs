//!
//! The additive and subtractive passes of the data filter.
//!
//! The additive pass builds a copy containing everything reachable through exact, dual
//! or wildcard rules. The subtractive pass then removes what exact rules deny and what
//! collapsed to an empty mapping. Running them separately lets a shallow wildcard grant
//! default visibility while a deeper exact rule still denies one sibling.

use serde_json::{Map, Value};

use crate::namespace::WILDCARD;
use crate::tree::{NamespaceTree, Node};
use crate::types::PermissionMask;

/// The rule found at one position of the tree, as seen by the filter passes.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    /// A grant with nothing below it.
    Mask(PermissionMask),
    /// Deeper rules.
    Tree(&'a NamespaceTree),
}

impl<'a> Rule<'a> {
    /// The rule under a node's plain key: its subtree if it has one, otherwise its mask.
    pub fn plain(node: &'a Node) -> Rule<'a> {
        match node {
            Node::Leaf(mask) => Rule::Mask(*mask),
            Node::Branch(tree) | Node::Dual(_, tree) => Rule::Tree(tree),
        }
    }

    /// The exact-path grant a dual node carries next to its subtree.
    pub fn dual(node: &'a Node) -> Option<Rule<'a>> {
        match node {
            Node::Dual(mask, _) => Some(Rule::Mask(*mask)),
            _ => None,
        }
    }

    /// False for a zero mask or an empty tree.
    pub fn is_granting(&self) -> bool {
        match self {
            Rule::Mask(mask) => *mask != 0,
            Rule::Tree(tree) => !tree.is_empty(),
        }
    }
}

/// First pass: returns a new value holding every part of `data` reachable under `rule`.
///
/// For each key of a mapping, the result under the exact child is taken first, then the
/// dual child's grant is merged in, then the wildcard child's unless the exact child was a
/// positive leaf. Merging two mappings is a shallow update; otherwise the later result
/// replaces the earlier one. Keys with no granting rule are left out.
///
/// A non-granting `rule` yields an empty mapping. Leaves and lists pass through unchanged.
pub fn apply_additive(data: &Value, rule: Rule<'_>) -> Value {
    if !rule.is_granting() {
        return Value::Object(Map::new());
    }
    let (Rule::Tree(tree), Value::Object(map)) = (rule, data) else {
        return data.clone();
    };

    let mut out = Map::new();
    for (key, value) in map {
        let mut direct = false;
        if let Some(node) = tree.get(key) {
            let plain = Rule::plain(node);
            if plain.is_granting() {
                out.insert(key.clone(), apply_additive(value, plain));
                direct = matches!(plain, Rule::Mask(_));
            }
            merge_node_grant(&mut out, key, value, node);
        }
        if direct || key == WILDCARD {
            continue;
        }
        if let Some(node) = tree.wildcard() {
            let plain = Rule::plain(node);
            if plain.is_granting() {
                merge(&mut out, key, apply_additive(value, plain));
            }
            merge_node_grant(&mut out, key, value, node);
        }
    }
    Value::Object(out)
}

fn merge_node_grant(out: &mut Map<String, Value>, key: &str, value: &Value, node: &Node) {
    if let Some(dual) = Rule::dual(node).filter(Rule::is_granting) {
        merge(out, key, apply_additive(value, dual));
    }
}

fn merge(out: &mut Map<String, Value>, key: &str, incoming: Value) {
    let update = match incoming {
        Value::Object(update) => update,
        replacement => {
            out.insert(key.to_string(), replacement);
            return;
        }
    };
    if let Some(Value::Object(existing)) = out.get_mut(key) {
        existing.extend(update);
    } else {
        out.insert(key.to_string(), Value::Object(update));
    }
}

/// Second pass: prunes `data` in place against the rules in `tree`.
///
/// For every exact rule whose key is present: the key is removed if the rule grants
/// nothing or the value is an empty mapping; deeper rules recurse, and a value emptied by
/// recursion is removed as well. The wildcard rule then gets the same treatment for every
/// key still present, including keys that also have an exact rule.
pub fn apply_subtractive(data: &mut Value, tree: &NamespaceTree) {
    let Value::Object(map) = data else {
        return;
    };
    for (key, node) in tree.iter() {
        prune_key(map, key, node);
    }
    if let Some(node) = tree.wildcard() {
        let remaining: Vec<String> = map.keys().cloned().collect();
        for key in remaining {
            prune_key(map, &key, node);
        }
    }
}

fn prune_key(map: &mut Map<String, Value>, key: &str, node: &Node) {
    prune_with(map, key, Rule::plain(node));
    if let Some(dual) = Rule::dual(node) {
        prune_with(map, key, dual);
    }
}

fn prune_with(map: &mut Map<String, Value>, key: &str, rule: Rule<'_>) {
    let Some(value) = map.get_mut(key) else {
        return;
    };
    if !rule.is_granting() || is_empty_object(value) {
        map.remove(key);
        return;
    }
    if let Rule::Tree(subtree) = rule {
        apply_subtractive(value, subtree);
        if is_empty_object(value) {
            map.remove(key);
        }
    }
}

pub(crate) fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}
