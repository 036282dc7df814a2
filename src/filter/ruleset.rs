//!
//! Secondary rules applied after the additive and subtractive passes.
//!
//! `require` rules prune data that is only visible through an inherited grant.
//! List handlers give each element of a list its own namespace and filter it individually.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::NspError;
use crate::filter::passes::is_empty_object;
use crate::namespace::{Namespace, WILDCARD};
use crate::rights;
use crate::tree::NamespaceTree;
use crate::types::PermissionMask;

type ItemNamespaceFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Computes the namespace of a single list item.
#[derive(Clone)]
pub struct ListHandler {
    resolver: Arc<ItemNamespaceFn>,
    absolute: bool,
}

impl ListHandler {
    /// The resolver's namespace is appended to the list's structural path.
    pub fn relative<F>(resolver: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        ListHandler { resolver: Arc::new(resolver), absolute: false }
    }

    /// The resolver's namespace is the item's full path.
    pub fn absolute<F>(resolver: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        ListHandler { resolver: Arc::new(resolver), absolute: true }
    }

    /// Relative handler naming each item by the value of one of its fields (string or number).
    pub fn field(name: &str) -> Self {
        let name = name.to_string();
        Self::relative(move |item| match item.get(&name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Full segment path of `item` inside a list found at `list_path`.
    ///
    /// # Returns
    /// `Ok(None)` if the resolver cannot name the item.
    fn item_path(&self, item: &Value, list_path: &[String]) -> Result<Option<Vec<String>>, NspError> {
        let Some(raw) = (self.resolver)(item) else {
            return Ok(None);
        };
        let item_ns = Namespace::parse(&raw)?;
        let path = if self.absolute {
            item_ns.segments().to_vec()
        } else {
            list_path.iter().chain(item_ns.segments()).cloned().collect()
        };
        Ok(Some(path))
    }
}

impl std::fmt::Debug for ListHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListHandler").field("absolute", &self.absolute).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct RequireRule {
    pattern: Namespace,
    level: PermissionMask,
}

#[derive(Debug, Clone)]
struct ListRule {
    pattern: Namespace,
    handler: ListHandler,
}

/// Optional rules supplied per filter call.
#[derive(Debug, Clone, Default)]
pub struct Ruleset {
    require: Vec<RequireRule>,
    list_handlers: Vec<ListRule>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule deleting any data at `pattern` unless the principal holds an explicit
    /// grant with at least `level` on the concrete path.
    ///
    /// # Errors
    /// `NspError::InvalidNamespace` if `pattern` is malformed.
    pub fn require(mut self, pattern: &str, level: PermissionMask) -> Result<Self, NspError> {
        let pattern = Namespace::parse(pattern)?;
        self.require.push(RequireRule { pattern, level });
        Ok(self)
    }

    /// Adds a handler for the list at `pattern`. A trailing `*` segment may stand for the
    /// list's items.
    ///
    /// # Errors
    /// `NspError::InvalidNamespace` if `pattern` is malformed.
    pub fn list_handler(mut self, pattern: &str, handler: ListHandler) -> Result<Self, NspError> {
        let pattern = Namespace::parse(pattern)?;
        self.list_handlers.push(ListRule { pattern, handler });
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.require.is_empty() && self.list_handlers.is_empty()
    }

    /// Applies require rules, then list handlers, to already filtered `data`.
    ///
    /// On error `data` may be partially processed; callers discard it.
    pub(crate) fn enforce(&self, data: &mut Value, tree: &NamespaceTree) -> Result<(), NspError> {
        self.enforce_require(data, tree);
        for rule in &self.list_handlers {
            let mut on_list = |items: &mut Vec<Value>, list_path: &[String]| {
                self.filter_list(items, list_path, &rule.handler, tree)
            };
            visit_lists(data, rule.pattern.segments(), &mut Vec::new(), &mut on_list)?;
        }
        Ok(())
    }

    fn enforce_require(&self, data: &mut Value, tree: &NamespaceTree) {
        for rule in &self.require {
            prune_unless_explicit(data, rule.pattern.segments(), &mut Vec::new(), tree, rule.level);
        }
    }

    fn filter_list(
        &self,
        items: &mut Vec<Value>,
        list_path: &[String],
        handler: &ListHandler,
        tree: &NamespaceTree,
    ) -> Result<(), NspError> {
        let before = items.len();
        let mut kept = Vec::with_capacity(before);
        for item in std::mem::take(items) {
            let Some(path) = handler.item_path(&item, list_path)? else {
                continue;
            };
            if let Some(filtered) = self.filter_singleton(item, &path, tree) {
                kept.push(filtered);
            }
        }
        tracing::trace!(
            "List at '{}' filtered from {} to {} items",
            list_path.join("."),
            before,
            kept.len()
        );
        *items = kept;
        Ok(())
    }

    /// Filters `item` as if it were the only value in the data, addressed by `path`.
    fn filter_singleton(&self, item: Value, path: &[String], tree: &NamespaceTree) -> Option<Value> {
        let wrapped = path.iter().rev().fold(item, |inner, segment| {
            let mut map = Map::new();
            map.insert(segment.clone(), inner);
            Value::Object(map)
        });
        let mut filtered = super::apply(&wrapped, tree);
        self.enforce_require(&mut filtered, tree);

        let mut current = filtered;
        for segment in path {
            current = match current {
                Value::Object(mut map) => map.remove(segment)?,
                _ => return None,
            };
        }
        (!is_empty_object(&current)).then_some(current)
    }
}

/// Concrete keys of `map` matching one pattern segment.
fn matching_keys(map: &Map<String, Value>, segment: &str) -> Vec<String> {
    if segment == WILDCARD {
        map.keys().cloned().collect()
    } else if map.contains_key(segment) {
        vec![segment.to_string()]
    } else {
        Vec::new()
    }
}

fn prune_unless_explicit(
    node: &mut Value,
    pattern: &[String],
    path: &mut Vec<String>,
    tree: &NamespaceTree,
    level: PermissionMask,
) {
    let Value::Object(map) = node else {
        return;
    };
    let Some((head, rest)) = pattern.split_first() else {
        return;
    };
    for key in matching_keys(map, head) {
        path.push(key.clone());
        if rest.is_empty() {
            let granted = tree.resolve(path.as_slice(), true).unwrap_or(0);
            if !rights::sufficient(granted, level) {
                tracing::trace!("Pruning '{}': no explicit grant", path.join("."));
                map.remove(&key);
            }
        } else if let Some(child) = map.get_mut(&key) {
            prune_unless_explicit(child, rest, path, tree, level);
        }
        path.pop();
    }
}

fn visit_lists<F>(
    node: &mut Value,
    pattern: &[String],
    path: &mut Vec<String>,
    on_list: &mut F,
) -> Result<(), NspError>
where
    F: FnMut(&mut Vec<Value>, &[String]) -> Result<(), NspError>,
{
    match node {
        Value::Array(items) if pattern.is_empty() || matches!(pattern, [only] if only == WILDCARD) => {
            on_list(items, path.as_slice())
        }
        Value::Object(map) => {
            let Some((head, rest)) = pattern.split_first() else {
                return Ok(());
            };
            for key in matching_keys(map, head) {
                path.push(key.clone());
                if let Some(child) = map.get_mut(&key) {
                    visit_lists(child, rest, path, on_list)?;
                }
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
