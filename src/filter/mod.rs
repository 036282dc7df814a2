//! Permission-based pruning of nested data.
//!
//! [`filter`] runs the additive pass, the subtractive pass and then an optional
//! [`Ruleset`]. Input data is never mutated; every call returns a new value.

pub mod passes;
pub mod ruleset;

pub use passes::{apply_additive, apply_subtractive, Rule};
pub use ruleset::{ListHandler, Ruleset};

use serde_json::Value;

use crate::error::NspError;
use crate::tree::NamespaceTree;

/// Additive then subtractive pass, without any ruleset.
pub fn apply(data: &Value, tree: &NamespaceTree) -> Value {
    let mut out = apply_additive(data, Rule::Tree(tree));
    apply_subtractive(&mut out, tree);
    out
}

/// Returns the parts of `data` visible through `tree`, further restricted by `ruleset`.
///
/// # Errors
/// `NspError::InvalidNamespace` if a list handler produces a malformed item namespace.
/// No partially filtered value is returned in that case.
pub fn filter(data: &Value, tree: &NamespaceTree, ruleset: Option<&Ruleset>) -> Result<Value, NspError> {
    let mut out = apply(data, tree);
    if let Some(rules) = ruleset.filter(|r| !r.is_empty()) {
        rules.enforce(&mut out, tree)?;
    }
    Ok(out)
}
