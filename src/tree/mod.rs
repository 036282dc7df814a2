pub mod node;
pub mod resolve;

pub use node::{NamespaceTree, Node};

#[cfg(test)]
mod tests;
