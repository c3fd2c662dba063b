//! Node and tree identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index of a node inside its tree's arena.
///
/// Ids are only meaningful for the tree that issued them. They stay valid for
/// the lifetime of the tree: detached nodes keep their slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a NodeId from a raw arena index
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Get the underlying arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for one expression tree.
/// Uses UUID v4 so that pass-scoped data can be tied to the tree it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeId(Uuid);

impl TreeId {
    /// Create a new random TreeId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TreeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "#7");
    }

    #[test]
    fn test_tree_ids_are_unique() {
        assert_ne!(TreeId::new(), TreeId::new());
    }
}
