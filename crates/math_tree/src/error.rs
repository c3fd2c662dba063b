//! Error types for tree operations

use crate::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {0} is the root and cannot be detached")]
    DetachRoot(NodeId),

    #[error("Node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("Node {child} cannot be placed under its own descendant {parent}")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Unknown node kind: {0}")]
    UnknownKind(String),

    #[error("Tree structure error: {0}")]
    TreeStructure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TreeError::NotAChild {
            parent: NodeId::from_index(1),
            child: NodeId::from_index(4),
        };
        assert_eq!(err.to_string(), "Node #4 is not a child of #1");
    }
}
