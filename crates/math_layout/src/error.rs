//! Error types for the layout crate

use math_tree::{NodeId, NodeKind, TreeError, TreeId};
use thiserror::Error;

/// Errors that can occur while laying out a math tree
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The wrapper registry was built without a fallback class
    #[error("No default wrapper registered")]
    MissingDefaultWrapper,

    /// A variant has no output class and the table has no "value" fallback
    #[error("No output class for variant '{0}'")]
    MissingVariantClass(String),

    /// A wrapper was expected for a node but the pass never created one
    #[error("No wrapper for {kind} node {node}")]
    Unwrapped { kind: NodeKind, node: NodeId },

    /// A wrapper's children do not match what its layout needs
    #[error("Malformed {kind} element: {reason}")]
    Malformed { kind: NodeKind, reason: String },

    /// A pass's wrappers were used with a different tree
    #[error("Wrappers belong to tree {expected}, not {found}")]
    ForeignTree { expected: TreeId, found: TreeId },

    /// Error from the underlying tree
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LayoutError::MissingVariantClass("-tex-oldstyle".to_string());
        assert_eq!(err.to_string(), "No output class for variant '-tex-oldstyle'");
    }

    #[test]
    fn test_error_from_tree() {
        let tree_err = TreeError::NodeNotFound(NodeId::from_index(9));
        let err: LayoutError = tree_err.into();
        assert!(matches!(err, LayoutError::Tree(_)));
    }
}
