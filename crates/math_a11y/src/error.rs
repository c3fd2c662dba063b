//! Error types for the complexity and collapse passes

use math_tree::{NodeId, TreeError};
use thiserror::Error;

/// Errors that can occur while scoring or collapsing a math tree
#[derive(Error, Debug)]
pub enum CollapseError {
    /// A `data-semantic-content` id does not name any node below the referencing node
    #[error("Semantic reference not found: '{id}' (referenced from {node})")]
    SemanticReferenceNotFound { node: NodeId, id: String },

    /// The marker table has neither an entry for the type and role nor a "value" fallback
    #[error("No collapse marker for semantic type '{0}'")]
    MissingMarker(String),

    /// A collapsed node has no parent to hold its toggle
    #[error("Collapsed node {0} is detached")]
    Detached(NodeId),

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

/// Result type for collapse operations
pub type Result<T> = std::result::Result<T, CollapseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CollapseError::SemanticReferenceNotFound {
            node: NodeId::from_index(3),
            id: "12".to_string(),
        };
        assert_eq!(err.to_string(), "Semantic reference not found: '12' (referenced from #3)");
    }

    #[test]
    fn test_error_from_tree() {
        let err: CollapseError = TreeError::DetachRoot(NodeId::from_index(0)).into();
        assert!(matches!(err, CollapseError::Tree(_)));
    }
}
