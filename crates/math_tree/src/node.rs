//! Tree nodes

use crate::{attributes, AttributeSet, AttributeValue, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// One element of the compiled math tree.
///
/// Children are owned by the tree's arena and referenced by id; the parent
/// link is a plain non-owning back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) children: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent: Option<NodeId>,
    #[serde(default)]
    pub(crate) attributes: AttributeSet,
    /// Character data, only for `text` leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parent: None,
            attributes: AttributeSet::new(),
            text: None,
        }
    }

    pub fn with_attributes(kind: NodeKind, attributes: AttributeSet) -> Self {
        Self {
            attributes,
            ..Self::new(kind)
        }
    }

    /// A text leaf
    pub fn text_leaf(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(NodeKind::Text)
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn is_token(&self) -> bool {
        self.kind.is_token()
    }

    pub fn is_inferred(&self) -> bool {
        self.kind == NodeKind::InferredMrow
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.attributes
    }

    /// Own character data of a text leaf
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Attribute lookup with explicit > inherited > kind default precedence
    pub fn get(&self, name: &str) -> Option<AttributeValue> {
        self.attributes
            .get_local(name)
            .cloned()
            .or_else(|| attributes::default_value(self.kind, name))
    }

    /// Whether `name` has a default for this node's kind
    pub fn has_default(&self, name: &str) -> bool {
        attributes::has_default(self.kind, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_falls_back_to_kind_default() {
        let mut node = Node::new(NodeKind::Mo);
        assert_eq!(node.get("movablelimits"), Some(AttributeValue::Bool(false)));
        node.attributes_mut().set_inherited("displaystyle", true);
        assert_eq!(node.get("displaystyle"), Some(AttributeValue::Bool(true)));
        node.attributes_mut().set("movablelimits", true);
        assert_eq!(node.get("movablelimits"), Some(AttributeValue::Bool(true)));
    }

    #[test]
    fn test_text_leaf() {
        let leaf = Node::text_leaf("x");
        assert_eq!(leaf.kind(), NodeKind::Text);
        assert_eq!(leaf.text(), Some("x"));
        assert_eq!(leaf.get("mathvariant"), None);
    }
}
