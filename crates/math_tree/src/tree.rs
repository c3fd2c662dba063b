//! The node arena and its edit operations

use crate::{
    AttributeSet, AttributeValue, Node, NodeId, NodeKind, PropertyTable, Result, TreeError, TreeId,
};
use serde::{Deserialize, Serialize};

/// Attribute carrying a node's semantic id
pub const SEMANTIC_ID: &str = "data-semantic-id";

/// A compiled math expression.
///
/// Nodes are stored in an arena and addressed by [`NodeId`]. Nodes removed
/// from the tree by an edit stay in the arena (detached) so ids never dangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathTree {
    #[serde(default)]
    id: TreeId,
    nodes: Vec<Node>,
    root: NodeId,
    #[serde(skip)]
    properties: PropertyTable,
}

impl MathTree {
    /// Create a tree holding a single root node of the given kind
    pub fn new(root_kind: NodeKind) -> Self {
        Self {
            id: TreeId::new(),
            nodes: vec![Node::new(root_kind)],
            root: NodeId::from_index(0),
            properties: PropertyTable::new(),
        }
    }

    /// Parse a tree from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: MathTree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }

    /// Serialize the tree (properties are not included)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Access
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(TreeError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::NodeNotFound(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.node(id)?.kind)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn attributes(&self, id: NodeId) -> Result<&AttributeSet> {
        Ok(&self.node(id)?.attributes)
    }

    pub fn attributes_mut(&mut self, id: NodeId) -> Result<&mut AttributeSet> {
        Ok(&mut self.node_mut(id)?.attributes)
    }

    /// Full attribute lookup, including the automatic `mathvariant` of `mi`
    pub fn attribute(&self, id: NodeId, name: &str) -> Result<Option<AttributeValue>> {
        let node = self.node(id)?;
        if node.kind == NodeKind::Mi && name == "mathvariant" {
            if let Some(value) = node.attributes.get_local(name) {
                return Ok(Some(value.clone()));
            }
            let auto = if self.text_content(id)?.chars().count() == 1 {
                "italic"
            } else {
                "normal"
            };
            return Ok(Some(AttributeValue::from(auto)));
        }
        Ok(node.get(name))
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyTable {
        &mut self.properties
    }

    // =========================================================================
    // Construction and editing
    // =========================================================================

    /// Add a detached node to the arena
    pub fn create(&mut self, kind: NodeKind, attributes: AttributeSet) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::with_attributes(kind, attributes));
        id
    }

    /// Add a detached text leaf
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node::text_leaf(text));
        id
    }

    /// Add a detached token element holding `text`
    pub fn create_token(&mut self, kind: NodeKind, text: &str) -> Result<NodeId> {
        self.create_token_with(kind, text, AttributeSet::new())
    }

    /// Add a detached token element with attributes
    pub fn create_token_with(
        &mut self,
        kind: NodeKind,
        text: &str,
        attributes: AttributeSet,
    ) -> Result<NodeId> {
        let token = self.create(kind, attributes);
        let leaf = self.create_text(text);
        self.append_child(token, leaf)?;
        Ok(token)
    }

    /// Add a detached element and attach the given children to it
    pub fn create_element(
        &mut self,
        kind: NodeKind,
        attributes: AttributeSet,
        children: &[NodeId],
    ) -> Result<NodeId> {
        let id = self.create(kind, attributes);
        for child in children {
            self.append_child(id, *child)?;
        }
        Ok(id)
    }

    /// Attach a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let node = self.node_mut(child)?;
        if node.parent.is_some() {
            return Err(TreeError::AlreadyAttached(child));
        }
        if child == self.root {
            return Err(TreeError::DetachRoot(child));
        }
        self.check_acyclic(parent, child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Replace `old` in its parent's child list by the detached node `new`.
    /// `old` is left detached.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        if self.node(new)?.parent.is_some() {
            return Err(TreeError::AlreadyAttached(new));
        }
        self.check_acyclic(parent, new)?;
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == old)
            .ok_or(TreeError::NotAChild { parent, child: old })?;
        self.node_mut(parent)?.children[position] = new;
        self.node_mut(new)?.parent = Some(parent);
        self.node_mut(old)?.parent = None;
        Ok(())
    }

    /// Replace the whole child list of `parent`.
    ///
    /// The previous children are detached; the new ones are moved here from
    /// wherever they were attached.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        for child in children {
            if *child == self.root {
                return Err(TreeError::DetachRoot(*child));
            }
            self.check_acyclic(parent, *child)?;
        }
        let previous = std::mem::take(&mut self.node_mut(parent)?.children);
        for old in previous {
            self.node_mut(old)?.parent = None;
        }
        for child in children {
            self.detach(*child)?;
            self.node_mut(*child)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children = children.to_vec();
        Ok(())
    }

    /// Fail if `child` is `parent` or one of its ancestors
    fn check_acyclic(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(TreeError::Cycle { parent, child });
            }
            current = self.node(id)?.parent;
        }
        Ok(())
    }

    /// Remove a node from its parent's child list
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(TreeError::DetachRoot(id));
        }
        if let Some(parent) = self.node(id)?.parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Pre-order list of the subtree rooted at `start`
    pub fn walk(&self, start: NodeId) -> Result<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(order)
    }

    /// Depth of a node below the root (root = 0)
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent)?.parent;
        }
        Ok(depth)
    }

    /// Character content of a subtree.
    ///
    /// Token elements concatenate their text leaves; other elements
    /// concatenate the content of their children.
    pub fn text_content(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        if let Some(text) = &node.text {
            return Ok(text.clone());
        }
        let mut text = String::new();
        for child in &node.children {
            text.push_str(&self.text_content(*child)?);
        }
        Ok(text)
    }

    /// Find the node in a subtree whose semantic id is `semantic_id`.
    /// Token elements are not searched below.
    pub fn find_by_semantic_id(&self, start: NodeId, semantic_id: &str) -> Result<Option<NodeId>> {
        let node = self.node(start)?;
        let matches = node
            .attributes
            .get_explicit(SEMANTIC_ID)
            .map(|value| value.as_string() == semantic_id)
            .unwrap_or(false);
        if matches {
            return Ok(Some(start));
        }
        if !node.is_token() {
            for child in &node.children {
                if let Some(found) = self.find_by_semantic_id(*child, semantic_id)? {
                    return Ok(Some(found));
                }
            }
        }
        Ok(None)
    }

    // =========================================================================
    // Embellished operators
    // =========================================================================

    /// Whether the node is an operator or an operator decorated with scripts,
    /// fractions or rows around a single operator
    pub fn is_embellished_op(&self, id: NodeId) -> Result<bool> {
        match self.embellished_child(id)? {
            Some(child) if child == id => Ok(true),
            Some(child) => self.is_embellished_op(child),
            None => Ok(false),
        }
    }

    /// The immediate core of an embellished operator (the node itself otherwise)
    pub fn core(&self, id: NodeId) -> Result<NodeId> {
        if !self.is_embellished_op(id)? {
            return Ok(id);
        }
        Ok(self.embellished_child(id)?.unwrap_or(id))
    }

    /// The `mo` at the bottom of an embellished operator (the node itself otherwise)
    pub fn core_mo(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        loop {
            let next = self.core(current)?;
            if next == current {
                return Ok(current);
            }
            current = next;
        }
    }

    /// The child an embellished-operator check descends into.
    /// `Some(id)` for the node itself means "this is an operator".
    fn embellished_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        let node = self.node(id)?;
        let child = match node.kind {
            NodeKind::Mo => return Ok(Some(id)),
            NodeKind::Msub
            | NodeKind::Msup
            | NodeKind::Msubsup
            | NodeKind::Munder
            | NodeKind::Mover
            | NodeKind::Munderover
            | NodeKind::Mmultiscripts
            | NodeKind::Mfrac
            | NodeKind::Semantics => node.children.first().copied(),
            NodeKind::Maction => {
                let selection = node
                    .get("selection")
                    .and_then(|value| value.as_f64())
                    .unwrap_or(1.0) as usize;
                node.children.get(selection.saturating_sub(1)).copied()
            }
            NodeKind::Mrow
            | NodeKind::InferredMrow
            | NodeKind::Mstyle
            | NodeKind::Mphantom
            | NodeKind::Mpadded
            | NodeKind::TeXAtom
            | NodeKind::Math => {
                let mut core = None;
                for child in &node.children {
                    if self.node(*child)?.kind.is_space_like() {
                        continue;
                    }
                    if core.is_some() {
                        return Ok(None);
                    }
                    core = Some(*child);
                }
                core
            }
            _ => None,
        };
        Ok(child)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check parent/child links: every attached node has exactly one parent
    /// that lists it, and the root has none.
    pub fn validate(&self) -> Result<()> {
        if self.node(self.root)?.parent.is_some() {
            return Err(TreeError::TreeStructure("root has a parent".to_string()));
        }
        // stops at the first revisit, so cycles terminate
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if std::mem::replace(&mut seen[id.index()], true) {
                return Err(TreeError::TreeStructure(format!(
                    "node {id} is reachable twice"
                )));
            }
            for child in &node.children {
                if self.node(*child)?.parent != Some(id) {
                    return Err(TreeError::TreeStructure(format!(
                        "node {child} does not point back to parent {id}"
                    )));
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }
}
