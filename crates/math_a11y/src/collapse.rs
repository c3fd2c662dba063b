//! Collapsing of complex subexpressions
//!
//! While scores are computed, each node whose score exceeds the cutoff for
//! its semantic type is recorded as collapsed: it gets a marker and reports
//! the marker's small score upward. Some types first absorb a collapsed
//! child (restoring the child's true score) so that markers do not nest.
//! After scoring, every marker that survived becomes an `maction` toggle
//! showing the marker until expanded.

use crate::visitor::{complexity_of, ComplexityVisitor, COMPLEXITY};
use crate::{CollapseError, CollapseTables, Result};
use math_tree::properties::keys;
use math_tree::{AttributeSet, MathTree, NodeId, NodeKind, PropertyValue, SEMANTIC_PREFIX};
use std::sync::Arc;

pub const SEMANTIC_TYPE: &str = "data-semantic-type";
pub const SEMANTIC_ROLE: &str = "data-semantic-role";
pub const SEMANTIC_CHILDREN: &str = "data-semantic-children";
pub const SEMANTIC_CONTENT: &str = "data-semantic-content";
pub const COLLAPSIBLE: &str = "data-collapsible";

/// Brackets put around every marker
const MARKER_OPEN: char = '\u{25C2}';
const MARKER_CLOSE: char = '\u{25B8}';
/// Appended to the relation of a multi-relation marker
const ELLIPSIS: char = '\u{22EF}';

/// Per-type collapse decisions over shared tables
#[derive(Debug, Clone)]
pub struct Collapse {
    tables: Arc<CollapseTables>,
    /// Score of one marker character
    char_weight: f64,
}

impl Collapse {
    pub fn new(tables: Arc<CollapseTables>, char_weight: f64) -> Self {
        Self { tables, char_weight }
    }

    pub fn tables(&self) -> &CollapseTables {
        &self.tables
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Decide whether a freshly scored node collapses; returns the score to report
    pub fn check(
        &self,
        visitor: &ComplexityVisitor,
        tree: &mut MathTree,
        id: NodeId,
        complexity: f64,
    ) -> Result<f64> {
        let Some(semantic_type) = string_attribute(tree, id, SEMANTIC_TYPE)? else {
            return Ok(complexity);
        };
        match semantic_type.as_str() {
            "fenced" => self.check_fenced(visitor, tree, id, complexity),
            "appl" => self.check_appl(visitor, tree, id, complexity),
            "sqrt" => self.check_absorbing(visitor, tree, id, complexity, "sqrt", (0, 1)),
            "root" => self.check_absorbing(visitor, tree, id, complexity, "root", (0, 2)),
            "superscript" | "subscript" => {
                self.check_absorbing(visitor, tree, id, complexity, &semantic_type, (0, 2))
            }
            "subsup" => self.check_absorbing(visitor, tree, id, complexity, "subsup", (0, 3)),
            "enclose" => self.check_enclose(visitor, tree, id, complexity),
            "bigop" | "integral" => self.check_bigop(tree, id, complexity, &semantic_type),
            "relseq" | "multirel" => self.check_relation(tree, id, complexity, &semantic_type),
            _ if self.tables.has_cutoff(&semantic_type) => {
                self.default_check(tree, id, complexity, &semantic_type)
            }
            _ => Ok(complexity),
        }
    }

    fn cutoff(&self, tree: &MathTree, id: NodeId, semantic_type: &str) -> Result<Option<f64>> {
        let role = string_attribute(tree, id, SEMANTIC_ROLE)?;
        Ok(self.tables.cutoff(semantic_type, role.as_deref()))
    }

    fn exceeds(&self, tree: &MathTree, id: NodeId, complexity: f64, semantic_type: &str) -> Result<bool> {
        Ok(self
            .cutoff(tree, id, semantic_type)?
            .map(|cutoff| complexity > cutoff)
            .unwrap_or(false))
    }

    /// Collapse with the type's (role's) marker once over the cutoff
    fn default_check(&self, tree: &mut MathTree, id: NodeId, complexity: f64, semantic_type: &str) -> Result<f64> {
        if !self.exceeds(tree, id, complexity, semantic_type)? {
            return Ok(complexity);
        }
        let role = string_attribute(tree, id, SEMANTIC_ROLE)?;
        let marker = self.tables.marker(semantic_type, role.as_deref())?.to_string();
        self.record_collapse(tree, id, complexity, &marker)
    }

    /// Absorb a collapsed child, then check the node itself.
    /// `slot` is (child index, expected number of semantic children).
    fn check_absorbing(
        &self,
        visitor: &ComplexityVisitor,
        tree: &mut MathTree,
        id: NodeId,
        complexity: f64,
        semantic_type: &str,
        slot: (usize, usize),
    ) -> Result<f64> {
        let (child, expected) = slot;
        let complexity = self.uncollapse_child(visitor, tree, id, complexity, child, expected)?;
        self.default_check(tree, id, complexity, semantic_type)
    }

    /// Fences absorb their content; enclosing fences use their own delimiters as the marker
    fn check_fenced(&self, visitor: &ComplexityVisitor, tree: &mut MathTree, id: NodeId, complexity: f64) -> Result<f64> {
        let complexity = self.uncollapse_child(visitor, tree, id, complexity, 1, 1)?;
        let role = string_attribute(tree, id, SEMANTIC_ROLE)?;
        if !self.exceeds(tree, id, complexity, "fenced")? || role.as_deref() != Some("leftright") {
            return Ok(complexity);
        }
        let children = tree.children(id)?;
        let (Some(first), Some(last)) = (children.first().copied(), children.last().copied()) else {
            return Ok(complexity);
        };
        let marker = tree.text_content(first)? + &tree.text_content(last)?;
        self.record_collapse(tree, id, complexity, &marker)
    }

    /// A function applied to a collapsed argument collapses as a whole
    fn check_appl(&self, visitor: &ComplexityVisitor, tree: &mut MathTree, id: NodeId, complexity: f64) -> Result<f64> {
        if self.collapsed_child(tree, id, 2, 2)?.is_none() {
            return Ok(complexity);
        }
        let complexity = visitor.visit_node(tree, id, false)?;
        let role = string_attribute(tree, id, SEMANTIC_ROLE)?;
        let marker = self.tables.marker("appl", role.as_deref())?.to_string();
        self.record_collapse(tree, id, complexity, &marker)
    }

    /// An enclosure around a collapsed child takes over the child's marker
    fn check_enclose(&self, visitor: &ComplexityVisitor, tree: &mut MathTree, id: NodeId, complexity: f64) -> Result<f64> {
        let Some(child) = self.collapsed_child(tree, id, 0, 1)? else {
            return Ok(complexity);
        };
        let marker = text_property(tree, child, keys::COLLAPSE_MARKER).unwrap_or_default();
        self.restore_child(tree, id, child)?;
        let complexity = visitor.visit_node(tree, id, false)?;
        self.record_marker(tree, id, complexity, marker)
    }

    /// Large operators are marked with the operator they are built on
    fn check_bigop(&self, tree: &mut MathTree, id: NodeId, complexity: f64, semantic_type: &str) -> Result<f64> {
        let is_operator = tree.kind(id)? == NodeKind::Mo;
        if !self.exceeds(tree, id, complexity, semantic_type)? && is_operator {
            return Ok(complexity);
        }
        let content = split_attribute(tree, id, SEMANTIC_CONTENT)?;
        let reference = content.last().cloned().unwrap_or_default();
        let marker = self.referenced_text(tree, id, &reference)?;
        self.record_collapse(tree, id, complexity, &marker)
    }

    /// Relation sequences are marked with their first relation
    fn check_relation(&self, tree: &mut MathTree, id: NodeId, complexity: f64, semantic_type: &str) -> Result<f64> {
        if !self.exceeds(tree, id, complexity, semantic_type)? {
            return Ok(complexity);
        }
        let content = split_attribute(tree, id, SEMANTIC_CONTENT)?;
        let reference = content.first().cloned().unwrap_or_default();
        let mut marker = self.referenced_text(tree, id, &reference)?;
        if semantic_type == "multirel" {
            marker.push(ELLIPSIS);
        }
        self.record_collapse(tree, id, complexity, &marker)
    }

    /// Text of the operator at the core of the node a content id names
    fn referenced_text(&self, tree: &MathTree, id: NodeId, reference: &str) -> Result<String> {
        let target = tree
            .find_by_semantic_id(id, reference)?
            .ok_or_else(|| CollapseError::SemanticReferenceNotFound {
                node: id,
                id: reference.to_string(),
            })?;
        Ok(tree.text_content(tree.core_mo(target)?)?)
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Mark a node as collapsed behind `text`; returns the marker's score
    pub fn record_collapse(&self, tree: &mut MathTree, id: NodeId, complexity: f64, text: &str) -> Result<f64> {
        let marker = format!("{MARKER_OPEN}{text}{MARKER_CLOSE}");
        self.record_marker(tree, id, complexity, marker)
    }

    /// Mark a node with an already bracketed marker
    fn record_marker(&self, tree: &mut MathTree, id: NodeId, complexity: f64, marker: String) -> Result<f64> {
        tree.node(id)?;
        let reported = marker.chars().count() as f64 * self.char_weight;
        tracing::trace!(node = %id, complexity, reported, marker = %marker, "collapse recorded");
        let properties = tree.properties_mut();
        properties.set(id, keys::COLLAPSE_MARKER, marker);
        properties.set(id, keys::COLLAPSE_COMPLEXITY, complexity);
        Ok(reported)
    }

    /// Undo a collapse: the true score becomes the node's cached score
    pub fn unrecord_collapse(&self, tree: &mut MathTree, id: NodeId) -> Result<()> {
        let Some(complexity) = number_property(tree, id, keys::COLLAPSE_COMPLEXITY) else {
            return Ok(());
        };
        tracing::trace!(node = %id, complexity, "collapse absorbed");
        tree.attributes_mut(id)?.set(COMPLEXITY, complexity);
        let properties = tree.properties_mut();
        properties.remove(id, keys::COLLAPSE_COMPLEXITY);
        properties.remove(id, keys::COLLAPSE_MARKER);
        Ok(())
    }

    /// The n-th child if it is collapsed and the node has the expected number
    /// of semantic children. A single inferred row is looked through.
    fn collapsed_child(&self, tree: &MathTree, id: NodeId, n: usize, expected: usize) -> Result<Option<NodeId>> {
        if split_attribute(tree, id, SEMANTIC_CHILDREN)?.len() != expected {
            return Ok(None);
        }
        let holder = inferred_row(tree, id)?.unwrap_or(id);
        Ok(tree
            .children(holder)?
            .get(n)
            .copied()
            .filter(|child| tree.properties().has(*child, keys::COLLAPSE_MARKER)))
    }

    /// Restore a collapsed child and rescore the node from its true score
    fn uncollapse_child(
        &self,
        visitor: &ComplexityVisitor,
        tree: &mut MathTree,
        id: NodeId,
        complexity: f64,
        n: usize,
        expected: usize,
    ) -> Result<f64> {
        let Some(child) = self.collapsed_child(tree, id, n, expected)? else {
            return Ok(complexity);
        };
        self.restore_child(tree, id, child)?;
        visitor.visit_node(tree, id, false)
    }

    /// Undo a child's collapse. A row between the node and the child loses
    /// its cached score so the rescore sees the restored one.
    fn restore_child(&self, tree: &mut MathTree, id: NodeId, child: NodeId) -> Result<()> {
        self.unrecord_collapse(tree, child)?;
        if let Some(parent) = tree.parent(child)? {
            if parent != id {
                tree.attributes_mut(parent)?.unset(COMPLEXITY);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    /// Replace every node still carrying a marker by a toggle.
    /// Returns the number of toggles made.
    pub fn make_collapse(&self, tree: &mut MathTree) -> Result<usize> {
        let root = tree.root();
        let nodes: Vec<NodeId> = tree
            .walk(root)?
            .into_iter()
            .filter(|id| tree.properties().has(*id, keys::COLLAPSE_MARKER))
            .collect();
        for id in &nodes {
            self.make_action(tree, *id)?;
        }
        Ok(nodes.len())
    }

    /// Put a collapsed node inside an `maction` that first shows its marker
    pub fn make_action(&self, tree: &mut MathTree, id: NodeId) -> Result<NodeId> {
        let id = if id == tree.root() {
            self.add_mrow(tree, id)?
        } else {
            id
        };
        let marker = text_property(tree, id, keys::COLLAPSE_MARKER).unwrap_or_default();
        let parent = tree.parent(id)?.ok_or(CollapseError::Detached(id))?;
        let reported = tree.attributes(id)?.get_explicit(COMPLEXITY).cloned();

        let mut attributes = AttributeSet::from_pairs([("actiontype", "toggle")]);
        attributes.set("selection", 2.0);
        attributes.set(COLLAPSIBLE, true);
        if let Some(reported) = reported {
            attributes.set(COMPLEXITY, reported);
        }
        attributes.inherit_from(tree.attributes(id)?);
        let label = tree.create_token_with(
            NodeKind::Mtext,
            &marker,
            AttributeSet::from_pairs([("mathcolor", "blue")]),
        )?;
        let action = tree.create_element(NodeKind::Maction, attributes, &[label])?;

        if let Some(complexity) = number_property(tree, id, keys::COLLAPSE_COMPLEXITY) {
            tree.attributes_mut(id)?.set(COMPLEXITY, complexity);
        }
        let properties = tree.properties_mut();
        properties.remove(id, keys::COLLAPSE_MARKER);
        properties.remove(id, keys::COLLAPSE_COMPLEXITY);

        tree.replace_child(parent, id, action)?;
        tree.append_child(action, id)?;
        tracing::trace!(node = %id, action = %action, marker = %marker, "collapse materialized");
        Ok(action)
    }

    /// Move the root's content and semantic annotations into a new row
    /// that can be replaced in its parent
    fn add_mrow(&self, tree: &mut MathTree, root: NodeId) -> Result<NodeId> {
        let holder = inferred_row(tree, root)?.unwrap_or(root);
        let content = tree.children(holder)?.to_vec();
        let mrow = tree.create(NodeKind::Mrow, AttributeSet::new());
        tree.set_children(mrow, &content)?;
        tree.append_child(holder, mrow)?;

        let semantic = tree.attributes_mut(root)?.drain_prefixed(SEMANTIC_PREFIX);
        let attributes = tree.attributes_mut(mrow)?;
        for (name, value) in semantic {
            attributes.set(name, value);
        }

        for key in [keys::COLLAPSE_MARKER, keys::COLLAPSE_COMPLEXITY] {
            if let Some(value) = tree.properties_mut().remove(root, key) {
                tree.properties_mut().set(mrow, key, value);
            }
        }
        Ok(mrow)
    }
}

/// The inferred row holding a node's content, if it has one
fn inferred_row(tree: &MathTree, id: NodeId) -> Result<Option<NodeId>> {
    if !tree.kind(id)?.has_inferred_row() {
        return Ok(None);
    }
    Ok(match tree.children(id)? {
        [row] if tree.kind(*row)? == NodeKind::InferredMrow => Some(*row),
        _ => None,
    })
}

fn string_attribute(tree: &MathTree, id: NodeId, name: &str) -> Result<Option<String>> {
    Ok(tree
        .attributes(id)?
        .get_explicit(name)
        .map(|value| value.as_string()))
}

/// A comma-separated attribute as a list (one empty entry when unset)
fn split_attribute(tree: &MathTree, id: NodeId, name: &str) -> Result<Vec<String>> {
    Ok(string_attribute(tree, id, name)?
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect())
}

fn text_property(tree: &MathTree, id: NodeId, key: &str) -> Option<String> {
    tree.properties()
        .get(id, key)
        .and_then(PropertyValue::as_text)
        .map(str::to_string)
}

fn number_property(tree: &MathTree, id: NodeId, key: &str) -> Option<f64> {
    tree.properties().get(id, key).and_then(PropertyValue::as_number)
}
