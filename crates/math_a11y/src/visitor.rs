//! Complexity scoring
//!
//! Scores are computed bottom-up and cached on each node as the
//! `data-semantic-complexity` attribute; a node that already carries a score
//! is not scored again. When collapsing is enabled, every saved score is
//! first passed through [`Collapse::check`], which may replace it by the
//! (small) score of a collapse marker.

use crate::collapse::Collapse;
use crate::{CollapseConfig, ComplexityOptions, ComplexityWeights, Result};
use math_tree::{MathTree, NodeId, NodeKind};
use std::sync::Arc;

/// Attribute caching a node's complexity
pub const COMPLEXITY: &str = "data-semantic-complexity";

/// Scores nodes and drives the collapse engine
#[derive(Debug, Clone)]
pub struct ComplexityVisitor {
    options: ComplexityOptions,
    weights: Arc<ComplexityWeights>,
    collapse: Collapse,
}

impl Default for ComplexityVisitor {
    fn default() -> Self {
        Self::new(&CollapseConfig::default())
    }
}

impl ComplexityVisitor {
    pub fn new(config: &CollapseConfig) -> Self {
        let weights = Arc::new(config.weights.clone());
        let collapse = Collapse::new(Arc::new(config.tables.clone()), config.weights.text);
        Self {
            options: config.options.clone(),
            weights,
            collapse,
        }
    }

    /// Build a visitor around shared tables and weights
    pub fn with_shared(
        options: ComplexityOptions,
        weights: Arc<ComplexityWeights>,
        collapse: Collapse,
    ) -> Self {
        Self {
            options,
            weights,
            collapse,
        }
    }

    pub fn options(&self) -> &ComplexityOptions {
        &self.options
    }

    pub fn weights(&self) -> &ComplexityWeights {
        &self.weights
    }

    pub fn collapse(&self) -> &Collapse {
        &self.collapse
    }

    /// Score the whole tree and, if enabled, turn collapsed nodes into toggles.
    /// Returns the root's (possibly collapsed) complexity.
    pub fn visit_tree(&self, tree: &mut MathTree) -> Result<f64> {
        tracing::debug!(tree = %tree.id(), nodes = tree.len(), "complexity pass started");
        let root = tree.root();
        let complexity = self.visit_node(tree, root, true)?;
        let collapsed = if self.options.make_collapsible {
            self.collapse.make_collapse(tree)?
        } else {
            0
        };
        tracing::debug!(tree = %tree.id(), complexity, collapsed, "complexity pass finished");
        Ok(complexity)
    }

    /// Score a node. With `save`, the score is checked for collapsing and
    /// cached; without it, the node's own score is only computed (its
    /// children are still cached).
    pub fn visit_node(&self, tree: &mut MathTree, id: NodeId, save: bool) -> Result<f64> {
        if let Some(cached) = cached(tree, id)? {
            return Ok(cached);
        }
        let w = &*self.weights;
        let node = tree.node(id)?;
        let kind = node.kind();
        let children = node.children().to_vec();

        let complexity = match kind {
            NodeKind::Text => return Ok(0.0),
            NodeKind::Mglyph => w.glyph,
            NodeKind::Mphantom => w.phantom,
            NodeKind::Annotation | NodeKind::AnnotationXml => w.xml,
            _ if kind.is_token() => {
                let length = tree.text_content(id)?.chars().count() as f64;
                w.text * length + w.token
            }
            NodeKind::Mfrac => self.children_complexity(tree, &children)? * w.script + w.fraction,
            NodeKind::Msqrt => self.children_complexity(tree, &children)? + w.sqrt,
            NodeKind::Mroot => {
                let index = children.get(1).copied();
                let sum = self.children_complexity(tree, &children)?;
                let index = match index {
                    Some(index) => complexity_of(tree, index)?,
                    None => 0.0,
                };
                sum + w.sqrt - (1.0 - w.script) * index
            }
            NodeKind::Msub => self.scripts_complexity(tree, &children, Some(1), None, w.subsup)?,
            NodeKind::Msup => self.scripts_complexity(tree, &children, None, Some(1), w.subsup)?,
            NodeKind::Msubsup => self.scripts_complexity(tree, &children, Some(1), Some(2), w.subsup)?,
            NodeKind::Munder => self.scripts_complexity(tree, &children, Some(1), None, w.underover)?,
            NodeKind::Mover => self.scripts_complexity(tree, &children, None, Some(1), w.underover)?,
            NodeKind::Munderover => {
                self.scripts_complexity(tree, &children, Some(1), Some(2), w.underover)?
            }
            NodeKind::Menclose => self.children_complexity(tree, &children)? + w.enclose,
            NodeKind::Maction => {
                self.children_complexity(tree, &children)?;
                let selection = tree
                    .node(id)?
                    .get("selection")
                    .and_then(|value| value.as_f64())
                    .unwrap_or(1.0);
                let index = (selection.max(1.0) as usize).saturating_sub(1);
                match children.get(index) {
                    Some(child) => complexity_of(tree, *child)?,
                    None => 0.0,
                }
            }
            NodeKind::Semantics => match children.first() {
                Some(child) => {
                    self.visit_node(tree, *child, true)?;
                    complexity_of(tree, *child)?
                }
                None => 0.0,
            },
            _ => self.children_complexity(tree, &children)?,
        };
        self.set_complexity(tree, id, complexity, save)
    }

    /// Check and cache a score
    fn set_complexity(&self, tree: &mut MathTree, id: NodeId, complexity: f64, save: bool) -> Result<f64> {
        if !save {
            return Ok(complexity);
        }
        let complexity = if self.options.identify_collapsible {
            self.collapse.check(self, tree, id, complexity)?
        } else {
            complexity
        };
        tree.attributes_mut(id)?.set(COMPLEXITY, complexity);
        Ok(complexity)
    }

    /// Sum of the children's scores, plus a per-child weight for rows
    fn children_complexity(&self, tree: &mut MathTree, children: &[NodeId]) -> Result<f64> {
        let mut complexity = 0.0;
        for child in children {
            self.visit_node(tree, *child, true)?;
            complexity += complexity_of(tree, *child)?;
        }
        if children.len() > 1 {
            complexity += children.len() as f64 * self.weights.child;
        }
        Ok(complexity)
    }

    /// Base plus the largest script scaled down, with a weight per script
    fn scripts_complexity(
        &self,
        tree: &mut MathTree,
        children: &[NodeId],
        under: Option<usize>,
        over: Option<usize>,
        weight: f64,
    ) -> Result<f64> {
        for child in children {
            self.visit_node(tree, *child, true)?;
        }
        let w = &*self.weights;
        let mut largest: f64 = 0.0;
        let mut scripts = 0.0;
        for slot in [under, over].into_iter().flatten() {
            if let Some(script) = children.get(slot) {
                largest = largest.max(complexity_of(tree, *script)?);
                scripts += 1.0;
            }
        }
        let mut complexity = largest * w.script + w.child * scripts;
        if let Some(base) = children.first() {
            complexity += complexity_of(tree, *base)? + w.child;
        }
        Ok(complexity + weight)
    }
}

/// The cached score of a node
fn cached(tree: &MathTree, id: NodeId) -> Result<Option<f64>> {
    Ok(tree
        .attributes(id)?
        .get_explicit(COMPLEXITY)
        .and_then(|value| value.as_f64()))
}

/// The score of an already visited node (0 if it has none)
pub(crate) fn complexity_of(tree: &MathTree, id: NodeId) -> Result<f64> {
    Ok(cached(tree, id)?.unwrap_or(0.0))
}
