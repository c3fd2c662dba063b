//! Layout engine
//!
//! Runs one layout pass per call: a fresh wrapper factory wraps the tree,
//! the wrappers are emitted into the backend, and the positioned boxes are
//! collected from the emitted wrappers.

use crate::bbox::{BBox, Point};
use crate::emitter::Emitter;
use crate::factory::{WrapperFactory, WrapperRegistry};
use crate::fonts::{FontMetrics, TexFont};
use crate::lengths;
use crate::pass::LayoutPass;
use crate::wrapper::{WrapContext, WrapperId};
use crate::{LayoutOptions, Result};
use math_tree::{MathTree, NodeId, NodeKind};
use serde::Serialize;
use std::sync::Arc;

/// Kind of the container that receives a whole expression
pub const OUTPUT_CONTAINER: &str = "container";

/// A laid-out node: where it sits in its parent and how big it is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedBox {
    pub node: NodeId,
    pub kind: NodeKind,
    /// Offset of the origin from the parent's origin, in the parent's ems
    pub offset: Point,
    /// Box in the node's own ems (`rscale` converts to the parent's)
    pub bbox: BBox,
    pub children: Vec<PositionedBox>,
}

impl PositionedBox {
    /// The box of a node, searching depth-first
    pub fn find(&self, node: NodeId) -> Option<&PositionedBox> {
        if self.node == node {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(node))
    }

    /// All boxes in pre-order
    pub fn walk(&self) -> Vec<&PositionedBox> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(current.children.iter().rev());
        }
        out
    }
}

/// Result of a layout pass
#[derive(Debug, Clone)]
pub struct Layout<N> {
    /// The backend container holding the expression
    pub output: N,
    /// Positioned box tree of every emitted node
    pub root: PositionedBox,
    /// Box of the whole expression
    pub bbox: BBox,
}

/// Lays out math trees with one font, one set of options and one registry
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    font: Arc<dyn FontMetrics>,
    options: LayoutOptions,
    registry: Arc<WrapperRegistry>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Arc::new(TexFont::new()), LayoutOptions::default())
    }
}

impl LayoutEngine {
    pub fn new(font: Arc<dyn FontMetrics>, options: LayoutOptions) -> Self {
        Self {
            font,
            options,
            registry: Arc::new(WrapperRegistry::standard()),
        }
    }

    pub fn with_font(mut self, font: Arc<dyn FontMetrics>) -> Self {
        self.font = font;
        self
    }

    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: Arc<WrapperRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn font(&self) -> &dyn FontMetrics {
        self.font.as_ref()
    }

    /// Lay out a tree into a new output container.
    ///
    /// Inherited attributes must be current
    /// (see [`MathTree::set_inherited_attributes`]).
    pub fn layout<E: Emitter>(&self, tree: &MathTree, emitter: &mut E) -> Result<Layout<E::Node>> {
        tracing::debug!(tree = %tree.id(), nodes = tree.len(), "layout pass started");

        let ctx = WrapContext::new(tree, self.font.as_ref(), &self.options);
        let mut factory = WrapperFactory::new(Arc::clone(&self.registry));
        let root = factory.wrap(&ctx, tree.root(), None)?;

        let output = emitter.create_container(OUTPUT_CONTAINER);
        if (self.options.scale - 1.0).abs() >= 0.001 {
            emitter.set_style(&output, "font-size", &lengths::percent(self.options.scale));
        }
        let mut pass = LayoutPass::new(ctx, factory, emitter);
        pass.emit(root, &output)?;

        let root_box = positioned(&pass.factory, root);
        let bbox = root_box.bbox;
        tracing::debug!(
            tree = %tree.id(),
            wrappers = pass.factory.len(),
            w = bbox.w,
            h = bbox.h,
            d = bbox.d,
            "layout pass finished"
        );
        Ok(Layout {
            output,
            root: root_box,
            bbox,
        })
    }
}

fn positioned(factory: &WrapperFactory, id: WrapperId) -> PositionedBox {
    let wrapper = factory.get(id);
    PositionedBox {
        node: wrapper.node(),
        kind: wrapper.kind(),
        offset: wrapper.offset(),
        bbox: *wrapper.bbox(),
        children: wrapper
            .children()
            .iter()
            .filter(|child| factory.get(**child).emitted)
            .map(|child| positioned(factory, *child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkupEmitter;
    use math_tree::AttributeSet;

    #[test]
    fn test_layout_row() {
        let mut tree = MathTree::new(NodeKind::Math);
        let a = tree.create_token(NodeKind::Mi, "a").unwrap();
        let plus = tree.create_token(NodeKind::Mo, "+").unwrap();
        let b = tree.create_token(NodeKind::Mi, "b").unwrap();
        let row = tree
            .create_element(NodeKind::Mrow, AttributeSet::new(), &[a, plus, b])
            .unwrap();
        let root = tree.root();
        tree.append_child(root, row).unwrap();
        tree.set_inherited_attributes().unwrap();

        let mut emitter = MarkupEmitter::new();
        let layout = LayoutEngine::default().layout(&tree, &mut emitter).unwrap();

        let a_box = layout.root.find(a).unwrap();
        let plus_box = layout.root.find(plus).unwrap();
        let b_box = layout.root.find(b).unwrap();
        assert_eq!(a_box.offset.x, 0.0);
        assert!((plus_box.offset.x - a_box.bbox.w).abs() < 1e-9);
        assert!((b_box.offset.x - (a_box.bbox.w + plus_box.bbox.w)).abs() < 1e-9);
        assert!((layout.bbox.w - (a_box.bbox.w + plus_box.bbox.w + b_box.bbox.w)).abs() < 1e-9);
        assert_eq!(emitter.text_content(layout.output), "a+b");
    }

    #[test]
    fn test_scale_on_output_container() {
        let mut tree = MathTree::new(NodeKind::Math);
        let x = tree.create_token(NodeKind::Mi, "x").unwrap();
        let root = tree.root();
        tree.append_child(root, x).unwrap();
        tree.set_inherited_attributes().unwrap();

        let options = LayoutOptions {
            scale: 1.5,
            ..LayoutOptions::default()
        };
        let engine = LayoutEngine::default().with_options(options);
        let mut emitter = MarkupEmitter::new();
        let layout = engine.layout(&tree, &mut emitter).unwrap();
        let output = emitter.element(layout.output).unwrap();
        assert_eq!(output.tag, "mx-container");
        assert_eq!(output.style("font-size"), Some("150%"));
    }
}
