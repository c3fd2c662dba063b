//! One layout pass: emission of the wrapper tree
//!
//! Every wrapper is emitted into a parent output node. The generic emission
//! creates the node's container, applies styles, colors, scale, copied
//! attributes and the variant class, then emits the children left to right
//! while accumulating the bounding box.

use crate::bbox::{BBox, Point};
use crate::emitter::Emitter;
use crate::factory::WrapperFactory;
use crate::lengths;
use crate::wrapper::{WrapContext, Wrapper, WrapperClass, WrapperId, EXPLICIT_FONT};
use crate::wrappers;
use crate::{LayoutError, Result};
use math_tree::NodeKind;

/// Container kind used for synthetic and placeholder containers
pub(crate) const BOX: &str = "box";

/// State of one pass over one tree
pub struct LayoutPass<'a, E: Emitter> {
    pub(crate) ctx: WrapContext<'a>,
    pub(crate) factory: WrapperFactory,
    pub(crate) emitter: &'a mut E,
}

impl<'a, E: Emitter> LayoutPass<'a, E> {
    pub(crate) fn new(ctx: WrapContext<'a>, factory: WrapperFactory, emitter: &'a mut E) -> Self {
        Self {
            ctx,
            factory,
            emitter,
        }
    }

    pub fn wrapper(&self, id: WrapperId) -> &Wrapper {
        self.factory.get(id)
    }

    /// Current box of a wrapper
    pub fn bbox(&self, id: WrapperId) -> BBox {
        self.factory.get(id).bbox
    }

    pub(crate) fn set_bbox(&mut self, id: WrapperId, bbox: BBox) {
        self.factory.get_mut(id).bbox = bbox;
    }

    /// Record where a wrapper sits relative to its parent's origin
    pub(crate) fn place(&mut self, id: WrapperId, x: f64, y: f64) {
        self.factory.get_mut(id).offset = Point::new(x, y);
    }

    /// The n-th child wrapper
    pub fn child(&self, id: WrapperId, n: usize) -> Option<WrapperId> {
        self.factory.get(id).children.get(n).copied()
    }

    /// The wrapper of the `mo` at the core of a wrapper's node
    pub fn core_mo(&self, id: WrapperId) -> Result<WrapperId> {
        let node = self.factory.get(id).node;
        let core = self.ctx.tree.core_mo(node)?;
        self.factory
            .wrapper_for(core)
            .ok_or_else(|| LayoutError::Unwrapped {
                kind: self.ctx.tree.kind(core).unwrap_or(NodeKind::Mo),
                node: core,
            })
    }

    /// Convert a length at a wrapper's scale
    pub fn length2em(&self, id: WrapperId, length: &str, size: f64) -> f64 {
        self.ctx.length2em(length, size, self.factory.get(id).bbox.scale)
    }

    /// Emit a wrapper into `parent`, returning its output node
    pub fn emit(&mut self, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
        let class = self.factory.get(id).class;
        let node = match class {
            WrapperClass::Default => self.emit_default(id, parent, false)?,
            WrapperClass::Text => wrappers::text::emit(self, id, parent)?,
            WrapperClass::Token => wrappers::token::emit(self, id, parent)?,
            WrapperClass::Space => wrappers::space::emit(self, id, parent)?,
            WrapperClass::Scripts(kind) => wrappers::msubsup::emit(self, id, parent, kind)?,
            WrapperClass::UnderOver => wrappers::munderover::emit(self, id, parent)?,
            WrapperClass::Multiscripts => wrappers::mmultiscripts::emit(self, id, parent)?,
            WrapperClass::Action => wrappers::action::emit(self, id, parent)?,
            WrapperClass::TableCell => wrappers::tablecell::emit(self, id, parent)?,
        };
        let wrapper = self.factory.get_mut(id);
        wrapper.emitted = true;
        tracing::trace!(
            node = %wrapper.node,
            kind = %wrapper.kind,
            w = wrapper.bbox.w,
            h = wrapper.bbox.h,
            d = wrapper.bbox.d,
            "emitted wrapper"
        );
        Ok(node)
    }

    /// Container, decorations and children laid out in a row
    pub(crate) fn emit_default(&mut self, id: WrapperId, parent: &E::Node, force_child: bool) -> Result<E::Node> {
        let container = self.standard_container(id, parent)?;
        self.emit_children(id, &container, force_child)?;
        Ok(container)
    }

    /// Create the wrapper's container and apply its decorations.
    /// Inferred rows emit into their parent's container.
    pub(crate) fn standard_container(&mut self, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
        let kind = self.factory.get(id).kind;
        if kind == NodeKind::InferredMrow {
            return Ok(parent.clone());
        }
        let container = self.emitter.append_container(parent, kind.as_str());
        self.handle_style(id, &container);
        self.handle_color(id, &container)?;
        self.handle_scale(id, &container);
        self.handle_attributes(id, &container)?;
        if kind.is_token() {
            self.handle_token(id, &container)?;
        }
        Ok(container)
    }

    /// Emit every child in order, growing the wrapper's box as a row
    pub(crate) fn emit_children(&mut self, id: WrapperId, container: &E::Node, force_child: bool) -> Result<()> {
        let mut bbox = self.factory.get(id).bbox;
        bbox.clear();
        let children = self.factory.get(id).children.clone();
        for child in &children {
            self.place(*child, bbox.w, 0.0);
            self.emit(*child, container)?;
            bbox.append(&self.bbox(*child));
        }
        if force_child && !self.has_content(id) {
            self.emitter.append_container(container, BOX);
        }
        self.set_bbox(id, bbox);
        Ok(())
    }

    /// Whether anything but empty inferred rows sits below a wrapper
    fn has_content(&self, id: WrapperId) -> bool {
        self.factory.get(id).children.iter().any(|child| {
            let wrapper = self.factory.get(*child);
            wrapper.kind != NodeKind::InferredMrow || self.has_content(*child)
        })
    }

    fn handle_style(&mut self, id: WrapperId, container: &E::Node) {
        let css = self.factory.get(id).styles.css_text();
        if !css.is_empty() {
            self.emitter.set_attribute(container, "style", &css);
        }
    }

    fn handle_color(&mut self, id: WrapperId, container: &E::Node) -> Result<()> {
        let node = self.factory.get(id).node;
        let attributes = self.ctx.tree.attributes(node)?;
        let explicit = |name: &str| attributes.get_explicit(name).map(|value| value.as_string());
        if let Some(color) = explicit("mathcolor").or_else(|| explicit("color")) {
            self.emitter.set_style(container, "color", &color);
        }
        if let Some(background) = explicit("mathbackground").or_else(|| explicit("background")) {
            self.emitter.set_style(container, "background-color", &background);
        }
        Ok(())
    }

    fn handle_scale(&mut self, id: WrapperId, container: &E::Node) {
        let rscale = self.factory.get(id).bbox.rscale;
        if (rscale - 1.0).abs() >= 0.001 {
            self.emitter
                .set_style(container, "font-size", &lengths::percent(rscale));
        }
    }

    /// Copy author attributes that have no other treatment
    fn handle_attributes(&mut self, id: WrapperId, container: &E::Node) -> Result<()> {
        let wrapper = self.factory.get(id);
        let (node, kind) = (wrapper.node, wrapper.kind);
        let options = self.ctx.options;
        let attributes = self.ctx.tree.attributes(node)?;
        for (name, value) in attributes.explicit() {
            if value.is_empty() {
                continue;
            }
            let copy = options.forces(name)
                || (!math_tree::has_default(kind, name)
                    && !options.skips(name)
                    && !self.emitter.has_attribute(container, name));
            if copy {
                self.emitter
                    .set_attribute(container, name, &value.as_string());
            }
        }
        if let Some(class) = self.ctx.string_attribute(node, "class")? {
            self.emitter.add_class(container, &class);
        }
        Ok(())
    }

    fn handle_token(&mut self, id: WrapperId, container: &E::Node) -> Result<()> {
        let variant = self.factory.get(id).variant.as_str();
        if variant != "normal" && variant != EXPLICIT_FONT && !variant.is_empty() {
            let class = self.ctx.options.variant_class(variant)?;
            self.emitter.add_class(container, class);
        }
        Ok(())
    }
}
