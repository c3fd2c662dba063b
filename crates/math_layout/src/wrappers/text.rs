//! Character data

use crate::bbox::BBox;
use crate::emitter::Emitter;
use crate::pass::LayoutPass;
use crate::wrapper::{WrapperId, EXPLICIT_FONT};
use crate::Result;

/// Measure a string in a variant. Explicit fonts are measured as normal text.
pub(crate) fn measure(pass: &LayoutPass<'_, impl Emitter>, variant: &str, text: &str) -> BBox {
    let variant = if variant == EXPLICIT_FONT || variant.is_empty() {
        "normal"
    } else {
        variant
    };
    let mut bbox = BBox::empty();
    for c in text.chars() {
        let glyph = pass.ctx.font.measure(variant, c);
        bbox.w += glyph.w;
        bbox.h = bbox.h.max(glyph.h);
        bbox.d = bbox.d.max(glyph.d);
        bbox.ic = glyph.ic;
    }
    bbox
}

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    let wrapper = pass.wrapper(id);
    let text = pass.ctx.tree.node(wrapper.node)?.text().unwrap_or_default().to_string();
    let mut bbox = measure(pass, &wrapper.variant, &text);
    bbox.scale = wrapper.bbox.scale;
    bbox.rscale = wrapper.bbox.rscale;
    pass.set_bbox(id, bbox);

    let node = pass.emitter.create_text(&text);
    pass.emitter.append_child(parent, &node);
    Ok(node)
}
