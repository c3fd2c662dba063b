//! Token elements (`mi`, `mo`, `mn`, `mtext`, `ms`, `mglyph`)
//!
//! A token's box is the row of its text leaves, so its italic correction is
//! the one of the final glyph. `ms` is wrapped in its quote strings.

use super::text;
use crate::emitter::Emitter;
use crate::pass::LayoutPass;
use crate::wrapper::WrapperId;
use crate::Result;
use math_tree::NodeKind;

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    if pass.wrapper(id).kind != NodeKind::Ms {
        return pass.emit_default(id, parent, false);
    }

    let node = pass.wrapper(id).node;
    let variant = pass.wrapper(id).variant.clone();
    let lquote = pass.ctx.string_attribute(node, "lquote")?.unwrap_or_default();
    let rquote = pass.ctx.string_attribute(node, "rquote")?.unwrap_or_default();

    let container = pass.standard_container(id, parent)?;
    let left = pass.emitter.create_text(&lquote);
    pass.emitter.append_child(&container, &left);
    pass.emit_children(id, &container, false)?;
    let right = pass.emitter.create_text(&rquote);
    pass.emitter.append_child(&container, &right);

    let lbox = text::measure(pass, &variant, &lquote);
    let rbox = text::measure(pass, &variant, &rquote);
    for child in pass.wrapper(id).children.clone() {
        let offset = pass.wrapper(child).offset;
        pass.place(child, offset.x + lbox.w, offset.y);
    }
    let mut bbox = lbox;
    let inner = pass.bbox(id);
    bbox.w += inner.w;
    bbox.h = bbox.h.max(inner.h);
    bbox.d = bbox.d.max(inner.d);
    bbox.append(&rbox);
    bbox.scale = inner.scale;
    bbox.rscale = inner.rscale;
    pass.set_bbox(id, bbox);
    Ok(container)
}
