//! `mspace`

use crate::emitter::Emitter;
use crate::lengths::em;
use crate::pass::LayoutPass;
use crate::wrapper::WrapperId;
use crate::Result;

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    let node = pass.wrapper(id).node;
    let length = |pass: &LayoutPass<'_, E>, name: &str| -> Result<f64> {
        let value = pass.ctx.string_attribute(node, name)?.unwrap_or_default();
        Ok(pass.length2em(id, &value, 0.0))
    };
    let w = length(pass, "width")?;
    let h = length(pass, "height")?;
    let d = length(pass, "depth")?;

    let container = pass.standard_container(id, parent)?;
    if w < 0.0 {
        pass.emitter.set_style(&container, "margin-right", &em(w));
    } else if w > 0.0 {
        pass.emitter.set_style(&container, "width", &em(w));
    }
    if h + d != 0.0 {
        pass.emitter.set_style(&container, "height", &em(h + d));
    }
    if d != 0.0 {
        pass.emitter.set_style(&container, "vertical-align", &em(-d));
    }

    let mut bbox = pass.bbox(id);
    bbox.w = w;
    bbox.h = h;
    bbox.d = d;
    pass.set_bbox(id, bbox);
    Ok(container)
}
