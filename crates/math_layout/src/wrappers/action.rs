//! `maction`
//!
//! Only the selected child is laid out. Toggles expose their state to the
//! backend so it can switch between the children.

use crate::emitter::Emitter;
use crate::pass::LayoutPass;
use crate::wrapper::WrapperId;
use crate::Result;

/// The selected child, with `selection` clamped to the children present
pub(crate) fn selected<E: Emitter>(pass: &LayoutPass<'_, E>, id: WrapperId) -> Result<Option<(usize, WrapperId)>> {
    let wrapper = pass.wrapper(id);
    let count = wrapper.children.len();
    if count == 0 {
        return Ok(None);
    }
    let selection = pass
        .ctx
        .tree
        .attribute(wrapper.node, "selection")?
        .and_then(|value| value.as_f64())
        .unwrap_or(1.0);
    let selection = (selection.max(1.0) as usize).min(count);
    Ok(Some((selection, wrapper.children[selection - 1])))
}

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    let container = pass.standard_container(id, parent)?;
    let mut bbox = pass.bbox(id);
    bbox.clear();
    let selection = selected(pass, id)?;
    if let Some((_, child)) = selection {
        pass.place(child, 0.0, 0.0);
        pass.emit(child, &container)?;
        bbox.append(&pass.bbox(child));
    }
    pass.set_bbox(id, bbox);

    let node = pass.wrapper(id).node;
    let actiontype = pass
        .ctx
        .string_attribute(node, "actiontype")?
        .unwrap_or_else(|| "toggle".to_string());
    if actiontype == "toggle" {
        pass.emitter.set_attribute(&container, "actiontype", "toggle");
        let index = selection.map(|(index, _)| index).unwrap_or(1);
        pass.emitter
            .set_attribute(&container, "selection", &index.to_string());
    }
    Ok(container)
}
