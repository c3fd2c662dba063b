//! `munder`, `mover` and `munderover`
//!
//! Scripts are stacked above and below the base, unless the base is an
//! operator with movable limits outside display style, in which case the
//! element is laid out as ordinary sub/superscripts and tagged
//! `limits="false"`.

use super::msubsup::{emit_scripts, required_child};
use crate::bbox::BBox;
use crate::emitter::Emitter;
use crate::lengths::em;
use crate::pass::{LayoutPass, BOX};
use crate::wrapper::WrapperId;
use crate::Result;
use math_tree::NodeKind;

/// Characters that draw a horizontal line when used as accents
const LINE_ACCENTS: &[&str] = &["\u{2015}", "\u{203E}", "\u{00AF}"];

const ROW: &str = "row";
const BASE: &str = "base";
const UNDER: &str = "under";
const OVER: &str = "over";

/// Child layout of one under/over element
#[derive(Debug, Clone, Copy)]
struct Slots {
    base: WrapperId,
    under: Option<WrapperId>,
    over: Option<WrapperId>,
}

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    let kind = pass.wrapper(id).kind;
    let base = required_child(pass, id, 0)?;
    let slots = match kind {
        NodeKind::Munder => Slots {
            base,
            under: Some(required_child(pass, id, 1)?),
            over: None,
        },
        NodeKind::Mover => Slots {
            base,
            under: None,
            over: Some(required_child(pass, id, 1)?),
        },
        _ => Slots {
            base,
            under: Some(required_child(pass, id, 1)?),
            over: Some(required_child(pass, id, 2)?),
        },
    };

    if has_movable_limits(pass, id, base)? {
        let container = emit_scripts(pass, id, parent, base, slots.under, slots.over)?;
        pass.emitter.set_attribute(&container, "limits", "false");
        return Ok(container);
    }
    emit_stacked(pass, id, parent, slots)
}

/// Whether the base's operator moves its limits to script position here
pub(crate) fn has_movable_limits<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    base: WrapperId,
) -> Result<bool> {
    if flag(pass, id, "displaystyle")? {
        return Ok(false);
    }
    let core = pass.core_mo(base)?;
    Ok(pass.wrapper(core).kind == NodeKind::Mo && flag(pass, core, "movablelimits")?)
}

/// A boolean attribute of a wrapper's node
fn flag<E: Emitter>(pass: &LayoutPass<'_, E>, id: WrapperId, name: &str) -> Result<bool> {
    Ok(pass
        .ctx
        .tree
        .attribute(pass.wrapper(id).node, name)?
        .map(|value| value.as_bool())
        .unwrap_or(false))
}

/// Whether a script is an accent drawn as a horizontal line
fn is_line_accent<E: Emitter>(pass: &LayoutPass<'_, E>, script: WrapperId) -> Result<bool> {
    let core = pass.core_mo(script)?;
    let core = pass.wrapper(core);
    if core.kind != NodeKind::Mo {
        return Ok(false);
    }
    let text = pass.ctx.tree.text_content(core.node)?;
    Ok(LINE_ACCENTS.contains(&text.as_str()))
}

/// Kern between base and over script, and the over script's shift
fn over_ku<E: Emitter>(pass: &LayoutPass<'_, E>, accent: bool, line: bool, base: &BBox, over: &BBox) -> (f64, f64) {
    let tex = pass.ctx.font.params();
    let t = if line {
        3.0 * tex.rule_thickness
    } else {
        tex.rule_thickness * tex.separation_factor
    };
    let k = if accent {
        t
    } else {
        tex.big_op_spacing1.max(tex.big_op_spacing3 - over.d.max(0.0))
    };
    (k, base.h + k + over.d)
}

/// Kern between base and under script, and the under script's shift
fn under_kv<E: Emitter>(pass: &LayoutPass<'_, E>, accent: bool, line: bool, base: &BBox, under: &BBox) -> (f64, f64) {
    let tex = pass.ctx.font.params();
    let t = if line {
        3.0 * tex.rule_thickness
    } else {
        tex.rule_thickness * tex.separation_factor
    };
    let k = if accent {
        t
    } else {
        tex.big_op_spacing2.max(tex.big_op_spacing4 - under.h)
    };
    (k, -(base.d + k + under.h))
}

/// Horizontal offsets of the rows for an alignment, shifted so none is negative
pub(crate) fn delta_w(align: &str, widths: &[f64], deltas: &[f64]) -> Vec<f64> {
    let w = widths.iter().copied().fold(0.0, f64::max);
    let mut dw: Vec<f64> = widths
        .iter()
        .zip(deltas)
        .map(|(width, delta)| {
            let offset = match align {
                "left" => 0.0,
                "right" => w - width,
                _ => (w - width) / 2.0,
            };
            offset + delta
        })
        .collect();
    let min = dw.iter().copied().fold(0.0, f64::min);
    if min < 0.0 {
        for x in &mut dw {
            *x -= min;
        }
    }
    dw
}

fn emit_stacked<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node, slots: Slots) -> Result<E::Node> {
    let container = pass.standard_container(id, parent)?;
    let accent = slots.over.is_some() && flag(pass, id, "accent")?;
    let accent_under = slots.under.is_some() && flag(pass, id, "accentunder")?;

    // Output structure: over slot, then base and under rows
    let over_slot = match slots.over {
        Some(over) => {
            let slot = pass.emitter.append_container(&container, OVER);
            pass.emit(over, &slot)?;
            Some(slot)
        }
        None => None,
    };
    let table = if slots.over.is_some() && slots.under.is_some() {
        pass.emitter.append_container(&container, BOX)
    } else {
        container.clone()
    };
    let base_slot = if slots.under.is_some() {
        let row = pass.emitter.append_container(&table, ROW);
        pass.emitter.append_container(&row, BASE)
    } else {
        pass.emitter.append_container(&table, BASE)
    };
    pass.emit(slots.base, &base_slot)?;
    let under_slot = match slots.under {
        Some(under) => {
            let row = pass.emitter.append_container(&table, ROW);
            let slot = pass.emitter.append_container(&row, UNDER);
            pass.emit(under, &slot)?;
            Some(slot)
        }
        None => None,
    };

    let tex = pass.ctx.font.params().clone();
    let mut base_box = pass.bbox(slots.base).outer();
    if accent && base_box.h < tex.x_height {
        pass.emitter
            .set_style(&base_slot, "padding-top", &em(tex.x_height - base_box.h));
        base_box.h = tex.x_height;
    }
    let delta = pass.bbox(slots.base).outer().ic;
    let align = pass
        .ctx
        .string_attribute(pass.wrapper(id).node, "align")?
        .unwrap_or_else(|| "center".to_string());

    let mut widths = vec![base_box.w];
    let mut deltas = vec![0.0];
    let mut over_shift = None;
    let mut under_shift = None;

    if let (Some(over), Some(slot)) = (slots.over, &over_slot) {
        let over_box = pass.bbox(over).outer();
        let line = is_line_accent(pass, over)?;
        let (k, u) = over_ku(pass, accent, line, &base_box, &over_box);
        pass.emitter.set_style(slot, "padding-bottom", &em(k));
        if over_box.d < 0.0 {
            pass.emitter.set_style(slot, "margin-bottom", &em(over_box.d));
        }
        widths.push(over_box.w);
        deltas.push(if line && accent { 0.0 } else { delta });
        over_shift = Some((over, over_box, u));
    }
    if let (Some(under), Some(slot)) = (slots.under, &under_slot) {
        let under_box = pass.bbox(under).outer();
        let line = is_line_accent(pass, under)?;
        let (k, v) = under_kv(pass, accent_under, line, &base_box, &under_box);
        pass.emitter.set_style(slot, "padding-top", &em(k));
        if under_box.d < 0.0 {
            pass.emitter.set_style(slot, "margin-bottom", &em(under_box.d));
        }
        widths.push(under_box.w);
        deltas.push(if line && accent_under { 0.0 } else { -delta });
        under_shift = Some((under, under_box, v));
    }

    let dw = delta_w(&align, &widths, &deltas);
    let mut bbox = pass.bbox(id);
    bbox.clear();

    pass.place(slots.base, dw[0], 0.0);
    bbox.combine(&base_box, dw[0], 0.0);
    if dw[0] != 0.0 {
        pass.emitter.set_style(&base_slot, "padding-left", &em(dw[0]));
    }
    let mut index = 1;
    if let (Some((over, over_box, u)), Some(slot)) = (over_shift, &over_slot) {
        pass.place(over, dw[index], u);
        bbox.combine(&over_box, dw[index], u);
        if dw[index] != 0.0 {
            pass.emitter.set_style(slot, "padding-left", &em(dw[index]));
        }
        index += 1;
    }
    if let (Some((under, under_box, v)), Some(slot)) = (under_shift, &under_slot) {
        pass.place(under, dw[index], v);
        bbox.combine(&under_box, dw[index], v);
        if dw[index] != 0.0 {
            pass.emitter.set_style(slot, "padding-left", &em(dw[index]));
        }
    }

    let spacing = em(tex.big_op_spacing5);
    if slots.over.is_some() {
        bbox.h += tex.big_op_spacing5;
        pass.emitter.set_style(&container, "padding-top", &spacing);
    }
    if slots.under.is_some() {
        bbox.d += tex.big_op_spacing5;
        pass.emitter.set_style(&container, "padding-bottom", &spacing);
    }
    pass.set_bbox(id, bbox);
    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_w_center() {
        let dw = delta_w("center", &[1.0, 2.0], &[0.0, 0.0]);
        assert_eq!(dw, vec![0.5, 0.0]);
    }

    #[test]
    fn test_delta_w_never_negative() {
        let dw = delta_w("left", &[1.0, 1.0, 1.0], &[0.0, -0.2, 0.2]);
        assert!((dw[0] - 0.2).abs() < 1e-9);
        assert!(dw[1].abs() < 1e-9);
        assert!((dw[2] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_delta_w_right() {
        let dw = delta_w("right", &[1.0, 3.0], &[0.0, 0.0]);
        assert_eq!(dw, vec![2.0, 0.0]);
    }
}
