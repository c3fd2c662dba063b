//! Sub- and superscripts
//!
//! Shifts follow the TeX rules for attaching scripts: the superscript is
//! raised by `u`, the subscript lowered by `v`, both depending on the base
//! box, the script boxes and the font parameters. Under/over elements with
//! movable limits and multiscripts use the same shifts.

use crate::bbox::BBox;
use crate::emitter::Emitter;
use crate::lengths::em;
use crate::pass::LayoutPass;
use crate::wrapper::{ScriptKind, WrapperId};
use crate::{LayoutError, Result};
use math_tree::properties::keys;
use math_tree::NodeKind;

/// Container holding the scripts of a base
pub(crate) const SCRIPT: &str = "script";
/// Spacer between a superscript and a subscript
pub(crate) const SPACER: &str = "spacer";

/// Baseline offsets of the scripts, in the scripted element's ems
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScriptShifts {
    /// Superscript shift (up)
    pub u: f64,
    /// Subscript shift (negative: down)
    pub v: f64,
    /// Gap between the superscript's bottom and the subscript's top
    pub q: f64,
}

pub(crate) fn emit<E: Emitter>(
    pass: &mut LayoutPass<'_, E>,
    id: WrapperId,
    parent: &E::Node,
    kind: ScriptKind,
) -> Result<E::Node> {
    let base = required_child(pass, id, 0)?;
    let script = pass.child(id, 1);
    let (sub, sup) = match kind {
        ScriptKind::Sub => (script, None),
        ScriptKind::Sup => (None, script),
        ScriptKind::SubSup => (script, pass.child(id, 2)),
    };
    emit_scripts(pass, id, parent, base, sub, sup)
}

pub(crate) fn required_child<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    n: usize,
) -> Result<WrapperId> {
    pass.child(id, n).ok_or_else(|| LayoutError::Malformed {
        kind: pass.wrapper(id).kind,
        reason: format!("missing child {}", n),
    })
}

/// Emit a base with scripts to its right
pub(crate) fn emit_scripts<E: Emitter>(
    pass: &mut LayoutPass<'_, E>,
    id: WrapperId,
    parent: &E::Node,
    base: WrapperId,
    sub: Option<WrapperId>,
    sup: Option<WrapperId>,
) -> Result<E::Node> {
    let container = pass.standard_container(id, parent)?;
    pass.place(base, 0.0, 0.0);
    pass.emit(base, &container)?;
    let base_box = pass.bbox(base);
    let w = base_box.advance();
    let ic = base_box.ic * base_box.rscale;

    let mut bbox = pass.bbox(id);
    bbox.clear();
    bbox.append(&base_box);

    match (sub, sup) {
        (Some(sub), Some(sup)) => {
            let stack = pass.emitter.append_container(&container, SCRIPT);
            let sup_node = pass.emit(sup, &stack)?;
            let spacer = pass.emitter.append_container(&stack, SPACER);
            pass.emit(sub, &stack)?;
            let (sub_box, sup_box) = (pass.bbox(sub), pass.bbox(sup));
            let shifts = shifts(pass, id, base, &sub_box, &sup_box)?;
            pass.emitter.set_style(&stack, "vertical-align", &em(shifts.v));
            pass.emitter.set_style(&spacer, "margin-top", &em(shifts.q));
            if ic != 0.0 {
                pass.emitter
                    .set_style(&sup_node, "margin-left", &em(ic / sup_box.rscale));
            }
            pass.place(sub, w, shifts.v);
            pass.place(sup, w + ic, shifts.u);
            bbox.combine(&sub_box, w, shifts.v);
            bbox.combine(&sup_box, w + ic, shifts.u);
        }
        (Some(sub), None) => {
            let stack = pass.emitter.append_container(&container, SCRIPT);
            pass.emit(sub, &stack)?;
            let sub_box = pass.bbox(sub);
            let v = -sub_shift(pass, id, base, &sub_box)?;
            pass.emitter.set_style(&stack, "vertical-align", &em(v));
            pass.place(sub, w, v);
            bbox.combine(&sub_box, w, v);
        }
        (None, Some(sup)) => {
            let stack = pass.emitter.append_container(&container, SCRIPT);
            pass.emit(sup, &stack)?;
            let sup_box = pass.bbox(sup);
            let u = sup_shift(pass, id, base, &sup_box)?;
            pass.emitter.set_style(&stack, "vertical-align", &em(u));
            if ic != 0.0 {
                pass.emitter.set_style(&stack, "padding-left", &em(ic));
            }
            pass.place(sup, w + ic, u);
            bbox.combine(&sup_box, w + ic, u);
        }
        (None, None) => {}
    }

    bbox.w += pass.ctx.font.params().scriptspace;
    bbox.ic = 0.0;
    pass.set_bbox(id, bbox);
    Ok(container)
}

/// Whether the base is a single unscaled character that is not a large operator
pub(crate) fn is_char_base<E: Emitter>(pass: &LayoutPass<'_, E>, base: WrapperId) -> Result<bool> {
    let mut current = base;
    loop {
        let wrapper = pass.wrapper(current);
        match wrapper.kind {
            NodeKind::Mstyle | NodeKind::Mrow | NodeKind::InferredMrow | NodeKind::TeXAtom
                if wrapper.children.len() == 1 =>
            {
                current = wrapper.children[0];
            }
            _ => break,
        }
    }
    let wrapper = pass.wrapper(current);
    if !matches!(wrapper.kind, NodeKind::Mi | NodeKind::Mo | NodeKind::Mn)
        || (wrapper.bbox.rscale - 1.0).abs() > 1e-9
    {
        return Ok(false);
    }
    let tree = pass.ctx.tree;
    let largeop = tree
        .attribute(wrapper.node, "largeop")?
        .map(|value| value.as_bool())
        .unwrap_or(false);
    Ok(tree.text_content(wrapper.node)?.chars().count() == 1 && !largeop)
}

/// A shift attribute of the scripted element, or `default`
fn shift_attribute<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    name: &str,
    default: f64,
) -> Result<f64> {
    let node = pass.wrapper(id).node;
    let value = pass.ctx.string_attribute(node, name)?.unwrap_or_default();
    Ok(pass.length2em(id, &value, default))
}

/// How far a lone subscript is lowered
pub(crate) fn sub_shift<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    base: WrapperId,
    sub: &BBox,
) -> Result<f64> {
    let tex = pass.ctx.font.params();
    let base_box = pass.bbox(base);
    let drop = if is_char_base(pass, base)? {
        0.0
    } else {
        base_box.d * base_box.rscale + tex.sub_drop * sub.rscale
    };
    let shift = shift_attribute(pass, id, "subscriptshift", tex.sub1)?;
    Ok(drop.max(shift).max(sub.h * sub.rscale - 0.8 * tex.x_height))
}

/// How far a superscript is raised
pub(crate) fn sup_shift<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    base: WrapperId,
    sup: &BBox,
) -> Result<f64> {
    let tex = pass.ctx.font.params();
    let tree = pass.ctx.tree;
    let node = pass.wrapper(id).node;
    let base_box = pass.bbox(base);
    let display = tree
        .attribute(node, "displaystyle")?
        .map(|value| value.as_bool())
        .unwrap_or(false);
    let prime = tree
        .properties()
        .get(node, keys::TEX_PRIME_STYLE)
        .map(|value| value.is_truthy())
        .unwrap_or(false);
    let default = if prime {
        tex.sup3
    } else if display {
        tex.sup1
    } else {
        tex.sup2
    };
    let raise = if is_char_base(pass, base)? {
        0.0
    } else {
        base_box.h * base_box.rscale - tex.sup_drop * sup.rscale
    };
    let shift = shift_attribute(pass, id, "superscriptshift", default)?;
    Ok(raise.max(shift).max(sup.d * sup.rscale + tex.x_height / 4.0))
}

/// Shifts for a subscript and a superscript on the same base.
///
/// The scripts are pushed apart until they are at least three rule
/// thicknesses apart, keeping the superscript's bottom above 4/5 of the
/// x-height.
pub(crate) fn shifts<E: Emitter>(
    pass: &LayoutPass<'_, E>,
    id: WrapperId,
    base: WrapperId,
    sub: &BBox,
    sup: &BBox,
) -> Result<ScriptShifts> {
    let tex = pass.ctx.font.params();
    let base_box = pass.bbox(base);
    let t = 3.0 * tex.rule_thickness;
    let drop = if is_char_base(pass, base)? {
        0.0
    } else {
        base_box.d * base_box.rscale + tex.sub_drop * sub.rscale
    };
    let mut u = sup_shift(pass, id, base, sup)?;
    let mut v = drop.max(shift_attribute(pass, id, "subscriptshift", tex.sub2)?);

    let sup_bottom = |u: f64| u - sup.d * sup.rscale;
    let sub_top = |v: f64| sub.h * sub.rscale - v;
    let q = sup_bottom(u) - sub_top(v);
    if q < t {
        v += t - q;
        let p = 0.8 * tex.x_height - sup_bottom(u);
        if p > 0.0 {
            u += p;
            v -= p;
        }
    }
    u = u.max(shift_attribute(pass, id, "superscriptshift", u)?);
    v = v.max(shift_attribute(pass, id, "subscriptshift", v)?);
    let q = sup_bottom(u) - sub_top(v);
    Ok(ScriptShifts { u, v: -v, q })
}
