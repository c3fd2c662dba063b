//! `mmultiscripts`
//!
//! Children are `base, (sub, sup)*, mprescripts, (sub, sup)*`. All
//! subscripts share one baseline and all superscripts another: the shifts
//! are computed once, from the combined boxes of every script on both sides.

use super::msubsup::{required_child, shifts, ScriptShifts, SCRIPT, SPACER};
use crate::bbox::BBox;
use crate::emitter::Emitter;
use crate::lengths::em;
use crate::pass::LayoutPass;
use crate::wrapper::WrapperId;
use crate::Result;
use math_tree::NodeKind;

const SUP: &str = "sup";
const SUB: &str = "sub";
const CELL: &str = "cell";

/// One column of scripts: (subscript, superscript)
type Column = (Option<WrapperId>, Option<WrapperId>);

/// Output cells of one column: (subscript cell, superscript cell)
type Cells<N> = (N, N);

/// Split the children into base, post-scripts and pre-scripts
fn split_scripts<E: Emitter>(pass: &LayoutPass<'_, E>, id: WrapperId) -> Result<(WrapperId, Vec<Column>, Vec<Column>)> {
    let base = required_child(pass, id, 0)?;
    let mut post = Vec::new();
    let mut pre = Vec::new();
    let mut in_pre = false;
    let mut pending: Option<Option<WrapperId>> = None;

    let children = pass.wrapper(id).children.clone();
    for child in children.into_iter().skip(1) {
        let kind = pass.wrapper(child).kind;
        if kind == NodeKind::Mprescripts {
            if let Some(sub) = pending.take() {
                post.push((sub, None));
            }
            in_pre = true;
            continue;
        }
        let slot = (kind != NodeKind::None).then_some(child);
        match pending.take() {
            None => pending = Some(slot),
            Some(sub) => {
                let list = if in_pre { &mut pre } else { &mut post };
                list.push((sub, slot));
            }
        }
    }
    if let Some(sub) = pending {
        let list = if in_pre { &mut pre } else { &mut post };
        list.push((sub, None));
    }
    Ok((base, post, pre))
}

fn align_x(align: &str, w: f64, column: f64) -> f64 {
    match align {
        "center" => (column - w) / 2.0,
        "right" => column - w,
        _ => 0.0,
    }
}

/// Outer box of an optional script (empty when absent)
fn script_box<E: Emitter>(pass: &LayoutPass<'_, E>, script: Option<WrapperId>) -> BBox {
    script.map(|id| pass.bbox(id).outer()).unwrap_or_default()
}

/// Grow the aggregate sub and sup boxes by a run of columns
fn combine_columns<E: Emitter>(pass: &LayoutPass<'_, E>, columns: &[Column], sub: &mut BBox, sup: &mut BBox) {
    for (sub_id, sup_id) in columns {
        let (sub_box, sup_box) = (script_box(pass, *sub_id), script_box(pass, *sup_id));
        let w = sub_box.w.max(sup_box.w);
        sub.w += w;
        sup.w += w;
        sub.h = sub.h.max(sub_box.h);
        sub.d = sub.d.max(sub_box.d);
        sup.h = sup.h.max(sup_box.h);
        sup.d = sup.d.max(sup_box.d);
    }
}

/// Emit a run of columns into a new script stack
fn emit_columns<E: Emitter>(
    pass: &mut LayoutPass<'_, E>,
    container: &E::Node,
    columns: &[Column],
) -> Result<(E::Node, E::Node, Vec<Cells<E::Node>>)> {
    let stack = pass.emitter.append_container(container, SCRIPT);
    let sup_row = pass.emitter.append_container(&stack, SUP);
    let spacer = pass.emitter.append_container(&stack, SPACER);
    let sub_row = pass.emitter.append_container(&stack, SUB);
    let mut cells = Vec::with_capacity(columns.len());
    for (sub, sup) in columns {
        let sup_cell = pass.emitter.append_container(&sup_row, CELL);
        if let Some(sup) = sup {
            pass.emit(*sup, &sup_cell)?;
        }
        let sub_cell = pass.emitter.append_container(&sub_row, CELL);
        if let Some(sub) = sub {
            pass.emit(*sub, &sub_cell)?;
        }
        cells.push((sub_cell, sup_cell));
    }
    Ok((stack, spacer, cells))
}

/// Position a run of columns starting at `x`, returning the right edge
fn place_columns<E: Emitter>(
    pass: &mut LayoutPass<'_, E>,
    columns: &[Column],
    cells: &[Cells<E::Node>],
    x: f64,
    shifts: &ScriptShifts,
    align: &str,
    bbox: &mut BBox,
) -> f64 {
    let mut dx = 0.0;
    for ((sub, sup), (sub_cell, sup_cell)) in columns.iter().zip(cells) {
        let (sub_box, sup_box) = (script_box(pass, *sub), script_box(pass, *sup));
        let column = sub_box.w.max(sup_box.w);
        for (script, sbox, cell, y) in [(sub, sub_box, sub_cell, shifts.v), (sup, sup_box, sup_cell, shifts.u)] {
            let offset = align_x(align, sbox.w, column);
            pass.emitter.set_style(cell, "width", &em(column - offset));
            if offset != 0.0 {
                pass.emitter.set_style(cell, "padding-left", &em(offset));
            }
            if let Some(script) = script {
                pass.place(*script, x + dx + offset, y);
                bbox.combine(&pass.bbox(*script), x + dx + offset, y);
            }
        }
        dx += column;
    }
    x + dx
}

pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    let (base, post, pre) = split_scripts(pass, id)?;
    let node = pass.wrapper(id).node;
    let scriptalign = pass
        .ctx
        .string_attribute(node, "scriptalign")?
        .unwrap_or_else(|| pass.ctx.options.script_align.clone());
    let mut tokens = scriptalign.split_whitespace();
    let pre_align = tokens.next().unwrap_or("right").to_string();
    let post_align = tokens.next().unwrap_or(&pre_align).to_string();

    let container = pass.standard_container(id, parent)?;
    let pre_output = if pre.is_empty() {
        None
    } else {
        Some(emit_columns(pass, &container, &pre)?)
    };
    pass.emit(base, &container)?;
    let post_output = if post.is_empty() {
        None
    } else {
        Some(emit_columns(pass, &container, &post)?)
    };

    let mut sub = BBox::empty();
    let mut sup = BBox::empty();
    combine_columns(pass, &pre, &mut sub, &mut sup);
    combine_columns(pass, &post, &mut sub, &mut sup);
    let shifts = shifts(pass, id, base, &sub, &sup)?;
    for (stack, spacer, _) in pre_output.iter().chain(post_output.iter()) {
        pass.emitter.set_style(stack, "vertical-align", &em(shifts.v));
        pass.emitter.set_style(spacer, "margin-top", &em(shifts.q));
    }

    let scriptspace = pass.ctx.font.params().scriptspace;
    let mut bbox = pass.bbox(id);
    bbox.clear();
    let mut x = 0.0;
    if let Some((_, _, cells)) = &pre_output {
        x = place_columns(pass, &pre, cells, x, &shifts, &pre_align, &mut bbox);
        x += scriptspace;
    }
    let base_box = pass.bbox(base);
    pass.place(base, x, 0.0);
    bbox.combine(&base_box, x, 0.0);
    x += base_box.advance();
    if let Some((_, _, cells)) = &post_output {
        x = place_columns(pass, &post, cells, x, &shifts, &post_align, &mut bbox);
        x += scriptspace;
    }
    bbox.w = bbox.w.max(x);
    bbox.ic = 0.0;
    pass.set_bbox(id, bbox);
    Ok(container)
}
