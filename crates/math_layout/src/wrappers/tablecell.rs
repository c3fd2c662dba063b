//! `mtd`

use crate::emitter::Emitter;
use crate::pass::LayoutPass;
use crate::wrapper::WrapperId;
use crate::Result;

/// A cell always has content, even when its child is missing
pub(crate) fn emit<E: Emitter>(pass: &mut LayoutPass<'_, E>, id: WrapperId, parent: &E::Node) -> Result<E::Node> {
    pass.emit_default(id, parent, true)
}
