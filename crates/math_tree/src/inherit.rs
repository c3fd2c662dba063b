//! Inherited attribute resolution
//!
//! `displaystyle` and `scriptlevel` flow down the tree and change in script
//! positions; explicit `mstyle` attributes are pushed down to every
//! descendant that does not set them itself.

use crate::{AttributeValue, MathTree, NodeId, NodeKind, Result};
use std::collections::BTreeMap;

/// Attributes an `mstyle` does not pass on to its descendants
const NOT_INHERITED: &[&str] = &["displaystyle", "scriptlevel", "class", "id", "href", "style"];

#[derive(Debug, Clone)]
struct Ambient {
    display: bool,
    level: f64,
    attributes: BTreeMap<String, AttributeValue>,
}

impl Ambient {
    fn script(&self, increment: f64) -> Self {
        Self {
            display: false,
            level: self.level + increment,
            attributes: self.attributes.clone(),
        }
    }
}

impl MathTree {
    /// Recompute the inherited attributes of every attached node.
    ///
    /// Safe to run repeatedly; previous inherited values are replaced.
    pub fn set_inherited_attributes(&mut self) -> Result<()> {
        let root = self.root();
        let attrs = self.attributes(root)?;
        let display = attrs
            .get_explicit("displaystyle")
            .map(AttributeValue::as_bool)
            .or_else(|| {
                attrs
                    .get_explicit("display")
                    .map(|value| value.as_string() == "block")
            })
            .unwrap_or(false);
        let ambient = Ambient {
            display,
            level: 0.0,
            attributes: BTreeMap::new(),
        };
        let mut count = 0usize;
        self.inherit_into(root, ambient, &mut count)?;
        tracing::trace!(tree = %self.id(), nodes = count, "inherited attributes resolved");
        Ok(())
    }

    fn inherit_into(&mut self, id: NodeId, ambient: Ambient, count: &mut usize) -> Result<()> {
        *count += 1;
        let kind = self.kind(id)?;
        if kind == NodeKind::Text {
            return Ok(());
        }

        let mut ambient = ambient;
        {
            let attrs = self.attributes(id)?;
            if let Some(display) = attrs.get_explicit("displaystyle") {
                ambient.display = display.as_bool();
            }
            if kind == NodeKind::Mstyle {
                if let Some(level) = attrs.get_explicit("scriptlevel") {
                    ambient.level = resolve_level(ambient.level, &level.as_string());
                }
            }
        }

        {
            let attrs = self.attributes_mut(id)?;
            attrs.clear_inherited();
            for (name, value) in &ambient.attributes {
                if !attrs.has_explicit(name) {
                    attrs.set_inherited(name.clone(), value.clone());
                }
            }
            attrs.set_inherited("displaystyle", ambient.display);
            attrs.set_inherited("scriptlevel", ambient.level);
        }

        if kind == NodeKind::Mstyle {
            let pushed: Vec<(String, AttributeValue)> = self
                .attributes(id)?
                .explicit()
                .iter()
                .filter(|(name, value)| {
                    !NOT_INHERITED.contains(&name.as_str())
                        && !name.starts_with(crate::SEMANTIC_PREFIX)
                        && !value.is_empty()
                })
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            ambient.attributes.extend(pushed);
        }

        if matches!(kind, NodeKind::Munder | NodeKind::Mover | NodeKind::Munderover) {
            self.inherit_accents(id, kind)?;
        }

        let children = self.children(id)?.to_vec();
        for (index, child) in children.iter().enumerate() {
            let child_ambient = self.child_ambient(id, kind, index, &ambient)?;
            self.inherit_into(*child, child_ambient, count)?;
        }
        Ok(())
    }

    /// Unset `accent`/`accentunder` come from the operator at the core of the script
    fn inherit_accents(&mut self, id: NodeId, kind: NodeKind) -> Result<()> {
        let slots: &[(usize, &str)] = match kind {
            NodeKind::Munder => &[(1, "accentunder")],
            NodeKind::Mover => &[(1, "accent")],
            _ => &[(1, "accentunder"), (2, "accent")],
        };
        for &(index, name) in slots {
            if self.attributes(id)?.has_explicit(name) {
                continue;
            }
            let Some(script) = self.children(id)?.get(index).copied() else {
                continue;
            };
            if !self.is_embellished_op(script)? {
                continue;
            }
            // operators carry `accent` for both positions
            let core = self.core_mo(script)?;
            let accent = self.attributes(core)?.get_explicit("accent").cloned();
            if let Some(accent) = accent {
                self.attributes_mut(id)?.set_inherited(name, accent);
            }
        }
        Ok(())
    }

    fn child_ambient(
        &self,
        id: NodeId,
        kind: NodeKind,
        index: usize,
        ambient: &Ambient,
    ) -> Result<Ambient> {
        let node = self.node(id)?;
        let ambient = match kind {
            NodeKind::Msub | NodeKind::Msup | NodeKind::Msubsup | NodeKind::Mmultiscripts
                if index > 0 =>
            {
                ambient.script(1.0)
            }
            NodeKind::Munder | NodeKind::Mover | NodeKind::Munderover if index > 0 => {
                let accent_name = match (kind, index) {
                    (NodeKind::Munder, _) | (NodeKind::Munderover, 1) => "accentunder",
                    _ => "accent",
                };
                let accent = node
                    .get(accent_name)
                    .map(|value| value.as_bool())
                    .unwrap_or(false);
                ambient.script(if accent { 0.0 } else { 1.0 })
            }
            NodeKind::Mroot if index == 1 => ambient.script(2.0),
            NodeKind::Mfrac => ambient.script(if ambient.display { 0.0 } else { 1.0 }),
            _ => ambient.clone(),
        };
        Ok(ambient)
    }
}

/// Apply an `mstyle` scriptlevel value: `+n`/`-n` are relative, plain numbers absolute
fn resolve_level(current: f64, value: &str) -> f64 {
    let value = value.trim();
    let parsed = value.parse::<f64>().ok();
    match (value.chars().next(), parsed) {
        (Some('+') | Some('-'), Some(delta)) => (current + delta).max(0.0),
        (_, Some(level)) => level.max(0.0),
        _ => current,
    }
}
