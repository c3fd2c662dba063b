//! Wrapper factory
//!
//! The registry maps node kinds to wrapper classes and must have a default
//! class. The factory creates the wrappers of one pass and remembers which
//! wrapper belongs to which node; a new factory is used for every pass.

use crate::wrapper::{ScriptKind, WrapContext, Wrapper, WrapperClass, WrapperId};
use crate::{LayoutError, Result};
use math_tree::{NodeId, NodeKind, TreeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Node kind to wrapper class table
#[derive(Debug, Clone)]
pub struct WrapperRegistry {
    classes: HashMap<NodeKind, WrapperClass>,
    default: WrapperClass,
}

impl WrapperRegistry {
    pub fn builder() -> WrapperRegistryBuilder {
        WrapperRegistryBuilder::default()
    }

    /// The stock wrapper classes
    pub fn standard() -> Self {
        let mut classes = HashMap::new();
        classes.insert(NodeKind::Text, WrapperClass::Text);
        for kind in [
            NodeKind::Mi,
            NodeKind::Mo,
            NodeKind::Mn,
            NodeKind::Mtext,
            NodeKind::Ms,
            NodeKind::Mglyph,
        ] {
            classes.insert(kind, WrapperClass::Token);
        }
        classes.insert(NodeKind::Mspace, WrapperClass::Space);
        classes.insert(NodeKind::Msub, WrapperClass::Scripts(ScriptKind::Sub));
        classes.insert(NodeKind::Msup, WrapperClass::Scripts(ScriptKind::Sup));
        classes.insert(NodeKind::Msubsup, WrapperClass::Scripts(ScriptKind::SubSup));
        for kind in [NodeKind::Munder, NodeKind::Mover, NodeKind::Munderover] {
            classes.insert(kind, WrapperClass::UnderOver);
        }
        classes.insert(NodeKind::Mmultiscripts, WrapperClass::Multiscripts);
        classes.insert(NodeKind::Maction, WrapperClass::Action);
        classes.insert(NodeKind::Mtd, WrapperClass::TableCell);
        Self {
            classes,
            default: WrapperClass::Default,
        }
    }

    /// The class registered for a kind, or the default class
    pub fn class_for(&self, kind: NodeKind) -> WrapperClass {
        self.classes.get(&kind).copied().unwrap_or(self.default)
    }
}

impl Default for WrapperRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for a [`WrapperRegistry`]
#[derive(Debug, Default)]
pub struct WrapperRegistryBuilder {
    classes: HashMap<NodeKind, WrapperClass>,
    default: Option<WrapperClass>,
}

impl WrapperRegistryBuilder {
    /// Start from the stock classes (default included)
    pub fn standard() -> Self {
        let registry = WrapperRegistry::standard();
        Self {
            classes: registry.classes,
            default: Some(registry.default),
        }
    }

    pub fn register(mut self, kind: NodeKind, class: WrapperClass) -> Self {
        self.classes.insert(kind, class);
        self
    }

    pub fn default_class(mut self, class: WrapperClass) -> Self {
        self.default = Some(class);
        self
    }

    pub fn build(self) -> Result<WrapperRegistry> {
        let default = self.default.ok_or(LayoutError::MissingDefaultWrapper)?;
        Ok(WrapperRegistry {
            classes: self.classes,
            default,
        })
    }
}

/// Creates the wrappers of one layout pass
#[derive(Debug)]
pub struct WrapperFactory {
    registry: Arc<WrapperRegistry>,
    tree: Option<TreeId>,
    wrappers: Vec<Wrapper>,
    node_map: HashMap<NodeId, WrapperId>,
}

impl WrapperFactory {
    pub fn new(registry: Arc<WrapperRegistry>) -> Self {
        Self {
            registry,
            tree: None,
            wrappers: Vec::new(),
            node_map: HashMap::new(),
        }
    }

    /// A factory over the stock classes
    pub fn standard() -> Self {
        Self::new(Arc::new(WrapperRegistry::standard()))
    }

    pub fn registry(&self) -> &WrapperRegistry {
        &self.registry
    }

    /// Wrap a node and, recursively, its children
    pub fn wrap(
        &mut self,
        ctx: &WrapContext<'_>,
        node: NodeId,
        parent: Option<WrapperId>,
    ) -> Result<WrapperId> {
        let tree_id = ctx.tree.id();
        match self.tree {
            Some(current) if current != tree_id => {
                return Err(LayoutError::ForeignTree {
                    expected: current,
                    found: tree_id,
                })
            }
            _ => self.tree = Some(tree_id),
        }

        let kind = ctx.tree.kind(node)?;
        let class = self.registry.class_for(kind);
        let wrapper = {
            let parent = parent.map(|id| (id, &self.wrappers[id.index()]));
            Wrapper::new(ctx, node, class, parent)?
        };
        let id = WrapperId::from_index(self.wrappers.len());
        tracing::trace!(
            node = %node,
            kind = %kind,
            class = class.name(),
            variant = %wrapper.variant,
            scale = wrapper.bbox.scale,
            "wrapped node"
        );
        self.wrappers.push(wrapper);
        self.node_map.insert(node, id);

        let children = ctx.tree.children(node)?.to_vec();
        for child in children {
            let child_id = self.wrap(ctx, child, Some(id))?;
            self.wrappers[id.index()].children.push(child_id);
        }
        Ok(id)
    }

    pub fn get(&self, id: WrapperId) -> &Wrapper {
        &self.wrappers[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: WrapperId) -> &mut Wrapper {
        &mut self.wrappers[id.index()]
    }

    /// The wrapper created for a node in this pass
    pub fn wrapper_for(&self, node: NodeId) -> Option<WrapperId> {
        self.node_map.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Drop every wrapper so the factory can serve another pass
    pub fn reset(&mut self) {
        self.tree = None;
        self.wrappers.clear();
        self.node_map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayoutOptions, TexFont};
    use math_tree::{AttributeSet, MathTree};

    #[test]
    fn test_builder_requires_default() {
        let result = WrapperRegistry::builder()
            .register(NodeKind::Mi, WrapperClass::Token)
            .build();
        assert!(matches!(result, Err(LayoutError::MissingDefaultWrapper)));

        let registry = WrapperRegistry::builder()
            .register(NodeKind::Mi, WrapperClass::Token)
            .default_class(WrapperClass::Default)
            .build()
            .unwrap();
        assert_eq!(registry.class_for(NodeKind::Mi), WrapperClass::Token);
        assert_eq!(registry.class_for(NodeKind::Mfrac), WrapperClass::Default);
    }

    #[test]
    fn test_standard_classes() {
        let registry = WrapperRegistry::standard();
        assert_eq!(registry.class_for(NodeKind::Text), WrapperClass::Text);
        assert_eq!(
            registry.class_for(NodeKind::Msubsup),
            WrapperClass::Scripts(ScriptKind::SubSup)
        );
        assert_eq!(registry.class_for(NodeKind::Munder), WrapperClass::UnderOver);
        assert_eq!(registry.class_for(NodeKind::Mtd), WrapperClass::TableCell);
    }

    #[test]
    fn test_wrap_records_nodes() {
        let mut tree = MathTree::new(NodeKind::Math);
        let x = tree.create_token(NodeKind::Mi, "x").unwrap();
        let two = tree.create_token(NodeKind::Mn, "2").unwrap();
        let sup = tree
            .create_element(NodeKind::Msup, AttributeSet::new(), &[x, two])
            .unwrap();
        let root = tree.root();
        tree.append_child(root, sup).unwrap();
        tree.set_inherited_attributes().unwrap();

        let font = TexFont::new();
        let options = LayoutOptions::default();
        let ctx = WrapContext::new(&tree, &font, &options);
        let mut factory = WrapperFactory::standard();
        let top = factory.wrap(&ctx, root, None).unwrap();

        // math, msup, two tokens and their text leaves
        assert_eq!(factory.len(), 6);
        let sup_wrapper = factory.wrapper_for(sup).unwrap();
        assert_eq!(factory.get(sup_wrapper).parent(), Some(top));
        let script = factory.get(factory.wrapper_for(two).unwrap());
        assert!((script.bbox().rscale - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);

        factory.reset();
        assert!(factory.is_empty());
        assert!(factory.wrapper_for(sup).is_none());
    }

    #[test]
    fn test_factory_refuses_second_tree() {
        let first = MathTree::new(NodeKind::Math);
        let second = MathTree::new(NodeKind::Math);
        let font = TexFont::new();
        let options = LayoutOptions::default();
        let mut factory = WrapperFactory::standard();
        factory
            .wrap(&WrapContext::new(&first, &font, &options), first.root(), None)
            .unwrap();
        let result = factory.wrap(&WrapContext::new(&second, &font, &options), second.root(), None);
        assert!(matches!(result, Err(LayoutError::ForeignTree { .. })));
    }
}
