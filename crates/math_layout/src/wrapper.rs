//! Wrappers
//!
//! A wrapper is created for every tree node at the start of a layout pass.
//! Construction resolves the node's styles, its font variant and its scale
//! (in that order, each step needing the previous one); emission then
//! produces backend output and the wrapper's bounding box.

use crate::bbox::{BBox, Point};
use crate::fonts::FontMetrics;
use crate::lengths;
use crate::styles::Styles;
use crate::{LayoutOptions, Result};
use math_tree::properties::keys;
use math_tree::{AttributeValue, MathTree, NodeId, NodeKind};

/// Variant produced by an explicit font family
pub const EXPLICIT_FONT: &str = "-explicitFont";

/// Smallest scale a wrapper can have (a zero `mathsize` included)
pub const MIN_SCALE: f64 = 0.01;

/// Index of a wrapper inside its pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperId(usize);

impl WrapperId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Which sub/superscripts a script wrapper has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Sub,
    Sup,
    SubSup,
}

/// Layout behavior of a wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperClass {
    /// A row of children laid out left to right
    Default,
    /// Character data
    Text,
    /// Token elements
    Token,
    /// `mspace`
    Space,
    /// `msub`, `msup`, `msubsup`
    Scripts(ScriptKind),
    /// `munder`, `mover`, `munderover`
    UnderOver,
    /// `mmultiscripts`
    Multiscripts,
    /// `maction`
    Action,
    /// `mtd`
    TableCell,
}

impl WrapperClass {
    pub fn name(&self) -> &'static str {
        match self {
            WrapperClass::Default => "default",
            WrapperClass::Text => "text",
            WrapperClass::Token => "token",
            WrapperClass::Space => "space",
            WrapperClass::Scripts(ScriptKind::Sub) => "msub",
            WrapperClass::Scripts(ScriptKind::Sup) => "msup",
            WrapperClass::Scripts(ScriptKind::SubSup) => "msubsup",
            WrapperClass::UnderOver => "underover",
            WrapperClass::Multiscripts => "multiscripts",
            WrapperClass::Action => "action",
            WrapperClass::TableCell => "tablecell",
        }
    }
}

/// Read-only inputs shared by every wrapper of a pass
#[derive(Clone, Copy)]
pub struct WrapContext<'a> {
    pub tree: &'a MathTree,
    pub font: &'a dyn FontMetrics,
    pub options: &'a LayoutOptions,
}

impl<'a> WrapContext<'a> {
    pub fn new(tree: &'a MathTree, font: &'a dyn FontMetrics, options: &'a LayoutOptions) -> Self {
        Self { tree, font, options }
    }

    /// Convert a length to ems at the given scale
    pub fn length2em(&self, length: &str, size: f64, scale: f64) -> f64 {
        lengths::length2em(length, size, scale, self.options.em_px)
    }

    /// An attribute as a non-empty string
    pub(crate) fn string_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self
            .tree
            .attribute(node, name)?
            .filter(|value| !value.is_empty())
            .map(|value| value.as_string()))
    }
}

/// Bold versions of variants (and the reverse)
const BOLD_VARIANTS: &[(&str, &[(&str, &str)])] = &[
    (
        "bold",
        &[
            ("normal", "bold"),
            ("italic", "bold-italic"),
            ("fraktur", "bold-fraktur"),
            ("script", "bold-script"),
            ("sans-serif", "bold-sans-serif"),
            ("sans-serif-italic", "sans-serif-bold-italic"),
        ],
    ),
    (
        "normal",
        &[
            ("bold", "normal"),
            ("bold-italic", "italic"),
            ("bold-fraktur", "fraktur"),
            ("bold-script", "script"),
            ("bold-sans-serif", "sans-serif"),
            ("sans-serif-bold-italic", "sans-serif-italic"),
        ],
    ),
];

/// Italic versions of variants (and the reverse)
const ITALIC_VARIANTS: &[(&str, &[(&str, &str)])] = &[
    (
        "italic",
        &[
            ("normal", "italic"),
            ("bold", "bold-italic"),
            ("sans-serif", "sans-serif-italic"),
            ("bold-sans-serif", "sans-serif-bold-italic"),
        ],
    ),
    (
        "normal",
        &[
            ("italic", "normal"),
            ("bold-italic", "bold"),
            ("sans-serif-italic", "sans-serif"),
            ("sans-serif-bold-italic", "bold-sans-serif"),
        ],
    ),
];

fn translate(table: &[(&str, &[(&str, &str)])], key: Option<&str>, variant: &str) -> String {
    key.and_then(|key| table.iter().find(|(name, _)| *name == key))
        .and_then(|(_, map)| map.iter().find(|(from, _)| *from == variant))
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| variant.to_string())
}

/// Layout state of one tree node
#[derive(Debug, Clone)]
pub struct Wrapper {
    pub(crate) node: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) class: WrapperClass,
    pub(crate) parent: Option<WrapperId>,
    pub(crate) children: Vec<WrapperId>,
    pub(crate) styles: Styles,
    pub(crate) removed_styles: Styles,
    pub(crate) variant: String,
    pub(crate) bbox: BBox,
    pub(crate) offset: Point,
    pub(crate) emitted: bool,
}

impl Wrapper {
    /// Build the wrapper for `node`; children are added by the factory
    pub(crate) fn new(
        ctx: &WrapContext<'_>,
        node: NodeId,
        class: WrapperClass,
        parent: Option<(WrapperId, &Wrapper)>,
    ) -> Result<Self> {
        let kind = ctx.tree.kind(node)?;
        let pscale = parent.map(|(_, p)| p.bbox.scale).unwrap_or(1.0);
        let mut wrapper = Self {
            node,
            kind,
            class,
            parent: parent.map(|(id, _)| id),
            children: Vec::new(),
            styles: Styles::new(),
            removed_styles: Styles::new(),
            variant: String::new(),
            bbox: BBox::empty(),
            offset: Point::origin(),
            emitted: false,
        };

        // Text takes its font and size from the enclosing token
        if kind == NodeKind::Text {
            if let Some((_, p)) = parent {
                wrapper.variant = p.variant.clone();
            }
            wrapper.bbox.scale = pscale;
            return Ok(wrapper);
        }

        wrapper.get_styles(ctx)?;
        wrapper.get_variant(ctx)?;
        wrapper.get_scale(ctx, pscale)?;
        Ok(wrapper)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn class(&self) -> WrapperClass {
        self.class
    }

    pub fn parent(&self) -> Option<WrapperId> {
        self.parent
    }

    pub fn children(&self) -> &[WrapperId] {
        &self.children
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Take the explicit style attribute, moving font properties aside
    fn get_styles(&mut self, ctx: &WrapContext<'_>) -> Result<()> {
        let attributes = ctx.tree.attributes(self.node)?;
        if let Some(style) = attributes.get_explicit("style") {
            let mut styles = Styles::parse(&style.as_string());
            self.removed_styles = styles.strip_fonts();
            self.styles = styles;
        }
        Ok(())
    }

    /// Resolve the font variant of a token
    fn get_variant(&mut self, ctx: &WrapContext<'_>) -> Result<()> {
        if !self.kind.is_token() {
            return Ok(());
        }
        let node = self.node;
        let mut variant = ctx
            .string_attribute(node, "mathvariant")?
            .unwrap_or_else(|| "normal".to_string());

        if !ctx.tree.attributes(node)?.has_explicit("mathvariant") {
            let mut family = self.removed_styles.get("font-family").map(str::to_string);
            let mut weight = self.removed_styles.get("font-weight").map(str::to_string);
            let mut style = self.removed_styles.get("font-style").map(str::to_string);
            if let Some(value) = ctx.string_attribute(node, "fontfamily")? {
                family = Some(value);
            }
            if let Some(value) = ctx.string_attribute(node, "fontweight")? {
                weight = Some(value);
            }
            if let Some(value) = ctx.string_attribute(node, "fontstyle")? {
                style = Some(value);
            }
            if let Some(numeric) = weight.as_deref().and_then(|w| w.parse::<u32>().ok()) {
                weight = Some(if numeric > 600 { "bold" } else { "normal" }.to_string());
            }

            if let Some(family) = family {
                variant = self.explicit_variant(&family, weight.as_deref(), style.as_deref());
            } else {
                let variant_form = ctx
                    .tree
                    .properties()
                    .get(node, keys::VARIANT_FORM)
                    .map(|value| value.is_truthy())
                    .unwrap_or(false);
                if variant_form {
                    variant = "-tex-variant".to_string();
                }
                variant = translate(BOLD_VARIANTS, weight.as_deref(), &variant);
                variant = translate(ITALIC_VARIANTS, style.as_deref(), &variant);
            }
        }
        self.variant = variant;
        Ok(())
    }

    /// Put an explicit font back into the styles
    fn explicit_variant(&mut self, family: &str, weight: Option<&str>, style: Option<&str>) -> String {
        self.styles.set("font-family", family);
        if let Some(weight) = weight {
            self.styles.set("font-weight", weight);
        }
        if let Some(style) = style {
            self.styles.set("font-style", style);
        }
        EXPLICIT_FONT.to_string()
    }

    /// Resolve the absolute and relative scale
    fn get_scale(&mut self, ctx: &WrapContext<'_>, pscale: f64) -> Result<()> {
        let tree = ctx.tree;
        let node = self.node;
        let number = |name: &str| -> Result<Option<f64>> {
            Ok(tree.attribute(node, name)?.and_then(|value| value.as_f64()))
        };

        let scriptlevel = number("scriptlevel")?.unwrap_or(0.0).min(2.0);
        let mut fontsize = ctx.string_attribute(node, "fontsize")?;
        let attributes = tree.attributes(node)?;
        let mathsize = if self.kind.is_token() || self.kind == NodeKind::Mstyle {
            attributes.get_local("mathsize")
        } else {
            attributes.get_inherited("mathsize")
        };
        let mut mathsize = mathsize
            .filter(|value| !value.is_empty())
            .map(AttributeValue::as_string);

        let mut scale = 1.0;
        if scriptlevel != 0.0 {
            let multiplier = number("scriptsizemultiplier")?.unwrap_or(std::f64::consts::FRAC_1_SQRT_2);
            scale = multiplier.powf(scriptlevel);
            let minsize = ctx
                .string_attribute(node, "scriptminsize")?
                .unwrap_or_default();
            let minsize = ctx.length2em(&minsize, 0.8, 1.0);
            if scale < minsize {
                scale = minsize;
            }
        }
        if fontsize.is_none() {
            fontsize = self.removed_styles.get("font-size").map(str::to_string);
        }
        if mathsize.is_none() {
            mathsize = fontsize;
        }
        if let Some(size) = mathsize.filter(|size| size != "1") {
            scale *= ctx.length2em(&size, 1.0, 1.0);
        }
        if self.variant == EXPLICIT_FONT && ctx.options.ambient_scale > 0.0 {
            scale /= ctx.options.ambient_scale;
        }
        if scale.is_nan() || scale < MIN_SCALE {
            scale = MIN_SCALE;
        }

        self.bbox.scale = scale;
        self.bbox.rscale = if pscale > 0.0 { scale / pscale } else { 1.0 };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TexFont;
    use math_tree::AttributeSet;

    fn wrap_token(tree: &MathTree, node: NodeId) -> Wrapper {
        let font = TexFont::new();
        let options = LayoutOptions::default();
        let ctx = WrapContext::new(tree, &font, &options);
        Wrapper::new(&ctx, node, WrapperClass::Token, None).unwrap()
    }

    fn token(attrs: &[(&str, &str)], text: &str) -> (MathTree, NodeId) {
        let mut tree = MathTree::new(NodeKind::Math);
        let mi = tree
            .create_token_with(
                NodeKind::Mi,
                text,
                AttributeSet::from_pairs(attrs.iter().copied()),
            )
            .unwrap();
        let root = tree.root();
        tree.append_child(root, mi).unwrap();
        tree.set_inherited_attributes().unwrap();
        (tree, mi)
    }

    #[test]
    fn test_auto_italic_variant() {
        let (tree, mi) = token(&[], "x");
        assert_eq!(wrap_token(&tree, mi).variant(), "italic");
        let (tree, mi) = token(&[], "sin");
        assert_eq!(wrap_token(&tree, mi).variant(), "normal");
    }

    #[test]
    fn test_font_weight_makes_bold() {
        let (tree, mi) = token(&[("fontweight", "700")], "x");
        assert_eq!(wrap_token(&tree, mi).variant(), "bold-italic");
        let (tree, mi) = token(&[("fontweight", "400")], "sin");
        assert_eq!(wrap_token(&tree, mi).variant(), "normal");
    }

    #[test]
    fn test_explicit_variant_wins() {
        let (tree, mi) = token(&[("mathvariant", "fraktur"), ("fontweight", "bold")], "x");
        assert_eq!(wrap_token(&tree, mi).variant(), "fraktur");
    }

    #[test]
    fn test_style_font_family_gives_explicit_font() {
        let (tree, mi) = token(&[("style", "font-family: serif; color: red; font-style: normal")], "x");
        let wrapper = wrap_token(&tree, mi);
        assert_eq!(wrapper.variant(), EXPLICIT_FONT);
        assert_eq!(wrapper.styles().get("font-family"), Some("serif"));
        assert_eq!(wrapper.styles().get("font-style"), Some("normal"));
        assert_eq!(wrapper.styles().get("color"), Some("red"));
    }

    #[test]
    fn test_style_font_size_scales() {
        let (tree, mi) = token(&[("style", "font-size: 200%")], "x");
        let wrapper = wrap_token(&tree, mi);
        assert!((wrapper.bbox().scale - 2.0).abs() < 1e-9);
        assert!(wrapper.styles().is_empty());
    }

    #[test]
    fn test_mathsize_scales() {
        let (tree, mi) = token(&[("mathsize", "big")], "x");
        assert!((wrap_token(&tree, mi).bbox().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_variant_form_property() {
        let (mut tree, mi) = token(&[], "x");
        tree.properties_mut().set(mi, keys::VARIANT_FORM, true);
        assert_eq!(wrap_token(&tree, mi).variant(), "-tex-variant");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (tree, mi) = token(&[("fontweight", "bold"), ("mathsize", "1.5")], "x");
        let first = wrap_token(&tree, mi);
        let second = wrap_token(&tree, mi);
        assert_eq!(first.variant(), second.variant());
        assert_eq!(first.bbox(), second.bbox());
    }
}
