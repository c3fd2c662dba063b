//! Integration tests for the layout engine
//!
//! Trees are built programmatically, laid out into a markup backend, and
//! checked through both the positioned box tree and the emitted markup.

use math_layout::{
    Layout, LayoutEngine, LayoutOptions, MarkupEmitter, MarkupHandle, PositionedBox, MIN_SCALE,
};
use math_tree::{AttributeSet, MathTree, NodeId, NodeKind};
use proptest::prelude::*;
use std::f64::consts::FRAC_1_SQRT_2;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EPS: f64 = 1e-9;

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Attach `child` to the root and resolve inherited attributes
fn finish(tree: &mut MathTree, child: NodeId) {
    let root = tree.root();
    tree.append_child(root, child).unwrap();
    tree.set_inherited_attributes().unwrap();
}

fn token(tree: &mut MathTree, kind: NodeKind, text: &str) -> NodeId {
    tree.create_token(kind, text).unwrap()
}

fn token_with(tree: &mut MathTree, kind: NodeKind, text: &str, attrs: &[(&str, &str)]) -> NodeId {
    tree.create_token_with(kind, text, AttributeSet::from_pairs(attrs.iter().copied()))
        .unwrap()
}

fn element(tree: &mut MathTree, kind: NodeKind, attrs: &[(&str, &str)], children: &[NodeId]) -> NodeId {
    tree.create_element(kind, AttributeSet::from_pairs(attrs.iter().copied()), children)
        .unwrap()
}

fn run(tree: &MathTree) -> (Layout<MarkupHandle>, MarkupEmitter) {
    init_tracing();
    let mut emitter = MarkupEmitter::new();
    let layout = LayoutEngine::default().layout(tree, &mut emitter).unwrap();
    (layout, emitter)
}

fn boxed(layout: &Layout<MarkupHandle>, node: NodeId) -> &PositionedBox {
    layout.root.find(node).unwrap()
}

fn first(emitter: &MarkupEmitter, root: MarkupHandle, kind: &str) -> MarkupHandle {
    emitter.find_all(root, kind)[0]
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_superscript_placement() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token(&mut tree, NodeKind::Mi, "x");
    let two = token(&mut tree, NodeKind::Mn, "2");
    let msup = element(&mut tree, NodeKind::Msup, &[], &[x, two]);
    finish(&mut tree, msup);

    let (layout, _) = run(&tree);
    let two_box = boxed(&layout, two);
    // single-character base: the superscript sits at sup2
    assert!((two_box.offset.x - 0.572).abs() < EPS);
    assert!((two_box.offset.y - 0.363).abs() < EPS);
    assert!((two_box.bbox.rscale - FRAC_1_SQRT_2).abs() < EPS);

    let sup_box = boxed(&layout, msup);
    assert!((sup_box.bbox.w - (0.572 + 0.5 * FRAC_1_SQRT_2 + 0.05)).abs() < EPS);
    assert!((sup_box.bbox.h - (0.363 + 0.666 * FRAC_1_SQRT_2)).abs() < EPS);
}

#[test]
fn test_subsup_gap() {
    let mut tree = MathTree::new(NodeKind::Math);
    let base = token(&mut tree, NodeKind::Mi, "y");
    let sub = token(&mut tree, NodeKind::Mi, "b");
    let sup = token(&mut tree, NodeKind::Mi, "q");
    let msubsup = element(&mut tree, NodeKind::Msubsup, &[], &[base, sub, sup]);
    finish(&mut tree, msubsup);

    let (layout, emitter) = run(&tree);
    let sub_box = boxed(&layout, sub);
    let sup_box = boxed(&layout, sup);
    let sup_bottom = sup_box.offset.y - sup_box.bbox.d * sup_box.bbox.rscale;
    let sub_top = sub_box.offset.y + sub_box.bbox.h * sub_box.bbox.rscale;
    assert!(sup_bottom - sub_top >= 3.0 * 0.06 - EPS);
    assert!(sub_box.offset.y < 0.0);
    // the superscript clears 4/5 of the x-height
    assert!(sup_bottom >= 0.8 * 0.442 - EPS);

    let script = first(&emitter, layout.output, "script");
    assert_eq!(emitter.find_all(script, "spacer").len(), 1);
    assert!(emitter.element(script).unwrap().style("vertical-align").is_some());
}

#[test]
fn test_superscript_shift_attribute() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token(&mut tree, NodeKind::Mi, "x");
    let two = token(&mut tree, NodeKind::Mn, "2");
    let msup = element(&mut tree, NodeKind::Msup, &[("superscriptshift", "1em")], &[x, two]);
    finish(&mut tree, msup);

    let (layout, _) = run(&tree);
    assert!((boxed(&layout, two).offset.y - 1.0).abs() < EPS);
}

// =============================================================================
// Under/over
// =============================================================================

fn sum_under(display: bool) -> (MathTree, NodeId, NodeId, NodeId) {
    let mut tree = MathTree::new(NodeKind::Math);
    if display {
        let root = tree.root();
        tree.attributes_mut(root).unwrap().set("display", "block");
    }
    let sum = token_with(&mut tree, NodeKind::Mo, "\u{2211}", &[("movablelimits", "true")]);
    let i = token(&mut tree, NodeKind::Mi, "i");
    let munder = element(&mut tree, NodeKind::Munder, &[], &[sum, i]);
    finish(&mut tree, munder);
    (tree, munder, sum, i)
}

#[test]
fn test_movable_limits_inline() {
    let (tree, munder, sum, i) = sum_under(false);
    let (layout, emitter) = run(&tree);

    let container = first(&emitter, layout.output, "munder");
    assert_eq!(emitter.element(container).unwrap().attribute("limits"), Some("false"));
    assert!(emitter.find_all(layout.output, "row").is_empty());
    assert!(emitter.find_all(layout.output, "under").is_empty());

    let i_box = boxed(&layout, i);
    assert!((i_box.offset.x - boxed(&layout, sum).bbox.w).abs() < EPS);
    assert!((i_box.offset.y + 0.15).abs() < EPS);
    assert!(boxed(&layout, munder).bbox.w > boxed(&layout, sum).bbox.w);
}

#[test]
fn test_limits_stack_in_display_style() {
    let (tree, munder, _, i) = sum_under(true);
    let (layout, emitter) = run(&tree);

    let container = first(&emitter, layout.output, "munder");
    assert_eq!(emitter.element(container).unwrap().attribute("limits"), None);
    assert_eq!(emitter.find_all(container, "row").len(), 2);
    assert_eq!(emitter.find_all(container, "under").len(), 1);

    let under_h = 0.661 * FRAC_1_SQRT_2;
    let under_w = 0.345 * FRAC_1_SQRT_2;
    let i_box = boxed(&layout, i);
    let v = -(0.25 + 0.167 + under_h);
    assert!((i_box.offset.y - v).abs() < EPS);
    assert!((i_box.offset.x - (1.056 - under_w) / 2.0).abs() < EPS);

    let bbox = boxed(&layout, munder).bbox;
    assert!((bbox.d - (-v + 0.011 * FRAC_1_SQRT_2 + 0.1)).abs() < EPS);
    assert!((bbox.w - 1.056).abs() < EPS);
}

#[test]
fn test_accent_over() {
    let mut tree = MathTree::new(NodeKind::Math);
    let a = token(&mut tree, NodeKind::Mi, "a");
    let hat = token(&mut tree, NodeKind::Mo, "^");
    let mover = element(&mut tree, NodeKind::Mover, &[("accent", "true")], &[a, hat]);
    finish(&mut tree, mover);

    let (layout, emitter) = run(&tree);
    let hat_box = boxed(&layout, hat);
    // accents keep the base's size and sit one separation above it
    assert!((hat_box.bbox.rscale - 1.0).abs() < EPS);
    let k = 0.06 * 1.75;
    assert!((hat_box.offset.y - (0.442 + k + hat_box.bbox.d)).abs() < EPS);

    let over = first(&emitter, layout.output, "over");
    let padding = emitter.element(over).unwrap().style("padding-bottom");
    assert_eq!(padding, Some("0.105em"));
}

#[test]
fn test_munderover_limits() {
    let mut tree = MathTree::new(NodeKind::Math);
    let root = tree.root();
    tree.attributes_mut(root).unwrap().set("display", "block");
    let int = token_with(&mut tree, NodeKind::Mo, "\u{222B}", &[("movablelimits", "true")]);
    let low = token(&mut tree, NodeKind::Mn, "0");
    let high = token(&mut tree, NodeKind::Mn, "1");
    let munderover = element(&mut tree, NodeKind::Munderover, &[], &[int, low, high]);
    finish(&mut tree, munderover);

    let (layout, emitter) = run(&tree);
    assert!(boxed(&layout, high).offset.y > 0.805);
    assert!(boxed(&layout, low).offset.y < -0.306);
    // the integral's italic correction pushes the limits apart
    assert!(boxed(&layout, high).offset.x > boxed(&layout, low).offset.x);
    let container = first(&emitter, layout.output, "munderover");
    let markup = emitter.element(container).unwrap();
    assert_eq!(markup.style("padding-top"), Some("0.1em"));
    assert_eq!(markup.style("padding-bottom"), Some("0.1em"));
}

// =============================================================================
// Multiscripts
// =============================================================================

#[test]
fn test_multiscripts_layout() {
    let mut tree = MathTree::new(NodeKind::Math);
    let base = token(&mut tree, NodeKind::Mi, "x");
    let a = token(&mut tree, NodeKind::Mi, "a");
    let none1 = tree.create(NodeKind::None, AttributeSet::new());
    let none2 = tree.create(NodeKind::None, AttributeSet::new());
    let b = token(&mut tree, NodeKind::Mi, "b");
    let pre = tree.create(NodeKind::Mprescripts, AttributeSet::new());
    let paren = token(&mut tree, NodeKind::Mo, "(");
    let d = token(&mut tree, NodeKind::Mi, "d");
    let multi = element(
        &mut tree,
        NodeKind::Mmultiscripts,
        &[],
        &[base, a, none1, none2, b, pre, paren, d],
    );
    finish(&mut tree, multi);

    let (layout, emitter) = run(&tree);
    let (a_box, b_box) = (boxed(&layout, a), boxed(&layout, b));
    let (paren_box, d_box) = (boxed(&layout, paren), boxed(&layout, d));
    let base_box = boxed(&layout, base);

    assert!((a_box.offset.y - paren_box.offset.y).abs() < EPS);
    assert!((b_box.offset.y - d_box.offset.y).abs() < EPS);
    assert!(a_box.offset.y < 0.0);
    assert!(b_box.offset.y > 0.0);

    // right-aligned pre-scripts, then the base, then left-aligned post-scripts
    let column = 0.5 * FRAC_1_SQRT_2;
    assert!(d_box.offset.x.abs() < EPS);
    assert!((paren_box.offset.x - (column - 0.389 * FRAC_1_SQRT_2)).abs() < EPS);
    assert!((base_box.offset.x - (column + 0.05)).abs() < EPS);
    assert!((a_box.offset.x - (base_box.offset.x + 0.572)).abs() < EPS);
    let second_column = a_box.offset.x + 0.529 * FRAC_1_SQRT_2;
    assert!((b_box.offset.x - second_column).abs() < EPS);

    // absent scripts are not emitted
    assert!(layout.root.find(none1).is_none());
    assert!(layout.root.find(pre).is_none());
    assert_eq!(emitter.find_all(layout.output, "script").len(), 2);
    assert_eq!(emitter.find_all(layout.output, "cell").len(), 6);
}

#[test]
fn test_multiscripts_scriptalign() {
    let mut tree = MathTree::new(NodeKind::Math);
    let base = token(&mut tree, NodeKind::Mi, "x");
    let wide = token(&mut tree, NodeKind::Mi, "mn");
    let narrow = token(&mut tree, NodeKind::Mi, "i");
    let multi = element(
        &mut tree,
        NodeKind::Mmultiscripts,
        &[("scriptalign", "center")],
        &[base, wide, narrow],
    );
    finish(&mut tree, multi);

    let (layout, _) = run(&tree);
    let wide_box = boxed(&layout, wide);
    let narrow_box = boxed(&layout, narrow);
    let wide_w = wide_box.bbox.w * wide_box.bbox.rscale;
    let narrow_w = narrow_box.bbox.w * narrow_box.bbox.rscale;
    let expected = wide_box.offset.x + (wide_w - narrow_w) / 2.0;
    assert!((narrow_box.offset.x - expected).abs() < EPS);
}

// =============================================================================
// Other wrappers
// =============================================================================

#[test]
fn test_toggle_shows_selected_child() {
    let mut tree = MathTree::new(NodeKind::Math);
    let a = token(&mut tree, NodeKind::Mi, "a");
    let b = token(&mut tree, NodeKind::Mi, "b");
    let action = element(
        &mut tree,
        NodeKind::Maction,
        &[("actiontype", "toggle"), ("selection", "2")],
        &[a, b],
    );
    finish(&mut tree, action);

    let (layout, emitter) = run(&tree);
    let container = first(&emitter, layout.output, "maction");
    let markup = emitter.element(container).unwrap();
    assert_eq!(markup.attribute("actiontype"), Some("toggle"));
    assert_eq!(markup.attribute("selection"), Some("2"));
    assert_eq!(emitter.text_content(container), "b");
    assert!(layout.root.find(a).is_none());
    assert!((boxed(&layout, action).bbox.w - boxed(&layout, b).bbox.w).abs() < EPS);
}

#[test]
fn test_selection_is_clamped() {
    let mut tree = MathTree::new(NodeKind::Math);
    let a = token(&mut tree, NodeKind::Mi, "a");
    let b = token(&mut tree, NodeKind::Mi, "b");
    let action = element(&mut tree, NodeKind::Maction, &[("selection", "7")], &[a, b]);
    finish(&mut tree, action);

    let (layout, emitter) = run(&tree);
    let container = first(&emitter, layout.output, "maction");
    assert_eq!(emitter.text_content(container), "b");
    assert_eq!(emitter.element(container).unwrap().attribute("selection"), Some("2"));
}

#[test]
fn test_empty_cell_gets_placeholder() {
    let mut tree = MathTree::new(NodeKind::Math);
    let row = tree.create(NodeKind::InferredMrow, AttributeSet::new());
    let empty = element(&mut tree, NodeKind::Mtd, &[], &[row]);
    let x = token(&mut tree, NodeKind::Mi, "x");
    let full = element(&mut tree, NodeKind::Mtd, &[], &[x]);
    let tr = element(&mut tree, NodeKind::Mtr, &[], &[empty, full]);
    let table = element(&mut tree, NodeKind::Mtable, &[], &[tr]);
    finish(&mut tree, table);

    let (layout, emitter) = run(&tree);
    let cells = emitter.find_all(layout.output, "mtd");
    assert_eq!(cells.len(), 2);
    assert_eq!(emitter.find_all(cells[0], "box").len(), 1);
    assert!(emitter.find_all(cells[1], "box").is_empty());
}

#[test]
fn test_mspace_dimensions() {
    let mut tree = MathTree::new(NodeKind::Math);
    let space = element(
        &mut tree,
        NodeKind::Mspace,
        &[("width", "1em"), ("height", "0.5em"), ("depth", "0.25em")],
        &[],
    );
    finish(&mut tree, space);

    let (layout, emitter) = run(&tree);
    let bbox = boxed(&layout, space).bbox;
    assert!((bbox.w - 1.0).abs() < EPS);
    assert!((bbox.h - 0.5).abs() < EPS);
    assert!((bbox.d - 0.25).abs() < EPS);

    let markup = emitter
        .element(first(&emitter, layout.output, "mspace"))
        .unwrap();
    assert_eq!(markup.style("width"), Some("1em"));
    assert_eq!(markup.style("height"), Some("0.75em"));
    assert_eq!(markup.style("vertical-align"), Some("-0.25em"));
}

#[test]
fn test_ms_quotes() {
    let mut tree = MathTree::new(NodeKind::Math);
    let ms = token(&mut tree, NodeKind::Ms, "abc");
    finish(&mut tree, ms);

    let (layout, emitter) = run(&tree);
    assert_eq!(emitter.text_content(layout.output), "\"abc\"");
    let bbox = boxed(&layout, ms).bbox;
    // unknown quote glyphs measure 0.5em each
    assert!((bbox.w - 2.5).abs() < EPS);
    let text = &boxed(&layout, ms).children[0];
    assert!((text.offset.x - 0.5).abs() < EPS);
}

// =============================================================================
// Decorations
// =============================================================================

#[test]
fn test_attributes_and_colors() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token_with(
        &mut tree,
        NodeKind::Mi,
        "x",
        &[
            ("mathcolor", "red"),
            ("background", "yellow"),
            ("class", "highlight"),
            ("href", "https://example.org"),
            ("data-semantic-type", "identifier"),
        ],
    );
    finish(&mut tree, x);

    let (layout, emitter) = run(&tree);
    let markup = emitter.element(first(&emitter, layout.output, "mi")).unwrap();
    assert_eq!(markup.style("color"), Some("red"));
    assert_eq!(markup.style("background-color"), Some("yellow"));
    assert!(markup.has_class("highlight"));
    assert!(markup.has_class("mx-italic"));
    assert_eq!(markup.attribute("data-semantic-type"), Some("identifier"));
    assert_eq!(markup.attribute("href"), None);
    assert_eq!(markup.attribute("mathcolor"), None);
}

#[test]
fn test_forced_attribute_is_copied() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token_with(&mut tree, NodeKind::Mi, "x", &[("href", "https://example.org")]);
    finish(&mut tree, x);

    let mut options = LayoutOptions::default();
    options.skip_attributes.insert("href".to_string(), false);
    let engine = LayoutEngine::default().with_options(options);
    let mut emitter = MarkupEmitter::new();
    let layout = engine.layout(&tree, &mut emitter).unwrap();
    let markup = emitter.element(first(&emitter, layout.output, "mi")).unwrap();
    assert_eq!(markup.attribute("href"), Some("https://example.org"));
}

#[test]
fn test_script_scale_in_markup() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token(&mut tree, NodeKind::Mi, "x");
    let n = token(&mut tree, NodeKind::Mi, "n");
    let msub = element(&mut tree, NodeKind::Msub, &[], &[x, n]);
    finish(&mut tree, msub);

    let (layout, emitter) = run(&tree);
    let tokens = emitter.find_all(layout.output, "mi");
    assert_eq!(emitter.element(tokens[0]).unwrap().style("font-size"), None);
    assert_eq!(emitter.element(tokens[1]).unwrap().style("font-size"), Some("70.7%"));
}

#[test]
fn test_zero_mathsize_keeps_boxes_finite() {
    let mut tree = MathTree::new(NodeKind::Math);
    let x = token(&mut tree, NodeKind::Mi, "x");
    let style = element(&mut tree, NodeKind::Mstyle, &[("mathsize", "0")], &[x]);
    finish(&mut tree, style);

    let (layout, _) = run(&tree);
    for positioned in layout.root.walk() {
        let bbox = &positioned.bbox;
        for value in [bbox.w, bbox.h, bbox.d, bbox.ic, bbox.scale, bbox.rscale] {
            assert!(value.is_finite(), "{:?} has a non-finite box {:?}", positioned.kind, bbox);
        }
        assert!(bbox.scale >= MIN_SCALE);
    }
    assert!(layout.bbox.w.is_finite());
    assert!((boxed(&layout, style).bbox.scale - MIN_SCALE).abs() < EPS);
}

#[test]
fn test_layout_is_repeatable() {
    let (tree, _, _, _) = sum_under(true);
    let (first_layout, first_emitter) = run(&tree);
    let (second_layout, second_emitter) = run(&tree);
    assert_eq!(first_layout.root, second_layout.root);
    assert_eq!(
        first_emitter.to_markup(first_layout.output),
        second_emitter.to_markup(second_layout.output)
    );
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_row_box_contains_children(texts in prop::collection::vec("[a-z0-9()+=]{1,4}", 1..6)) {
        let mut tree = MathTree::new(NodeKind::Math);
        let tokens: Vec<NodeId> = texts
            .iter()
            .map(|text| token(&mut tree, NodeKind::Mi, text))
            .collect();
        let row = element(&mut tree, NodeKind::Mrow, &[], &tokens);
        finish(&mut tree, row);

        let (layout, _) = run(&tree);
        let row_box = boxed(&layout, row).bbox;
        let mut width = 0.0;
        for id in &tokens {
            let child = boxed(&layout, *id).bbox;
            prop_assert!(row_box.h >= child.h * child.rscale - EPS);
            prop_assert!(row_box.d >= child.d * child.rscale - EPS);
            width += child.advance();
        }
        prop_assert!((row_box.w - width).abs() < 1e-6);
    }

    #[test]
    fn prop_multiscripts_share_baselines(
        post in prop::collection::vec(("[a-z()]{0,2}", "[a-z()]{0,2}"), 1..4),
        pre in prop::collection::vec(("[a-z()]{0,2}", "[a-z()]{0,2}"), 0..3),
    ) {
        let mut tree = MathTree::new(NodeKind::Math);
        let mut children = vec![token(&mut tree, NodeKind::Mi, "x")];
        let mut subs = Vec::new();
        let mut sups = Vec::new();
        let script = |tree: &mut MathTree, text: &str, list: &mut Vec<NodeId>| {
            if text.is_empty() {
                tree.create(NodeKind::None, AttributeSet::new())
            } else {
                let id = token(tree, NodeKind::Mi, text);
                list.push(id);
                id
            }
        };
        for (sub, sup) in &post {
            children.push(script(&mut tree, sub.as_str(), &mut subs));
            children.push(script(&mut tree, sup.as_str(), &mut sups));
        }
        if !pre.is_empty() {
            children.push(tree.create(NodeKind::Mprescripts, AttributeSet::new()));
            for (sub, sup) in &pre {
                children.push(script(&mut tree, sub.as_str(), &mut subs));
                children.push(script(&mut tree, sup.as_str(), &mut sups));
            }
        }
        let multi = element(&mut tree, NodeKind::Mmultiscripts, &[], &children);
        finish(&mut tree, multi);

        let (layout, _) = run(&tree);
        for list in [&subs, &sups] {
            if let Some(head) = list.first() {
                let y = boxed(&layout, *head).offset.y;
                for id in list.iter() {
                    prop_assert!((boxed(&layout, *id).offset.y - y).abs() < EPS);
                }
            }
        }
        if let (Some(sub), Some(sup)) = (subs.first(), sups.first()) {
            prop_assert!(boxed(&layout, *sub).offset.y < boxed(&layout, *sup).offset.y);
        }
    }
}
