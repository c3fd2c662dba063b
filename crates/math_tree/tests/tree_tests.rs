//! Integration tests for the math tree
//! Tests building trees, editing them in place, and JSON loading

use math_tree::{AttributeSet, MathTree, NodeId, NodeKind, TreeError};
use proptest::prelude::*;

/// Build `x_1 + x_2 + ... + x_n` inside a row under the root
fn sum_of(n: usize) -> (MathTree, NodeId) {
    let mut tree = MathTree::new(NodeKind::Math);
    let row = tree.create(NodeKind::Mrow, AttributeSet::new());
    for i in 0..n {
        if i > 0 {
            let plus = tree.create_token(NodeKind::Mo, "+").unwrap();
            tree.append_child(row, plus).unwrap();
        }
        let x = tree.create_token(NodeKind::Mi, &format!("x{i}")).unwrap();
        tree.append_child(row, x).unwrap();
    }
    let root = tree.root();
    tree.append_child(root, row).unwrap();
    (tree, row)
}

#[test]
fn test_wrap_node_in_new_parent() {
    let (mut tree, row) = sum_of(2);
    let first = tree.children(row).unwrap()[0];

    // Replace the first term by a toggle that holds it
    let action = tree.create(
        NodeKind::Maction,
        AttributeSet::from_pairs([("actiontype", "toggle")]),
    );
    tree.replace_child(row, first, action).unwrap();
    tree.append_child(action, first).unwrap();

    tree.validate().unwrap();
    assert_eq!(tree.parent(first).unwrap(), Some(action));
    assert_eq!(tree.text_content(row).unwrap(), "x0+x1");
}

#[test]
fn test_attach_twice_is_rejected() {
    let (mut tree, row) = sum_of(1);
    let first = tree.children(row).unwrap()[0];
    let other = tree.create(NodeKind::Mrow, AttributeSet::new());
    assert!(matches!(
        tree.append_child(other, first),
        Err(TreeError::AlreadyAttached(_))
    ));
}

#[test]
fn test_load_from_json() {
    let json = r#"{
        "nodes": [
            {"kind": "math", "children": [1]},
            {"kind": "mi", "children": [2], "parent": 0,
             "attributes": {"explicit": {"data-semantic-type": "identifier"}}},
            {"kind": "text", "parent": 1, "text": "x"}
        ],
        "root": 0
    }"#;
    let tree = MathTree::from_json(json).unwrap();
    let mi = tree.children(tree.root()).unwrap()[0];
    assert_eq!(tree.kind(mi).unwrap(), NodeKind::Mi);
    assert_eq!(
        tree.attributes(mi)
            .unwrap()
            .get_explicit("data-semantic-type")
            .unwrap()
            .as_string(),
        "identifier"
    );
    assert_eq!(tree.text_content(mi).unwrap(), "x");
}

#[test]
fn test_load_rejects_broken_links() {
    let json = r#"{
        "nodes": [
            {"kind": "math", "children": [1]},
            {"kind": "mi", "parent": 5}
        ],
        "root": 0
    }"#;
    assert!(MathTree::from_json(json).is_err());
}

proptest! {
    #[test]
    fn prop_walk_visits_every_attached_node(n in 1usize..12) {
        let (tree, _) = sum_of(n);
        let order = tree.walk(tree.root()).unwrap();
        // root, row, and each token with its text leaf
        let tokens = 2 * n - 1;
        prop_assert_eq!(order.len(), 2 + 2 * tokens);
        prop_assert_eq!(order.len(), tree.len());
    }

    #[test]
    fn prop_set_children_keeps_tree_valid(n in 1usize..10, cut in 0usize..10) {
        let (mut tree, row) = sum_of(n);
        let children = tree.children(row).unwrap().to_vec();
        let cut = cut.min(children.len());
        let group = tree.create(NodeKind::Mrow, AttributeSet::new());
        tree.set_children(group, &children[..cut]).unwrap();
        let mut rest = vec![group];
        rest.extend_from_slice(&children[cut..]);
        tree.set_children(row, &rest).unwrap();
        prop_assert!(tree.validate().is_ok());
        prop_assert_eq!(tree.text_content(row).unwrap(), {
            let (original, r) = sum_of(n);
            original.text_content(r).unwrap()
        });
    }
}
