//! Tests for the arena tree: wire conversion, linking and navigation

use rstest::rstest;

use seglist::application::codec;
use seglist::domain::{create_empty, SegmentKind, SegmentNode, SegmentTree, SourceRef};

fn sample_node() -> SegmentNode {
    SegmentNode::group(
        SegmentKind::And,
        vec![
            SegmentNode::group(
                SegmentKind::Or,
                vec![
                    SegmentNode::group(
                        SegmentKind::And,
                        vec![SegmentNode::source(SourceRef::new("list", "701", "Gala"))],
                    ),
                    SegmentNode::leaf(),
                ],
            )
            .excluded(false),
            SegmentNode::group(SegmentKind::And, vec![]).excluded(true),
        ],
    )
}

// ============================================================
// from_node / to_node
// ============================================================

#[test]
fn given_wire_tree_when_building_arena_then_unlinked_and_shaped() {
    let tree = SegmentTree::from_node(&sample_node()).unwrap();

    assert!(tree.is_unlinked());
    assert_eq!(tree.node_count(), 6);
    assert_eq!(tree.leaf_count(), 2);
    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.sources().len(), 1);
}

#[test]
fn given_wire_tree_when_converting_back_then_equal() {
    let node = sample_node();
    let tree = SegmentTree::from_node(&node).unwrap();

    assert_eq!(tree.to_node(), node);
}

#[test]
fn given_flag_below_root_children_when_converting_back_then_flag_not_emitted() {
    let mut node = sample_node();
    node.children[0].children[1].is_exclusion = Some(true);
    let tree = SegmentTree::from_node(&node).unwrap();

    let back = tree.to_node();

    assert_eq!(back.children[0].children[1].is_exclusion, None);
}

#[rstest]
#[case::explicit_source(r#"{"kind":"AND","children":[{"kind":"SOURCE","children":[{"kind":"SOURCE"}]}]}"#)]
#[case::implicit_source(r#"{"kind":"AND","children":[{"children":[{"kind":"SOURCE"}]}]}"#)]
fn given_leaf_with_children_when_decoding_then_malformed(#[case] json: &str) {
    let err = codec::decode(json).unwrap_err();
    assert!(err.is_malformed_tree());
}

// ============================================================
// link / unlink
// ============================================================

#[test]
fn given_unlinked_tree_when_linking_then_every_node_points_at_root() {
    let mut tree = SegmentTree::from_node(&sample_node()).unwrap();

    tree.link();

    assert!(tree.is_linked());
    let root = tree.root();
    for (idx, node) in tree.iter() {
        assert_eq!(node.root, Some(root));
        if idx != root {
            let parent = node.parent.unwrap();
            assert!(tree.children(parent).contains(&idx));
        }
    }
}

#[test]
fn given_linked_tree_when_unlinking_then_back_references_cleared() {
    let (mut tree, _) = create_empty();
    assert!(tree.is_linked());

    tree.unlink();

    assert!(tree.is_unlinked());
    assert!(!tree.is_linked());
}

#[test]
fn given_linked_tree_when_relinking_then_idempotent() {
    let (mut tree, roots) = create_empty();
    tree.link();
    tree.link();

    assert_eq!(tree.parent(roots.editable), Some(tree.root()));
    assert_eq!(tree.parent(tree.root()), None);
}

// ============================================================
// navigation
// ============================================================

#[rstest]
#[case(vec![])]
#[case(vec![0])]
#[case(vec![0, 0, 0])]
#[case(vec![0, 1])]
#[case(vec![1])]
fn given_path_when_resolving_then_path_of_round_trips(#[case] path: Vec<usize>) {
    let mut tree = SegmentTree::from_node(&sample_node()).unwrap();
    tree.link();

    let idx = tree.resolve_path(&path).unwrap();

    assert_eq!(tree.path_of(idx), Some(path));
}

#[test]
fn given_out_of_range_path_when_resolving_then_none() {
    let (tree, _) = create_empty();
    assert_eq!(tree.resolve_path(&[2]), None);
    assert_eq!(tree.resolve_path(&[0, 0]), None);
}

#[test]
fn given_tree_when_iterating_postorder_then_root_last() {
    let mut tree = SegmentTree::from_node(&sample_node()).unwrap();
    tree.link();

    let order: Vec<_> = tree.iter_postorder().map(|(idx, _)| idx).collect();

    assert_eq!(order.len(), 6);
    assert_eq!(order.last(), Some(&tree.root()));
}
