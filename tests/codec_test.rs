//! Round trips through the JSON wire form

use seglist::application::codec;
use seglist::domain::{
    add_group, add_source, create_empty, set_source, split_loaded, SegmentNode, SourceRef,
};

/// Build a populated tree: two alternatives in the included root, one exclusion.
fn populated() -> SegmentNode {
    let (mut tree, roots) = create_empty();
    let first = roots.editable;
    let roots = add_group(&mut tree, roots, first).unwrap();
    let second = tree.children(tree.children(roots.editable)[1])[0];
    let roots = set_source(
        &mut tree,
        roots,
        first,
        SourceRef::new("report", "00O1", "Lapsed Donors").with_column("CONTACT_ID"),
    )
    .unwrap();
    let gala = SourceRef::new("list", "7011", "Gala");
    let roots = set_source(&mut tree, roots, second, gala).unwrap();
    let exclusion = roots.exclusion.unwrap();
    let roots = add_source(&mut tree, roots, exclusion).unwrap();
    let excluded_leaf = tree.children(exclusion)[0];
    let _roots = set_source(
        &mut tree,
        roots,
        excluded_leaf,
        SourceRef::new("list", "7012", "Unsubscribed"),
    )
    .unwrap();

    tree.unlink();
    tree.to_node()
}

#[test]
fn given_populated_tree_when_round_tripping_then_structurally_equal() {
    let node = populated();

    let json = codec::encode_node(&node).unwrap();
    let mut tree = codec::decode(&json).unwrap();
    let roots = split_loaded(&mut tree).unwrap();

    tree.unlink();
    assert_eq!(tree.to_node(), node);
    assert_eq!(tree.sources().len(), 3);
    assert!(!roots.is_degraded());
}

#[test]
fn given_swapped_root_pair_when_round_tripping_then_same_included_and_excluded() {
    let node = populated();
    let mut swapped = node.clone();
    swapped.children.reverse();

    let mut tree = codec::decode(&codec::encode_node(&swapped).unwrap()).unwrap();
    let roots = split_loaded(&mut tree).unwrap();

    let included = tree.path_of(roots.editable).unwrap();
    let excluded = tree.path_of(roots.exclusion.unwrap()).unwrap();
    assert_eq!(included, vec![1]);
    assert_eq!(excluded, vec![0]);

    tree.unlink();
    let back = tree.to_node();
    assert_eq!(back.children[1], node.children[0]);
    assert_eq!(back.children[0], node.children[1]);
}

#[test]
fn given_report_source_when_encoding_then_column_name_emitted() {
    let json = codec::encode_node(&populated()).unwrap();

    assert!(json.contains(r#""columnName":"CONTACT_ID""#));
    assert!(json.contains(r#""sourceKind":"report""#));
    assert_eq!(json.matches("columnName").count(), 1);
    assert_eq!(json.matches("isExclusion").count(), 2);
}

#[test]
fn given_pretty_and_compact_encodings_when_decoding_then_same_tree() {
    let node = populated();

    let compact = codec::decode_node(&codec::encode_node(&node).unwrap()).unwrap();
    let pretty = codec::decode_node(&codec::encode_node_pretty(&node).unwrap()).unwrap();

    assert_eq!(compact, pretty);
    assert_eq!(compact, node);
}
