//! JSON wire codec for persisted segment trees.

use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{SegmentNode, SegmentTree};

/// Parse the wire JSON into an unlinked tree.
#[instrument(level = "debug", skip(payload), fields(len = payload.len()))]
pub fn decode(payload: &str) -> ApplicationResult<SegmentTree> {
    let node = decode_node(payload)?;
    Ok(SegmentTree::from_node(&node)?)
}

pub fn decode_node(payload: &str) -> ApplicationResult<SegmentNode> {
    serde_json::from_str(payload).map_err(|source| ApplicationError::Codec {
        context: "decode segment tree".into(),
        source,
    })
}

pub fn encode_node(node: &SegmentNode) -> ApplicationResult<String> {
    serde_json::to_string(node).map_err(|source| ApplicationError::Codec {
        context: "encode segment tree".into(),
        source,
    })
}

pub fn encode_node_pretty(node: &SegmentNode) -> ApplicationResult<String> {
    serde_json::to_string_pretty(node).map_err(|source| ApplicationError::Codec {
        context: "encode segment tree".into(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{create_empty, SegmentKind};

    #[test]
    fn given_fresh_tree_when_encoding_then_matches_wire_format() {
        let (tree, _) = create_empty();
        let json = encode_node(&tree.to_node()).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"AND","children":[{"kind":"SOURCE","isExclusion":false,"children":[]},{"kind":"AND","isExclusion":true,"children":[]}]}"#
        );
        assert!(!json.contains("parent"));
    }

    #[test]
    fn given_node_without_kind_when_decoding_then_is_leaf() {
        let payload =
            r#"{"children":[{"isExclusion":false},{"kind":"AND","isExclusion":true}],"kind":"AND"}"#;
        let tree = decode(payload).unwrap();
        let first = tree.children(tree.root())[0];
        assert_eq!(tree.kind(first), Some(SegmentKind::Source));
        assert!(tree.is_unlinked());
    }

    #[test]
    fn given_kindless_node_with_children_when_decoding_then_malformed() {
        let err = decode(r#"{"children":[{"kind":"SOURCE"}]}"#).unwrap_err();
        assert!(err.is_malformed_tree());
    }

    #[test]
    fn given_garbage_when_decoding_then_codec_error() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, ApplicationError::Codec { .. }));
    }
}
