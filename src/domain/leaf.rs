//! Leaf reference edits.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::SegmentTree;
use crate::domain::builder::RootPointers;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::SourceRef;
use crate::domain::normalize::ensure_editable;

/// Point the leaf `target` at a source. The join column is dropped for
/// sources that are not reports.
#[instrument(level = "debug", skip(tree))]
pub fn set_source(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
    source_ref: SourceRef,
) -> DomainResult<RootPointers> {
    ensure_leaf(tree, roots, target)?;

    let mut source_ref = source_ref;
    if !source_ref.is_report() && source_ref.column_name.is_some() {
        debug!(
            "set_source: dropping join column for {} source",
            source_ref.source_kind
        );
        source_ref.column_name = None;
    }
    if let Some(node) = tree.get_node_mut(target) {
        node.data.source_ref = Some(source_ref);
    }
    Ok(roots)
}

/// Remove the source reference of the leaf `target`.
#[instrument(level = "debug", skip(tree))]
pub fn clear_source(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
) -> DomainResult<RootPointers> {
    ensure_leaf(tree, roots, target)?;
    if let Some(node) = tree.get_node_mut(target) {
        node.data.source_ref = None;
    }
    Ok(roots)
}

fn ensure_leaf(tree: &SegmentTree, roots: RootPointers, target: Index) -> DomainResult<()> {
    ensure_editable(tree, roots, target)?;
    match tree.get_node(target) {
        Some(node) if node.is_leaf() => Ok(()),
        Some(node) => Err(DomainError::invalid_edit(format!(
            "{} node is not a source leaf",
            node.data.kind
        ))),
        None => Err(DomainError::invalid_edit("node does not exist")),
    }
}
