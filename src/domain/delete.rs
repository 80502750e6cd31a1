//! Deletion engine with upward cascade and single-child collapse.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::SegmentTree;
use crate::domain::builder::RootPointers;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutation::replace_with_child;
use crate::domain::node::SegmentData;
use crate::domain::normalize::ensure_editable;

/// Delete `target` from the tree.
///
/// A held root is reset to an empty leaf instead of being removed. Any other
/// node is removed together with its subtree; a parent left without children
/// is deleted by the same rule. The surviving ancestor is then collapsed if it
/// is left with a single child.
#[instrument(level = "debug", skip(tree))]
pub fn delete_node(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
) -> DomainResult<RootPointers> {
    ensure_editable(tree, roots, target)?;

    let mut current = target;
    loop {
        if roots.holds(current) {
            debug!("delete: resetting held root {:?}", current);
            reset_to_empty_leaf(tree, current);
            return Ok(roots);
        }

        let parent = tree
            .parent(current)
            .ok_or_else(|| DomainError::invalid_edit("cannot delete the persisted root"))?;
        if let Some(p) = tree.get_node_mut(parent) {
            p.children.retain(|&c| c != current);
        }
        tree.free_subtree(current);

        if tree.children(parent).is_empty() {
            debug!("delete: cascading into emptied parent {:?}", parent);
            current = parent;
            continue;
        }
        return collapse(tree, roots, parent);
    }
}

/// Replace single-child combinators by their child, starting at `start` and
/// continuing down the hoisted chain.
#[instrument(level = "trace", skip(tree))]
pub fn collapse(
    tree: &mut SegmentTree,
    roots: RootPointers,
    start: Index,
) -> DomainResult<RootPointers> {
    let mut roots = roots;
    let mut current = start;
    loop {
        let single_child = tree
            .get_node(current)
            .is_some_and(|n| n.data.kind.is_combinator() && n.children.len() == 1);
        if !single_child {
            return Ok(roots);
        }
        let child = replace_with_child(tree, current)?;
        debug!("collapse: {:?} replaced by its only child {:?}", current, child);
        roots = roots.replace(current, child);
        current = child;
    }
}

/// Turn `idx` into an empty leaf in place, freeing its children. The slot's
/// exclusion flag is kept.
pub fn reset_to_empty_leaf(tree: &mut SegmentTree, idx: Index) {
    let children = match tree.get_node_mut(idx) {
        Some(node) => {
            node.data = SegmentData {
                is_exclusion: node.data.is_exclusion,
                ..SegmentData::leaf()
            };
            std::mem::take(&mut node.children)
        }
        None => return,
    };
    for child in children {
        tree.free_subtree(child);
    }
}
