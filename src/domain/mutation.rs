//! Mutation primitives: insert a wrapper above a node, append a child below one,
//! and the inverse hoist used when collapsing single-child combinators.
//!
//! All primitives require a linked tree and keep `parent`/`root` consistent.

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::SegmentTree;
use crate::domain::error::{DomainError, DomainResult};

fn ensure_detached(tree: &SegmentTree, idx: Index) -> DomainResult<()> {
    match tree.get_node(idx) {
        Some(node) if node.parent.is_none() && idx != tree.root() => Ok(()),
        Some(_) => Err(DomainError::invalid_edit(format!(
            "node {:?} is already attached",
            idx
        ))),
        None => Err(DomainError::invalid_edit(format!("node {:?} does not exist", idx))),
    }
}

/// Replace `node` in its parent's children by `new_parent` and move `node` under it.
///
/// The wrapper takes over the slot's exclusion flag. Fails for the persisted root.
#[instrument(level = "trace", skip(tree))]
pub fn insert_parent_above(
    tree: &mut SegmentTree,
    node: Index,
    new_parent: Index,
) -> DomainResult<()> {
    tree.ensure_linked()?;
    tree.ensure_reachable(node)?;
    ensure_detached(tree, new_parent)?;
    let old_parent = tree
        .parent(node)
        .ok_or_else(|| DomainError::invalid_edit("the persisted root cannot be wrapped"))?;
    let root = tree.root();

    let pos = tree
        .children(old_parent)
        .iter()
        .position(|&c| c == node)
        .ok_or_else(|| DomainError::invalid_edit("node missing from its parent's children"))?;

    let mut slot_flag = false;
    if let Some(n) = tree.get_node_mut(node) {
        slot_flag = std::mem::take(&mut n.data.is_exclusion);
        n.parent = Some(new_parent);
    }
    if let Some(p) = tree.get_node_mut(old_parent) {
        p.children[pos] = new_parent;
    }
    if let Some(w) = tree.get_node_mut(new_parent) {
        w.data.is_exclusion = slot_flag;
        w.parent = Some(old_parent);
        w.root = Some(root);
        w.children.push(node);
    }
    trace!("wrapped {:?} in {:?} under {:?}", node, new_parent, old_parent);
    Ok(())
}

/// Append a detached `new_child` under the combinator `node`.
#[instrument(level = "trace", skip(tree))]
pub fn append_child(tree: &mut SegmentTree, node: Index, new_child: Index) -> DomainResult<()> {
    tree.ensure_linked()?;
    tree.ensure_reachable(node)?;
    ensure_detached(tree, new_child)?;
    if !tree.kind(node).is_some_and(|k| k.is_combinator()) {
        return Err(DomainError::invalid_edit(format!(
            "cannot append below non-combinator {:?}",
            node
        )));
    }

    let root = tree.root();
    // The new child may already carry a subtree built while detached.
    let mut stack = vec![(new_child, node)];
    while let Some((idx, parent)) = stack.pop() {
        if let Some(n) = tree.get_node_mut(idx) {
            n.parent = Some(parent);
            n.root = Some(root);
            stack.extend(n.children.iter().map(|&c| (c, idx)));
        }
    }
    if let Some(p) = tree.get_node_mut(node) {
        p.children.push(new_child);
    }
    Ok(())
}

/// Wrap the persisted root itself; only meaningful in degraded mode.
#[instrument(level = "trace", skip(tree))]
pub(crate) fn promote_wrapper(tree: &mut SegmentTree, new_root: Index) -> DomainResult<()> {
    ensure_detached(tree, new_root)?;
    let old_root = tree.root();
    if let Some(w) = tree.get_node_mut(new_root) {
        w.children.push(old_root);
    }
    tree.set_root(new_root);
    Ok(())
}

/// Replace the single-child combinator `node` by its only child and free `node`.
///
/// Returns the hoisted child. The child inherits the slot's exclusion flag.
/// Hoisting below the persisted root promotes the child to root.
#[instrument(level = "trace", skip(tree))]
pub(crate) fn replace_with_child(tree: &mut SegmentTree, node: Index) -> DomainResult<Index> {
    let child = match tree.children(node) {
        [only] => *only,
        other => {
            return Err(DomainError::invalid_edit(format!(
                "cannot hoist from node with {} children",
                other.len()
            )))
        }
    };

    let Some(parent) = tree.parent(node) else {
        if let Some(n) = tree.get_node_mut(node) {
            n.children.clear();
        }
        tree.free_subtree(node);
        tree.set_root(child);
        if let Some(c) = tree.get_node_mut(child) {
            c.data.is_exclusion = false;
        }
        return Ok(child);
    };

    let pos = tree
        .children(parent)
        .iter()
        .position(|&c| c == node)
        .ok_or_else(|| DomainError::invalid_edit("node missing from its parent's children"))?;

    let mut slot_flag = false;
    if let Some(n) = tree.get_node_mut(node) {
        slot_flag = n.data.is_exclusion;
        n.children.clear();
    }
    tree.free_subtree(node);
    if let Some(p) = tree.get_node_mut(parent) {
        p.children[pos] = child;
    }
    if let Some(c) = tree.get_node_mut(child) {
        c.parent = Some(parent);
        c.data.is_exclusion = slot_flag;
    }
    trace!("hoisted {:?} into {:?} under {:?}", child, node, parent);
    Ok(child)
}
