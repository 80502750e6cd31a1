//! Normalization engine: add a sibling group or a sibling source next to a target.
//!
//! The target is classified by kind to decide how many wrapper levels are needed
//! so the new sibling lands under an OR:
//!
//! ```text
//! SOURCE           -> OR{ AND{ target }, new }     two wrappers
//! AND              -> OR{ target, new }            one wrapper
//! OR               -> target{ ..., new }           none
//! empty combinator -> target{ leaf }               none, target is the group
//! ```

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::SegmentTree;
use crate::domain::builder::RootPointers;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::mutation::{append_child, insert_parent_above, promote_wrapper};
use crate::domain::node::{SegmentData, SegmentKind};

/// What gets appended next to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sibling {
    /// `AND{ empty leaf }`
    Group,
    /// Bare empty leaf
    Source,
}

fn is_empty_combinator(tree: &SegmentTree, target: Index) -> bool {
    tree.get_node(target)
        .is_some_and(|node| node.data.kind.is_combinator() && node.children.is_empty())
}

/// Number of wrapper levels a target needs before a sibling can be appended.
pub fn wrap_levels(tree: &SegmentTree, target: Index) -> usize {
    if is_empty_combinator(tree, target) {
        return 0;
    }
    match tree.kind(target) {
        Some(SegmentKind::Source) => 2,
        Some(SegmentKind::And) => 1,
        Some(SegmentKind::Or) | None => 0,
    }
}

/// Add an `AND{ empty leaf }` group as an OR-alternative of `target`.
#[instrument(level = "debug", skip(tree))]
pub fn add_group(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
) -> DomainResult<RootPointers> {
    add_sibling(tree, roots, target, Sibling::Group)
}

/// Add an empty source leaf as an OR-alternative of `target`.
#[instrument(level = "debug", skip(tree))]
pub fn add_source(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
) -> DomainResult<RootPointers> {
    add_sibling(tree, roots, target, Sibling::Source)
}

pub fn add_sibling(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
    sibling: Sibling,
) -> DomainResult<RootPointers> {
    ensure_editable(tree, roots, target)?;

    // An empty combinator already is the group; it only needs its leaf
    let sibling = if is_empty_combinator(tree, target) {
        Sibling::Source
    } else {
        sibling
    };
    let levels = wrap_levels(tree, target);
    debug!(
        "add_sibling: {:?} below {:?} needs {} wrapper level(s)",
        sibling, target, levels
    );

    let mut roots = roots;
    let mut attach = target;
    if levels == 2 {
        (attach, roots) = wrap(tree, roots, attach, SegmentKind::And)?;
    }
    if levels >= 1 {
        (attach, roots) = wrap(tree, roots, attach, SegmentKind::Or)?;
    }

    let new_child = build_sibling(tree, sibling);
    append_child(tree, attach, new_child)?;
    Ok(roots)
}

/// Target must be linked, reachable and, outside degraded mode, not the persisted root.
pub(crate) fn ensure_editable(
    tree: &SegmentTree,
    roots: RootPointers,
    target: Index,
) -> DomainResult<()> {
    tree.ensure_linked()?;
    tree.ensure_reachable(target)?;
    if target == tree.root() && !roots.is_degraded() {
        return Err(DomainError::invalid_edit("the persisted root is not editable"));
    }
    let root = tree.root();
    let placed = match roots.exclusion {
        None => roots.editable == root,
        Some(exclusion) => [roots.editable, exclusion]
            .iter()
            .all(|&held| tree.parent(held) == Some(root) && tree.is_reachable(held)),
    };
    if !placed {
        return Err(DomainError::invalid_edit(
            "held roots are stale: they are not the persisted root's children",
        ));
    }
    Ok(())
}

/// Insert a fresh combinator above `target`, returning the wrapper and updated pointers.
fn wrap(
    tree: &mut SegmentTree,
    roots: RootPointers,
    target: Index,
    kind: SegmentKind,
) -> DomainResult<(Index, RootPointers)> {
    let wrapper = tree.new_node(SegmentData::combinator(kind));
    if target == tree.root() {
        promote_wrapper(tree, wrapper)?;
    } else {
        insert_parent_above(tree, target, wrapper)?;
    }
    Ok((wrapper, roots.replace(target, wrapper)))
}

fn build_sibling(tree: &mut SegmentTree, sibling: Sibling) -> Index {
    let leaf = tree.new_node(SegmentData::leaf());
    match sibling {
        Sibling::Source => leaf,
        Sibling::Group => {
            let group = tree.new_node(SegmentData::and());
            if let Some(node) = tree.get_node_mut(group) {
                node.children.push(leaf);
            }
            group
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::create_empty;

    #[test]
    fn given_node_kinds_when_classifying_then_returns_wrap_levels() {
        let (mut tree, roots) = create_empty();
        assert_eq!(wrap_levels(&tree, roots.editable), 2);
        assert_eq!(wrap_levels(&tree, roots.exclusion.unwrap()), 0);

        let roots = add_group(&mut tree, roots, roots.editable).unwrap();
        assert_eq!(wrap_levels(&tree, roots.editable), 0);
        let first_group = tree.children(roots.editable)[0];
        assert_eq!(wrap_levels(&tree, first_group), 1);
    }

    #[test]
    fn given_root_in_normal_mode_when_adding_then_rejected() {
        let (mut tree, roots) = create_empty();
        let root = tree.root();
        let err = add_group(&mut tree, roots, root).unwrap_err();
        assert!(matches!(err, DomainError::InvalidEdit { .. }));
    }

    #[test]
    fn given_empty_exclusion_root_when_adding_group_then_only_leaf_appended() {
        let (mut tree, roots) = create_empty();
        let exclusion = roots.exclusion.unwrap();

        let roots = add_group(&mut tree, roots, exclusion).unwrap();

        let children = tree.children(exclusion).to_vec();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.kind(children[0]), Some(SegmentKind::Source));
        assert_eq!(roots.exclusion, Some(exclusion));
    }
}
