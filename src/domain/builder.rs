//! Tree builder: fresh trees and splitting loaded trees into their editable roots.

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::SegmentTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{SegmentData, SegmentKind};

/// The caller-held pointers into a persisted tree.
///
/// Every edit returns a fresh value; the held copy must be replaced with it
/// because wraps and collapses can move either root.
#[must_use = "edits may move the roots; replace the held pointers with the returned ones"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootPointers {
    /// Root of the included criteria
    pub editable: Index,
    /// Root of the exclusion subtree, None in degraded mode
    pub exclusion: Option<Index>,
}

impl RootPointers {
    /// Whether `idx` is one of the held roots.
    pub fn holds(&self, idx: Index) -> bool {
        self.editable == idx || self.exclusion == Some(idx)
    }

    pub fn is_degraded(&self) -> bool {
        self.exclusion.is_none()
    }

    /// Redirect any held pointer from `old` to `new`.
    pub(crate) fn replace(self, old: Index, new: Index) -> Self {
        Self {
            editable: if self.editable == old { new } else { self.editable },
            exclusion: self.exclusion.map(|e| if e == old { new } else { e }),
        }
    }
}

/// Fresh tree: `AND{ empty leaf, AND[exclude]{} }`, linked.
#[instrument(level = "debug")]
pub fn create_empty() -> (SegmentTree, RootPointers) {
    let mut tree = SegmentTree::with_root(SegmentData::and());
    let root = tree.root();

    let included = tree.new_node(SegmentData::leaf());
    let excluded = tree.new_node(SegmentData {
        is_exclusion: true,
        ..SegmentData::and()
    });
    if let Some(node) = tree.get_node_mut(root) {
        node.children = vec![included, excluded];
    }
    tree.link();

    let roots = RootPointers {
        editable: included,
        exclusion: Some(excluded),
    };
    (tree, roots)
}

/// Link a loaded tree and locate its included and excluded children.
///
/// The children are told apart by their `isExclusion` flag, not by position.
#[instrument(level = "debug", skip(tree))]
pub fn split_loaded(tree: &mut SegmentTree) -> DomainResult<RootPointers> {
    tree.link();
    let root = tree.root();

    if tree.kind(root) != Some(SegmentKind::And) {
        return Err(DomainError::malformed(format!(
            "persisted root is {} instead of AND",
            tree.kind(root).unwrap_or_default()
        )));
    }
    let children = tree.children(root);
    if children.len() != 2 {
        return Err(DomainError::malformed(format!(
            "persisted root has {} children instead of 2",
            children.len()
        )));
    }

    let (first, second) = (children[0], children[1]);
    let flagged = |idx| {
        tree.get_node(idx)
            .map(|n| n.data.is_exclusion)
            .unwrap_or(false)
    };
    let roots = match (flagged(first), flagged(second)) {
        (false, true) => RootPointers {
            editable: first,
            exclusion: Some(second),
        },
        (true, false) => RootPointers {
            editable: second,
            exclusion: Some(first),
        },
        (a, b) => {
            return Err(DomainError::malformed(format!(
                "expected exactly one exclusion child, found {}",
                usize::from(a) + usize::from(b)
            )))
        }
    };
    debug!("split_loaded: editable={:?} exclusion={:?}", roots.editable, roots.exclusion);
    Ok(roots)
}

/// Degraded fallback for trees that fail [`split_loaded`]: the whole tree is
/// the editable root and there is no exclusion subtree.
#[instrument(level = "debug", skip(tree))]
pub fn split_degraded(tree: &mut SegmentTree) -> RootPointers {
    tree.link();
    warn!("editing segment tree in degraded mode (no exclusion subtree)");
    RootPointers {
        editable: tree.root(),
        exclusion: None,
    }
}
