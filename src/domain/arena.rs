//! Arena-backed segment tree with transient parent/root links.
//!
//! Nodes own their children through `children` index lists. The `parent` and
//! `root` fields are derived relations: absent right after [`SegmentTree::from_node`],
//! populated by [`SegmentTree::link`], cleared by [`SegmentTree::unlink`].

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{SegmentData, SegmentKind, SegmentNode, SourceRef};

/// Tree node in the arena.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Segment payload for this node
    pub data: SegmentData,
    /// Index of the immediate parent, None for the persisted root or when unlinked
    pub parent: Option<Index>,
    /// Index of the persisted root, None when unlinked
    pub root: Option<Index>,
    /// Indices of child nodes in order
    pub children: Vec<Index>,
}

impl TreeNode {
    fn detached(data: SegmentData) -> Self {
        Self {
            data,
            parent: None,
            root: None,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.data.kind == SegmentKind::Source
    }

    /// Combinator with no children, or a leaf without a source reference.
    pub fn is_empty_placeholder(&self) -> bool {
        match self.data.kind {
            SegmentKind::Source => self.data.source_ref.is_none(),
            _ => self.children.is_empty(),
        }
    }
}

/// Arena-based segment tree.
///
/// Each tree has exactly one persisted root. Nodes removed by edits are freed,
/// so indices held across a removal resolve to nothing.
#[derive(Debug, Clone)]
pub struct SegmentTree {
    arena: Arena<TreeNode>,
    root: Index,
}

impl SegmentTree {
    /// Single-node tree, linked.
    pub fn with_root(data: SegmentData) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode::detached(data));
        let mut tree = Self { arena, root };
        tree.link();
        tree
    }

    /// Build an unlinked arena from the wire form.
    ///
    /// Rejects SOURCE nodes (explicit or implicit) that carry children.
    #[instrument(level = "debug", skip(node))]
    pub fn from_node(node: &SegmentNode) -> DomainResult<Self> {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode::detached(Self::data_of(node, 0)?));
        let mut stack: Vec<(Index, &SegmentNode, usize)> = vec![(root, node, 0)];

        while let Some((idx, wire, depth)) = stack.pop() {
            let mut children = Vec::with_capacity(wire.children.len());
            for child in &wire.children {
                let child_idx = arena.insert(TreeNode::detached(Self::data_of(child, depth + 1)?));
                children.push(child_idx);
                stack.push((child_idx, child, depth + 1));
            }
            if let Some(node) = arena.get_mut(idx) {
                node.children = children;
            }
        }

        debug!("from_node: {} nodes", arena.len());
        Ok(Self { arena, root })
    }

    fn data_of(wire: &SegmentNode, depth: usize) -> DomainResult<SegmentData> {
        let kind = wire.effective_kind();
        if kind == SegmentKind::Source && !wire.children.is_empty() {
            let reason = match wire.kind {
                Some(_) => format!("SOURCE node at depth {} has children", depth),
                None => format!("node without kind at depth {} has children", depth),
            };
            return Err(DomainError::malformed(reason));
        }
        Ok(SegmentData {
            kind,
            is_exclusion: wire.is_exclusion.unwrap_or(false),
            source_ref: wire.source_ref.clone(),
        })
    }

    /// Wire form of the tree. `isExclusion` is emitted for the root's children only.
    #[instrument(level = "debug", skip(self))]
    pub fn to_node(&self) -> SegmentNode {
        self.node_at(self.root, 0)
    }

    fn node_at(&self, idx: Index, depth: usize) -> SegmentNode {
        match self.get_node(idx) {
            Some(node) => SegmentNode {
                kind: Some(node.data.kind),
                is_exclusion: (depth == 1).then_some(node.data.is_exclusion),
                source_ref: node.data.source_ref.clone(),
                children: node
                    .children
                    .iter()
                    .map(|&child| self.node_at(child, depth + 1))
                    .collect(),
            },
            None => SegmentNode::default(),
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn kind(&self, idx: Index) -> Option<SegmentKind> {
        self.get_node(idx).map(|n| n.data.kind)
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.get_node(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn source_ref(&self, idx: Index) -> Option<&SourceRef> {
        self.get_node(idx).and_then(|n| n.data.source_ref.as_ref())
    }

    // ============================================================
    // Linking
    // ============================================================

    /// Assign `parent` and `root` to every node in pre-order, overwriting stale values.
    #[instrument(level = "debug", skip(self))]
    pub fn link(&mut self) {
        let root = self.root;
        let mut stack = vec![(root, None)];
        while let Some((idx, parent)) = stack.pop() {
            if let Some(node) = self.arena.get_mut(idx) {
                node.parent = parent;
                node.root = Some(root);
                for &child in node.children.iter().rev() {
                    stack.push((child, Some(idx)));
                }
            }
        }
    }

    /// Clear `parent` and `root` on every node so the tree can be serialized.
    #[instrument(level = "debug", skip(self))]
    pub fn unlink(&mut self) {
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.get_mut(idx) {
                node.parent = None;
                node.root = None;
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// Every reachable node points at the persisted root.
    pub fn is_linked(&self) -> bool {
        self.iter().all(|(_, node)| node.root == Some(self.root))
    }

    /// No reachable node carries a back-reference.
    pub fn is_unlinked(&self) -> bool {
        self.iter()
            .all(|(_, node)| node.parent.is_none() && node.root.is_none())
    }

    pub(crate) fn ensure_linked(&self) -> DomainResult<()> {
        if self.is_linked() {
            Ok(())
        } else {
            Err(DomainError::invalid_edit("tree is not linked"))
        }
    }

    /// Target exists and its parent chain ends at the persisted root.
    pub(crate) fn ensure_reachable(&self, idx: Index) -> DomainResult<()> {
        if !self.is_reachable(idx) {
            return Err(DomainError::invalid_edit(format!(
                "node {:?} is not reachable from the current root",
                idx
            )));
        }
        Ok(())
    }

    /// Walk parent links to the root, checking each hop against the owning children list.
    pub fn is_reachable(&self, idx: Index) -> bool {
        let mut current = idx;
        for _ in 0..=self.arena.len() {
            let Some(node) = self.get_node(current) else {
                return false;
            };
            match node.parent {
                None => return current == self.root,
                Some(parent) => {
                    if !self.children(parent).contains(&current) {
                        return false;
                    }
                    current = parent;
                }
            }
        }
        false
    }

    // ============================================================
    // Arena maintenance used by the engines
    // ============================================================

    /// Insert a node that is not yet attached anywhere.
    pub(crate) fn new_node(&mut self, data: SegmentData) -> Index {
        self.arena.insert(TreeNode::detached(data))
    }

    /// Free a node and all of its descendants.
    pub(crate) fn free_subtree(&mut self, idx: Index) {
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Make `idx` the persisted root and relink the whole tree.
    pub(crate) fn set_root(&mut self, idx: Index) {
        self.root = idx;
        self.link();
    }

    // ============================================================
    // Navigation
    // ============================================================

    /// Child-index path from the persisted root, empty for the root itself.
    pub fn path_of(&self, idx: Index) -> Option<Vec<usize>> {
        if !self.is_reachable(idx) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            let pos = self.children(parent).iter().position(|&c| c == current)?;
            path.push(pos);
            current = parent;
        }
        path.reverse();
        Some(path)
    }

    /// Resolve a child-index path from the persisted root.
    pub fn resolve_path(&self, path: &[usize]) -> Option<Index> {
        path.iter()
            .try_fold(self.root, |idx, &pos| self.children(idx).get(pos).copied())
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of nodes reachable from the persisted root.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of SOURCE leaves reachable from the persisted root.
    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|(_, node)| node.is_leaf()).count()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        1 + self
            .children(idx)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Source references of all populated leaves, in pre-order.
    pub fn sources(&self) -> Vec<&SourceRef> {
        self.iter()
            .filter_map(|(_, node)| node.data.source_ref.as_ref())
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a SegmentTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a SegmentTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev().copied());
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a SegmentTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a SegmentTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
