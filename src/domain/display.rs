/*
Rendering lives behind a trait so the same call works for the linked arena
and for the owned wire form.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::SegmentTree;
use crate::domain::invariants::format_path;
use crate::domain::node::{SegmentData, SegmentNode};

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for SegmentTree {
    /// Each label is prefixed with the node's child-index path.
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build(tree: &SegmentTree, idx: Index, path: &mut Vec<usize>) -> Tree<String> {
            let label = tree
                .get_node(idx)
                .map(|node| format!("[{}] {}", format_path(path), node.data))
                .unwrap_or_else(|| format!("[{}] <missing>", format_path(path)));
            let mut out = Tree::new(label);
            for (pos, &child) in tree.children(idx).iter().enumerate() {
                path.push(pos);
                out.push(build(tree, child, path));
                path.pop();
            }
            out
        }

        build(self, self.root(), &mut Vec::new())
    }
}

impl TreeDisplay for SegmentNode {
    fn to_tree_string(&self) -> Tree<String> {
        let data = SegmentData {
            kind: self.effective_kind(),
            is_exclusion: self.is_exclusion.unwrap_or(false),
            source_ref: self.source_ref.clone(),
        };
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(data.to_string()).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::create_empty;

    #[test]
    fn given_fresh_tree_when_rendering_then_labels_carry_paths() {
        let (tree, _) = create_empty();
        let rendered = tree.to_tree_string().to_string();
        assert!(rendered.starts_with("[.] AND"));
        assert!(rendered.contains("[0] SOURCE <empty>"));
        assert!(rendered.contains("[1] AND [exclude]"));
    }
}
