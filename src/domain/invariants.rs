//! Structural checks for the persisted-root shape, flag placement, empty
//! combinators and link consistency.

use std::fmt;

use generational_arena::Index;

use crate::domain::arena::SegmentTree;
use crate::domain::builder::RootPointers;
use crate::domain::node::SegmentKind;

/// One violated structural rule, located by child-index path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Vec<usize>,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

/// Render a child-index path as `0.1.2`, or `.` for the persisted root.
pub fn format_path(path: &[usize]) -> String {
    if path.is_empty() {
        ".".to_string()
    } else {
        itertools::join(path, ".")
    }
}

/// Check a tree against the persisted-root invariants.
///
/// When `roots` is given, the held pointers are checked as well; a degraded
/// pointer pair only requires the editable root to be the persisted root.
pub fn validate(tree: &SegmentTree, roots: Option<RootPointers>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut report =
        |path: Vec<usize>, message: String| violations.push(Violation { path, message });

    let root = tree.root();
    let root_children = tree.children(root).to_vec();
    let degraded = roots.is_some_and(|r| r.is_degraded());

    if !degraded {
        if tree.kind(root) != Some(SegmentKind::And) {
            report(vec![], "persisted root is not AND".into());
        }
        if root_children.len() != 2 {
            report(
                vec![],
                format!("persisted root has {} children instead of 2", root_children.len()),
            );
        }
        let flagged = root_children
            .iter()
            .filter(|&&c| tree.get_node(c).is_some_and(|n| n.data.is_exclusion))
            .count();
        if root_children.len() == 2 && flagged != 1 {
            report(vec![], format!("{} exclusion children instead of 1", flagged));
        }
    }

    let linked = tree.is_linked();
    let mut stack: Vec<(Index, Vec<usize>, Option<Index>)> = vec![(root, vec![], None)];
    while let Some((idx, path, parent)) = stack.pop() {
        let Some(node) = tree.get_node(idx) else {
            report(path, "dangling child index".into());
            continue;
        };
        let in_root_slot = path.len() == 1;

        if node.data.is_exclusion && !in_root_slot {
            report(path.clone(), "exclusion flag below the root's children".into());
        }
        match node.data.kind {
            SegmentKind::Source if !node.children.is_empty() => {
                report(path.clone(), "SOURCE node has children".into());
            }
            SegmentKind::And | SegmentKind::Or
                if node.children.is_empty() && !(in_root_slot || (degraded && idx == root)) =>
            {
                report(path.clone(), format!("{} node has no children", node.data.kind));
            }
            _ => {}
        }
        if linked {
            if node.parent != parent {
                report(path.clone(), "parent link disagrees with children".into());
            }
            if node.root != Some(root) {
                report(path.clone(), "root link does not point at the persisted root".into());
            }
        }

        for (pos, &child) in node.children.iter().enumerate().rev() {
            let mut child_path = path.clone();
            child_path.push(pos);
            stack.push((child, child_path, Some(idx)));
        }
    }

    if let Some(roots) = roots {
        match roots.exclusion {
            None => {
                if roots.editable != root {
                    report(vec![], "degraded editable root is not the persisted root".into());
                }
            }
            Some(exclusion) => {
                for (name, held) in [("editable", roots.editable), ("exclusion", exclusion)] {
                    if !root_children.contains(&held) {
                        report(
                            vec![],
                            format!("{} root is not a child of the persisted root", name),
                        );
                    }
                }
                if tree.get_node(exclusion).is_some_and(|n| !n.data.is_exclusion) {
                    report(vec![], "exclusion root is not flagged".into());
                }
            }
        }
    }

    violations
}
