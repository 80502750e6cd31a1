//! List editing session and the load/save service
//!
//! A [`ListSession`] owns one linked segment tree together with the held
//! [`RootPointers`]. Edits go through the session so the held pointers are
//! always replaced with the ones the engine returns.
//!
//! ```text
//! store ──load──▶ decode ──▶ split_loaded ──▶ ListSession (linked)
//!                                                 │ edits
//! store ◀──save── encode ◀── unlink/to_node/link ◀┘
//! ```

use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, info, instrument, warn};

use crate::application::codec;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{
    self, create_empty, split_degraded, split_loaded, DomainError, DomainResult, RootPointers,
    SegmentNode, SegmentTree, SourceRef, Violation,
};
use crate::infrastructure::traits::SegmentStore;

/// How to treat a persisted root that does not have the included/excluded shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Reject with `MalformedTree`
    #[default]
    Strict,
    /// Fall back to editing the whole tree without an exclusion subtree
    AllowDegraded,
}

/// Parse a dot-separated child-index path; `.` and the empty string address
/// the persisted root.
pub fn parse_path(path: &str) -> DomainResult<Vec<usize>> {
    let path = path.trim();
    if path.is_empty() || path == "." {
        return Ok(Vec::new());
    }
    path.split('.')
        .map(|part| {
            part.parse::<usize>().map_err(|_| {
                DomainError::invalid_edit(format!("invalid path segment {:?} in {:?}", part, path))
            })
        })
        .collect()
}

/// One open segment list: owner, tree and the held root pointers.
#[derive(Debug)]
pub struct ListSession {
    owner: String,
    list_id: Option<String>,
    tree: SegmentTree,
    roots: RootPointers,
}

impl ListSession {
    /// Fresh, unsaved list for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        let (tree, roots) = create_empty();
        Self {
            owner: owner.into(),
            list_id: None,
            tree,
            roots,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn list_id(&self) -> Option<&str> {
        self.list_id.as_deref()
    }

    pub fn tree(&self) -> &SegmentTree {
        &self.tree
    }

    pub fn roots(&self) -> RootPointers {
        self.roots
    }

    pub fn is_degraded(&self) -> bool {
        self.roots.is_degraded()
    }

    /// Node addressed by a child-index path from the persisted root.
    pub fn resolve(&self, path: &[usize]) -> DomainResult<Index> {
        self.tree.resolve_path(path).ok_or_else(|| {
            DomainError::invalid_edit(format!("no node at {}", domain::format_path(path)))
        })
    }

    pub fn add_group(&mut self, target: Index) -> DomainResult<RootPointers> {
        self.roots = domain::add_group(&mut self.tree, self.roots, target)?;
        self.check("add_group");
        Ok(self.roots)
    }

    pub fn add_source(&mut self, target: Index) -> DomainResult<RootPointers> {
        self.roots = domain::add_source(&mut self.tree, self.roots, target)?;
        self.check("add_source");
        Ok(self.roots)
    }

    pub fn set_source(
        &mut self,
        target: Index,
        source_ref: SourceRef,
    ) -> DomainResult<RootPointers> {
        self.roots = domain::set_source(&mut self.tree, self.roots, target, source_ref)?;
        self.check("set_source");
        Ok(self.roots)
    }

    pub fn clear_source(&mut self, target: Index) -> DomainResult<RootPointers> {
        self.roots = domain::clear_source(&mut self.tree, self.roots, target)?;
        self.check("clear_source");
        Ok(self.roots)
    }

    pub fn delete(&mut self, target: Index) -> DomainResult<RootPointers> {
        self.roots = domain::delete_node(&mut self.tree, self.roots, target)?;
        self.check("delete");
        Ok(self.roots)
    }

    /// Wire form of the whole tree. The tree is unlinked for the duration of
    /// the conversion and linked again before returning.
    pub fn snapshot(&mut self) -> SegmentNode {
        self.tree.unlink();
        let node = self.tree.to_node();
        self.tree.link();
        node
    }

    pub fn violations(&self) -> Vec<Violation> {
        domain::validate(&self.tree, Some(self.roots))
    }

    fn check(&self, op: &str) {
        if cfg!(debug_assertions) {
            for violation in self.violations() {
                warn!("{} left a violation at {}", op, violation);
            }
        }
    }
}

/// Load, create and save segment lists through a [`SegmentStore`].
pub struct ListService {
    store: Arc<dyn SegmentStore>,
}

impl ListService {
    pub fn new(store: Arc<dyn SegmentStore>) -> Self {
        Self { store }
    }

    /// Fresh list for `owner`; nothing is written until [`ListService::save`].
    #[instrument(level = "debug", skip(self))]
    pub fn create(&self, owner: &str) -> ListSession {
        ListSession::new(owner)
    }

    /// The saved list of `owner`, or a fresh one if the owner has none yet.
    #[instrument(level = "debug", skip(self))]
    pub fn open(&self, owner: &str, mode: LoadMode) -> ApplicationResult<ListSession> {
        match self
            .store
            .list_id_for(owner)
            .with_transport_context("look up list of", owner)?
        {
            Some(list_id) => self.load(owner, &list_id, mode),
            None => {
                debug!("no list saved for {}, starting fresh", owner);
                Ok(self.create(owner))
            }
        }
    }

    /// Fetch, decode and split a persisted list.
    ///
    /// Nothing is returned unless every step succeeds; a failed load leaves
    /// no partial session behind.
    #[instrument(level = "debug", skip(self))]
    pub fn load(
        &self,
        owner: &str,
        list_id: &str,
        mode: LoadMode,
    ) -> ApplicationResult<ListSession> {
        let payload = self
            .store
            .load(list_id)
            .with_transport_context("load list", list_id)?;
        let mut tree = codec::decode(&payload)?;

        let roots = match split_loaded(&mut tree) {
            Ok(roots) => roots,
            Err(e @ DomainError::MalformedTree { .. }) if mode == LoadMode::AllowDegraded => {
                warn!("list {} is malformed ({}), opening degraded", list_id, e);
                split_degraded(&mut tree)
            }
            Err(e) => return Err(e.into()),
        };
        info!("loaded list {} ({} nodes)", list_id, tree.node_count());

        Ok(ListSession {
            owner: owner.to_string(),
            list_id: Some(list_id.to_string()),
            tree,
            roots,
        })
    }

    /// Serialize the session's tree and hand it to the store.
    ///
    /// Returns whether the store accepted the payload. On any failure the
    /// session stays linked and editable, and the save can be retried.
    /// An accepted save whose id lookup fails still returns `Ok(true)`.
    #[instrument(level = "debug", skip(self, session), fields(owner = %session.owner))]
    pub fn save(&self, session: &mut ListSession) -> ApplicationResult<bool> {
        let node = session.snapshot();
        let payload = codec::encode_node(&node)?;

        let accepted = self
            .store
            .save(&session.owner, &payload)
            .with_transport_context("save list of", &session.owner)?;
        if !accepted {
            warn!("store rejected list of {}", session.owner);
            return Ok(false);
        }

        // The payload is stored; a failed id lookup leaves `list_id` unset
        if session.list_id.is_none() {
            match self.store.list_id_for(&session.owner) {
                Ok(list_id) => session.list_id = list_id,
                Err(e) => warn!("saved list of {} but id lookup failed: {}", session.owner, e),
            }
        }
        debug!("saved list {:?}", session.list_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".", vec![])]
    #[case("", vec![])]
    #[case("0", vec![0])]
    #[case("0.1.2", vec![0, 1, 2])]
    fn given_path_string_when_parsing_then_indices(
        #[case] input: &str,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(parse_path(input).unwrap(), expected);
    }

    #[test]
    fn given_garbage_path_when_parsing_then_invalid_edit() {
        assert!(matches!(
            parse_path("0.x"),
            Err(DomainError::InvalidEdit { .. })
        ));
    }

    #[test]
    fn given_session_when_snapshotting_then_stays_linked() {
        let mut session = ListSession::new("cmp-1");
        let node = session.snapshot();
        assert_eq!(node.children.len(), 2);
        assert!(session.tree().is_linked());
        assert!(session.violations().is_empty());
    }
}
