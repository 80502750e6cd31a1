//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the segment-tree model.
/// These are independent of storage and transport concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Loaded tree does not have the persisted-root shape or breaks the node model.
    #[error("malformed segment tree: {reason}")]
    MalformedTree { reason: String },

    /// Edit requested against a node that is stale, unreachable, or the wrong kind.
    #[error("invalid edit: {reason}")]
    InvalidEdit { reason: String },
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            reason: reason.into(),
        }
    }

    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            reason: reason.into(),
        }
    }
}

/// Result type for tree operations.
pub type DomainResult<T> = Result<T, DomainError>;
