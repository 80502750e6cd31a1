//! I/O boundary traits for testability
//!
//! These traits abstract the external collaborators of the editing engine,
//! allowing services to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use crate::domain::{ColumnCandidate, SourceCandidate};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persisted segment trees, keyed by list identifier and owned by a record
/// (e.g. a campaign).
pub trait SegmentStore: Send + Sync {
    /// Identifier of the list owned by `owner`, if one has been saved.
    fn list_id_for(&self, owner: &str) -> io::Result<Option<String>>;

    /// Serialized root of the list.
    fn load(&self, list_id: &str) -> io::Result<String>;

    /// Store the serialized root as the list of `owner`. Returns whether the
    /// store accepted it.
    fn save(&self, owner: &str, payload: &str) -> io::Result<bool>;
}

/// Leaf-reference and join-column lookup.
pub trait SourceCatalog: Send + Sync {
    /// Sources of kind `schema` whose name matches `term`, at most `limit`.
    fn suggest(&self, term: &str, schema: &str, limit: usize) -> io::Result<Vec<SourceCandidate>>;

    /// Candidate join columns of a report source.
    fn join_columns(&self, source_id: &str) -> io::Result<Vec<ColumnCandidate>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
