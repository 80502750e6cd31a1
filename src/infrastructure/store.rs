//! File-backed segment store: one JSON document per owner.
//!
//! ```text
//! <store_dir>/
//!   <owner>.json        <- serialized persisted root
//! ```
//!
//! The list identifier equals the owner identifier.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::infrastructure::traits::{FileSystem, SegmentStore};

const LIST_SUFFIX: &str = "json";

pub struct FileSegmentStore {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl FileSegmentStore {
    pub fn new(fs: Arc<dyn FileSystem>, dir: PathBuf) -> Self {
        Self { fs, dir }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn list_path(&self, id: &str) -> io::Result<PathBuf> {
        let valid = !id.is_empty()
            && !id.starts_with('.')
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid list identifier: {:?}", id),
            ));
        }
        Ok(self.dir.join(format!("{}.{}", id, LIST_SUFFIX)))
    }
}

impl SegmentStore for FileSegmentStore {
    fn list_id_for(&self, owner: &str) -> io::Result<Option<String>> {
        let path = self.list_path(owner)?;
        Ok(self.fs.exists(&path).then(|| owner.to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    fn load(&self, list_id: &str) -> io::Result<String> {
        let path = self.list_path(list_id)?;
        self.fs.read_to_string(&path)
    }

    #[instrument(level = "debug", skip(self, payload))]
    fn save(&self, owner: &str, payload: &str) -> io::Result<bool> {
        let path = self.list_path(owner)?;
        self.fs.ensure_parent(&path)?;

        // Write next to the target, then rename over it
        let tmp = path.with_extension(format!("{}.tmp", LIST_SUFFIX));
        self.fs.write(&tmp, payload)?;
        self.fs.rename(&tmp, &path)?;
        debug!("saved list {} to {}", owner, path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn given_path_like_owner_when_saving_then_rejected() {
        let temp = TempDir::new().unwrap();
        let store = FileSegmentStore::new(Arc::new(RealFileSystem), temp.path().to_path_buf());
        let err = store.save("../escape", "{}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn given_saved_list_when_looking_up_owner_then_found() {
        let temp = TempDir::new().unwrap();
        let store = FileSegmentStore::new(Arc::new(RealFileSystem), temp.path().join("lists"));
        assert_eq!(store.list_id_for("cmp-1").unwrap(), None);

        assert!(store.save("cmp-1", "{}").unwrap());

        assert_eq!(store.list_id_for("cmp-1").unwrap(), Some("cmp-1".to_string()));
        assert_eq!(store.load("cmp-1").unwrap(), "{}");
    }
}
