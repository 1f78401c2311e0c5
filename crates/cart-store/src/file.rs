use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::PersistentStore;

/// File extension used for value files.
const VALUE_EXT: &str = "bin";

/// Directory-backed key/value store.
///
/// Each key is stored in its own file named after the hex encoding of the
/// key, so arbitrary keys (including `@RocketShoes:cart`) map to portable
/// file names. Writes go to a temporary file in the same directory which is
/// then renamed over the target, making replacement atomic.
///
/// Writes are synchronous and fsync before the rename, so they block the
/// calling thread until the data is on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the value files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self
            .root
            .join(format!("{}.{VALUE_EXT}", hex::encode(key.as_bytes()))))
    }
}

impl PersistentStore for FileStore {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(key, bytes = value.len(), path = %path.display(), "value written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("carts");
        let store = FileStore::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.read("@RocketShoes:cart").unwrap().is_none());
        assert!(!store.path_for("@RocketShoes:cart").unwrap().exists());
    }

    #[test]
    fn write_then_read_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.write("@RocketShoes:cart", b"[1,2,3]").unwrap();
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.read("@RocketShoes:cart").unwrap().unwrap(), b"[1,2,3]");
    }

    #[test]
    fn write_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.write("cart", b"first").unwrap();
        store.write("cart", b"second").unwrap();
        assert_eq!(store.read("cart").unwrap().unwrap(), b"second");
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn keys_are_hex_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let path = store.path_for("a:b").unwrap();
        assert_eq!(path.file_name().unwrap(), "613a62.bin");
    }

    #[test]
    fn empty_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(store.write("", b"x"), Err(StoreError::InvalidKey(_))));
    }
}
