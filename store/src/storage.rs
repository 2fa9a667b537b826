//! File-backed [`StateStorage`].

use offerdesk_core::environment::{StateStorage, StorageError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn atomic_write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(data)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        self.atomic_write(&path, value.as_bytes())
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: format!("{}: {e}", path.display()),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write {
                key: key.to_string(),
                reason: format!("{}: {e}", path.display()),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.load("offerdesk-store").unwrap(), None);
    }

    #[test]
    fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.save("offerdesk-store", "{\"version\":1}").unwrap();
        assert!(storage.path_for("offerdesk-store").exists());
        assert_eq!(
            storage.load("offerdesk-store").unwrap().as_deref(),
            Some("{\"version\":1}")
        );

        storage.save("offerdesk-store", "{\"version\":2}").unwrap();
        assert_eq!(
            storage.load("offerdesk-store").unwrap().as_deref(),
            Some("{\"version\":2}")
        );

        storage.remove("offerdesk-store").unwrap();
        storage.remove("offerdesk-store").unwrap();
        assert_eq!(storage.load("offerdesk-store").unwrap(), None);
    }

    #[test]
    fn unreadable_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        fs::create_dir_all(storage.path_for("blocked")).unwrap();

        assert!(matches!(
            storage.load("blocked"),
            Err(StorageError::Read { .. })
        ));
    }
}
