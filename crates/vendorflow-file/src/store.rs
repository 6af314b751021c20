//! JSON file holding the persisted session entries.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument};

use vendorflow_core::error::StorageError;
use vendorflow_core::{CredentialStorage, Error, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

type Entries = BTreeMap<String, String>;

fn map_io(path: &Path, err: std::io::Error) -> Error {
    Error::Storage(StorageError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// A [`CredentialStorage`] persisted as one JSON object in a file.
///
/// Writes go through a temporary file and a rename while an exclusive lock
/// on a sibling `.lock` file is held, so several processes can share one
/// session file. The file is created with mode `0600` on Unix.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by `path`. Nothing is created until the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// All stored entries.
    pub fn entries(&self) -> Result<BTreeMap<String, String>> {
        self.read_entries()
    }

    fn read_entries(&self) -> Result<Entries> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(map_io(&self.path, e)),
        };
        if json.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&json).map_err(|e| {
            Error::Storage(StorageError::Corrupt {
                key: self.path.display().to_string(),
                message: e.to_string(),
            })
        })
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(map_io(&self.path, e)),
            };
        }

        let json = serde_json::to_string_pretty(entries)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, &json).map_err(|e| map_io(&temp_path, e))?;

        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| map_io(&temp_path, e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| map_io(&self.path, e))
    }

    /// Run `update` on the entries with the lock held, then write them back.
    fn modify(&self, update: impl FnOnce(&mut Entries)) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| map_io(parent, e))?;
        }

        let lock_path = self.lock_path();
        let lock_file: File = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| map_io(&lock_path, e))?;
        lock_file.lock_exclusive().map_err(|e| map_io(&lock_path, e))?;

        let result = self.read_entries().and_then(|mut entries| {
            update(&mut entries);
            self.write_entries(&entries)
        });

        lock_file.unlock().map_err(|e| map_io(&lock_path, e))?;
        result
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })?;
        debug!("Stored session entry");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, FileStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("session").join("session.json"));
        (dir, storage)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, storage) = storage();
        assert_eq!(storage.get("authToken").unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn entries_persist_across_instances() {
        let (_dir, storage) = storage();
        storage.set("authToken", "tok-1").unwrap();
        storage.set("tokenExpiry", "1700000000000").unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("tok-1"));
        assert_eq!(reopened.entries().unwrap().len(), 2);
    }

    #[test]
    fn removing_last_entry_deletes_file() {
        let (_dir, storage) = storage();
        storage.set("authToken", "tok-1").unwrap();
        assert!(storage.path().exists());

        storage.remove("authToken").unwrap();
        storage.remove("authToken").unwrap();
        assert!(!storage.path().exists());
        assert_eq!(storage.get("authToken").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (_dir, storage) = storage();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{not json").unwrap();

        let err = storage.get("authToken").unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        let (_dir, storage) = storage();
        storage.set("authToken", "tok-1").unwrap();
        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
