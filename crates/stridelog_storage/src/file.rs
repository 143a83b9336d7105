//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// Each key maps to one file (`<root>/<key>.blob`). Data survives process
/// restarts.
///
/// # Durability and atomicity
///
/// `store` writes to a temporary file in the same directory, calls
/// `sync_all`, renames over the target, then syncs the directory so the
/// rename itself is on disk. A crash at any point leaves either the
/// previous blob or the new one on disk - never a partial write.
///
/// # Thread Safety
///
/// This backend is thread-safe. A single write lock serializes stores so
/// two concurrent writes to the same key cannot race on the temp file.
///
/// # Example
///
/// ```no_run
/// use stridelog_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("/var/lib/stridelog")).unwrap();
/// backend.store("runs", b"record list blob").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Opens a file backend rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the root directory of this backend.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> StorageResult<PathBuf> {
        // Keys become file names; reject anything that would escape the root.
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(StorageError::WriteFailed(format!(
                "invalid storage key {key:?}"
            )));
        }
        Ok(self.root.join(format!("{key}.blob")))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.blob.tmp"))
    }

    // The rename only hits disk once its directory entry is flushed.
    #[cfg(unix)]
    fn sync_root(&self) -> StorageResult<()> {
        File::open(&self.root)?.sync_all()?;
        Ok(())
    }

    // Windows has no directory handle sync; the rename is best-effort there.
    #[cfg(not(unix))]
    fn sync_root(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.blob_path(key)?;
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }

    fn store(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let path = self.blob_path(key)?;
        let tmp = self.temp_path(key);

        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        self.sync_root()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
