//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory storage backend.
///
/// This backend stores all blobs in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Failure injection
///
/// Tests can flip [`set_fail_writes`](InMemoryBackend::set_fail_writes) to
/// make every subsequent `store` fail without touching existing blobs. This
/// exercises the persistence-failure paths of callers.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the blob stored under `key`, if any.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().get(key).cloned()
    }

    /// Returns the number of stored blobs.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.blobs.read().len()
    }

    /// Makes every subsequent `store` call fail when `fail` is true.
    ///
    /// Existing blobs are left intact, matching the contract that a failed
    /// write never damages the previous blob.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Clears all blobs from the backend.
    pub fn clear(&self) {
        self.blobs.write().clear();
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn store(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed(format!(
                "injected write failure for key {key:?}"
            )));
        }
        self.blobs.write().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.blobs.write().remove(key);
        Ok(())
    }
}
