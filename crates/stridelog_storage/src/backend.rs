//! Storage backend trait definition.

use crate::error::StorageResult;

/// A keyed blob store for Stridelog.
///
/// Backends are **opaque byte stores**. One key holds one blob; Stridelog
/// owns all blob format interpretation - backends do not understand records,
/// entities, or sync state.
///
/// # Invariants
///
/// - `store` is atomic: a reader never observes a half-written blob, even
///   across a crash mid-write
/// - `store` is durable: once it returns `Ok`, the blob survives process
///   termination
/// - `load` returns exactly the bytes most recently stored under that key,
///   or `None` if the key was never stored (or was removed)
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Loads the blob stored under `key`.
    ///
    /// Returns `None` if no blob exists for the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `data` under `key`, replacing any previous blob.
    ///
    /// After this returns successfully, the blob is guaranteed to survive
    /// process termination, and a concurrent or post-crash `load` sees
    /// either the previous blob or this one - never a mix.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be made durable. The previous
    /// blob (if any) must remain intact in that case.
    fn store(&self, key: &str, data: &[u8]) -> StorageResult<()>;

    /// Removes the blob stored under `key`.
    ///
    /// Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
