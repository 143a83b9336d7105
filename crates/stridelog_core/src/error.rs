//! Error types for the local record store.

use crate::record::LocalId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in local store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Durable write or read failed.
    #[error("storage error: {0}")]
    Storage(#[from] stridelog_storage::StorageError),

    /// The persisted blob could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// A record with this local id already exists in the store.
    #[error("duplicate local id: {local_id}")]
    DuplicateLocalId {
        /// The conflicting local id.
        local_id: LocalId,
    },

    /// A record with this remote id already exists in the store.
    #[error("duplicate remote id: {remote_id:?}")]
    DuplicateRemoteId {
        /// The conflicting remote id.
        remote_id: String,
    },

    /// Attempted to change a remote id that was already set.
    #[error("remote id already set on record {local_id}")]
    RemoteIdReassigned {
        /// The record whose remote id was already set.
        local_id: LocalId,
    },

    /// Attempted to mark a record clean while it has no remote id.
    #[error("cannot stamp record {local_id} clean without a remote id")]
    StampWithoutRemoteId {
        /// The record that has no remote id.
        local_id: LocalId,
    },

    /// No record with this local id exists in the store.
    #[error("record not found: {local_id}")]
    RecordNotFound {
        /// The local id that was not found.
        local_id: LocalId,
    },

    /// Insertion index is beyond the end of the list.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        /// The requested insertion index.
        index: usize,
        /// The current list length.
        len: usize,
    },
}
