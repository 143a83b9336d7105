//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stored blob is corrupted or unreadable.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// The backend rejected a write.
    #[error("write failed: {0}")]
    WriteFailed(String),
}
