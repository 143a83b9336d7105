//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error talking to the remote service.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The remote service rejected the request.
    #[error("remote service error: {0}")]
    Remote(String),

    /// Local store error during sync.
    ///
    /// Distinct from transport failures: a record that succeeded remotely
    /// but failed to stamp locally risks being re-created on the next push.
    #[error("store error: {0}")]
    Store(#[from] stridelog_core::StoreError),

    /// A sync of the same kind is already in flight for this entity type.
    #[error("{operation} already in progress")]
    SyncInProgress {
        /// The operation that was rejected.
        operation: &'static str,
    },
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Remote(_) => true,
            SyncError::Store(_) => false,
            SyncError::SyncInProgress { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection lost").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Remote("503".into()).is_retryable());
        assert!(SyncError::SyncInProgress { operation: "push" }.is_retryable());
    }

    #[test]
    fn store_errors_are_not_retryable() {
        let err = SyncError::Store(stridelog_core::StoreError::Codec("bad blob".into()));
        assert!(!err.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::SyncInProgress { operation: "pull" };
        assert_eq!(err.to_string(), "pull already in progress");

        let err = SyncError::transport_retryable("timed out");
        assert!(err.to_string().contains("timed out"));
    }
}
