//! Optimistic delete with a short-lived positional undo.

use crate::client::RemoteClient;
use crate::config::SyncConfig;
use crate::error::SyncResult;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use stridelog_core::{LocalId, LocalStore, Record, SyncEntity};

/// Result of an optimistic delete.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// Whether [`OptimisticDelete::undo`] can restore the record.
    pub can_undo: bool,
}

struct PendingUndo<E> {
    record: Record<E>,
    index: usize,
    deleted_at: Instant,
}

/// Removes a record locally at once, deletes it remotely best-effort, and
/// keeps a compensating undo for a bounded window.
///
/// Only one undo is pending at a time: a new delete or an invoked undo
/// clears any previous pending undo without executing it. Undo reinserts
/// the captured record at its captured index, so to the user the delete
/// never happened.
///
/// The remote delete is fire-and-forget: its failure is logged, never
/// surfaced, and the local removal stands either way. Symmetrically, undo
/// restores only the local record - it cannot un-delete the remote copy.
pub struct OptimisticDelete<E: SyncEntity, C: RemoteClient<E>> {
    store: Arc<LocalStore<E>>,
    client: Arc<C>,
    config: SyncConfig,
    pending: Mutex<Option<PendingUndo<E>>>,
}

impl<E: SyncEntity, C: RemoteClient<E>> OptimisticDelete<E, C> {
    /// Creates a delete coordinator over a store and remote client.
    pub fn new(store: Arc<LocalStore<E>>, client: Arc<C>, config: SyncConfig) -> Self {
        Self {
            store,
            client,
            config,
            pending: Mutex::new(None),
        }
    }

    /// Deletes a record: immediately locally, best-effort remotely.
    ///
    /// Supersedes any previously pending undo.
    ///
    /// # Errors
    ///
    /// Fails only if the record does not exist or the local removal cannot
    /// be persisted. A remote delete failure is swallowed by design.
    pub fn delete(&self, user_id: &str, local_id: LocalId) -> SyncResult<DeleteOutcome> {
        let (index, record) = self.store.remove(local_id)?;

        if let Some(remote_id) = &record.remote_id {
            if let Err(e) = self.client.delete(user_id, remote_id) {
                tracing::warn!(
                    remote_id,
                    error = %e,
                    "best-effort remote delete failed; local removal stands"
                );
            }
        }

        *self.pending.lock() = Some(PendingUndo {
            record,
            index,
            deleted_at: Instant::now(),
        });

        Ok(DeleteOutcome { can_undo: true })
    }

    /// Restores the most recently deleted record at its original position.
    ///
    /// Returns `true` if a record was restored, `false` if there was no
    /// pending undo or its window had elapsed. The pending undo is consumed
    /// either way.
    ///
    /// # Errors
    ///
    /// Fails if the reinsertion cannot be persisted.
    pub fn undo(&self) -> SyncResult<bool> {
        let Some(pending) = self.pending.lock().take() else {
            return Ok(false);
        };

        if pending.deleted_at.elapsed() > self.config.undo_window {
            tracing::debug!(local_id = %pending.record.local_id, "undo window elapsed");
            return Ok(false);
        }

        // Other deletes inside the window may have shrunk the list
        let at = pending.index.min(self.store.len());
        self.store.insert(pending.record, Some(at))?;
        Ok(true)
    }

    /// Returns true if an undo is currently available.
    pub fn can_undo(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|p| p.deleted_at.elapsed() <= self.config.undo_window)
    }
}
