//! Sync engine facade: push-then-pull cycles with stats.

use crate::client::RemoteClient;
use crate::error::SyncResult;
use crate::pull::{PullOutcome, PullSynchronizer};
use crate::push::{PushOutcome, PushSynchronizer};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stridelog_core::{LocalStore, SyncEntity};

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total number of sync cycles completed.
    pub cycles_completed: u64,
    /// Total number of records pushed.
    pub records_pushed: u64,
    /// Total number of records pulled.
    pub records_pulled: u64,
    /// Last sync time.
    pub last_sync_time: Option<Instant>,
    /// Last error message, if the last cycle failed or halted.
    pub last_error: Option<String>,
}

/// Result of a sync cycle.
#[derive(Debug)]
pub struct SyncCycleResult {
    /// Records pushed in this cycle.
    pub pushed: usize,
    /// True if the push walk halted on a remote failure.
    pub push_halted: bool,
    /// Records pulled in this cycle.
    pub pulled: usize,
    /// Duration of the cycle.
    pub duration: Duration,
}

/// Composes the push and pull synchronizers for one entity type.
///
/// The engine owns no schedule: the host application decides when to call
/// [`sync`](SyncEngine::sync) (a manual "sync now" trigger or its own
/// timer), and when to retry after a failure.
pub struct SyncEngine<E: SyncEntity, C: RemoteClient<E>> {
    push: PushSynchronizer<E, C>,
    pull: PullSynchronizer<E, C>,
    stats: RwLock<SyncStats>,
}

impl<E: SyncEntity, C: RemoteClient<E>> SyncEngine<E, C> {
    /// Creates a sync engine over a store and remote client.
    pub fn new(store: Arc<LocalStore<E>>, client: Arc<C>) -> Self {
        Self {
            push: PushSynchronizer::new(Arc::clone(&store), Arc::clone(&client)),
            pull: PullSynchronizer::new(store, client),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Pushes all dirty records. See [`PushSynchronizer::push_all`].
    pub fn push_all(&self, user_id: &str) -> SyncResult<PushOutcome> {
        self.push.push_all(user_id)
    }

    /// Pulls and merges the remote record set. See
    /// [`PullSynchronizer::pull_all`].
    pub fn pull_all(&self, user_id: &str) -> SyncResult<PullOutcome> {
        self.pull.pull_all(user_id)
    }

    /// Runs a full cycle: push local changes, then pull remote ones.
    ///
    /// A halted push is partial progress, not an error; the cycle proceeds
    /// to the pull phase and the halt is reported in the result and stats.
    ///
    /// # Errors
    ///
    /// Returns an error if a phase is already in flight, the pull fetch
    /// fails, or a local durable write fails.
    pub fn sync(&self, user_id: &str) -> SyncResult<SyncCycleResult> {
        let start = Instant::now();

        let push = match self.push.push_all(user_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_error(&e.to_string());
                return Err(e);
            }
        };

        let pull = match self.pull.pull_all(user_id) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.record_error(&e.to_string());
                return Err(e);
            }
        };

        let result = SyncCycleResult {
            pushed: push.pushed,
            push_halted: push.halted.is_some(),
            pulled: pull.pulled,
            duration: start.elapsed(),
        };

        {
            let mut stats = self.stats.write();
            stats.cycles_completed += 1;
            stats.records_pushed += result.pushed as u64;
            stats.records_pulled += result.pulled as u64;
            stats.last_sync_time = Some(Instant::now());
            stats.last_error = push.halted.map(|halt| halt.error.to_string());
        }

        tracing::debug!(
            pushed = result.pushed,
            pulled = result.pulled,
            halted = result.push_halted,
            "sync cycle complete"
        );
        Ok(result)
    }

    fn record_error(&self, message: &str) {
        self.stats.write().last_error = Some(message.to_string());
    }
}
