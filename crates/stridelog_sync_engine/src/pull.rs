//! Pull synchronization: additive merge of remote-originated records.

use crate::client::RemoteClient;
use crate::error::SyncResult;
use crate::guard::InFlightGuard;
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use stridelog_core::{LocalStore, Record, SyncEntity};

/// Result of a pull merge.
#[derive(Debug)]
pub struct PullOutcome {
    /// Remote records newly materialized locally.
    pub pulled: usize,
}

/// Lists the remote record set and merges in records not yet represented
/// locally.
///
/// Pull is additive-only: an existing local record is never mutated or
/// removed, so a record edited locally but not yet pushed is never
/// overwritten by a stale remote copy. Remote records are matched against
/// the store by remote id; each unseen one is materialized as a clean
/// record with a freshly synthesized local id.
///
/// The fetch is all-or-nothing - a transport or service error aborts the
/// pull with zero local mutation - and the merged list is committed in a
/// single durable write so a crash cannot leave a half-merged store.
pub struct PullSynchronizer<E: SyncEntity, C: RemoteClient<E>> {
    store: Arc<LocalStore<E>>,
    client: Arc<C>,
    in_flight: AtomicBool,
}

impl<E: SyncEntity, C: RemoteClient<E>> PullSynchronizer<E, C> {
    /// Creates a pull synchronizer over a store and remote client.
    pub fn new(store: Arc<LocalStore<E>>, client: Arc<C>) -> Self {
        Self {
            store,
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Pulls the user's remote record set and merges new records in.
    ///
    /// The merged list is committed already sorted by the entity's display
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if another pull is already in flight, if the remote
    /// listing fails (no local mutation in that case), or if the merged
    /// list cannot be persisted.
    pub fn pull_all(&self, user_id: &str) -> SyncResult<PullOutcome> {
        let _guard = InFlightGuard::acquire(&self.in_flight, "pull")?;

        let remote = self.client.list(user_id)?;

        let mut merged = self.store.list();
        let mut known: HashSet<String> = merged
            .iter()
            .filter_map(|r| r.remote_id.clone())
            .collect();

        let mut pulled = 0;
        for remote_record in remote {
            // `insert` also dedupes within a single listing
            if known.insert(remote_record.remote_id.clone()) {
                merged.push(Record::from_remote(
                    remote_record.remote_id,
                    remote_record.payload,
                ));
                pulled += 1;
            }
        }

        if pulled > 0 {
            E::sort_for_display(&mut merged);
            self.store.replace_all(merged)?;
        }

        tracing::debug!(pulled, "pull merge complete");
        Ok(PullOutcome { pulled })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockRemoteClient;
    use crate::error::SyncError;
    use stridelog_core::{RecordPatch, Run, SyncState};
    use stridelog_storage::{InMemoryBackend, StorageBackend};

    fn run(started_at: i64) -> Run {
        Run {
            started_at,
            duration_secs: 1800,
            distance_meters: 5000.0,
            elevation_gain_meters: None,
            avg_heart_rate: None,
            path: Vec::new(),
            splits: Vec::new(),
        }
    }

    fn setup() -> (
        Arc<LocalStore<Run>>,
        Arc<MockRemoteClient<Run>>,
        PullSynchronizer<Run, MockRemoteClient<Run>>,
    ) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(
            LocalStore::open(Arc::clone(&backend) as Arc<dyn StorageBackend>).unwrap(),
        );
        let client = Arc::new(MockRemoteClient::new());
        let pull = PullSynchronizer::new(Arc::clone(&store), Arc::clone(&client));
        (store, client, pull)
    }

    #[test]
    fn pull_materializes_unseen_remote_records() {
        let (store, client, pull) = setup();
        client.seed("x", run(100));
        client.seed("y", run(200));

        let outcome = pull.pull_all("u1").unwrap();
        assert_eq!(outcome.pulled, 2);

        let records = store.list();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.sync_state, SyncState::Clean);
            assert!(record.remote_id.is_some());
        }
    }

    #[test]
    fn pull_skips_remote_ids_already_present() {
        let (store, client, pull) = setup();
        store
            .insert(stridelog_core::Record::from_remote("x", run(100)), None)
            .unwrap();
        client.seed("x", run(100));
        client.seed("z", run(300));

        let outcome = pull.pull_all("u1").unwrap();
        assert_eq!(outcome.pulled, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn overlapping_pulls_do_not_duplicate() {
        let (store, client, pull) = setup();
        client.seed("x", run(100));

        pull.pull_all("u1").unwrap();
        let outcome = pull.pull_all("u1").unwrap();

        assert_eq!(outcome.pulled, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_ids_within_one_listing_materialize_once() {
        let (store, client, pull) = setup();
        client.seed("x", run(100));
        client.seed("x", run(100));

        let outcome = pull.pull_all("u1").unwrap();
        assert_eq!(outcome.pulled, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pull_preserves_dirty_local_edits() {
        let (store, client, pull) = setup();
        let record = stridelog_core::Record::from_remote("r1", run(100));
        let id = record.local_id;
        store.insert(record, None).unwrap();
        store
            .update(id, RecordPatch::Payload(run(101)))
            .unwrap();

        // Remote still has the stale copy
        client.seed("r1", run(100));

        pull.pull_all("u1").unwrap();

        let local = store.get(id).unwrap();
        assert_eq!(local.sync_state, SyncState::Dirty);
        assert_eq!(local.payload.started_at, 101);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pull_failure_leaves_store_untouched() {
        let (store, client, pull) = setup();
        store
            .insert(stridelog_core::Record::local(run(100)), None)
            .unwrap();
        client.seed("x", run(200));
        client.fail_after_calls(0);

        let result = pull.pull_all("u1");
        assert!(matches!(result, Err(SyncError::Transport { .. })));
        assert_eq!(store.len(), 1);
        assert!(store.list()[0].remote_id.is_none());
    }

    #[test]
    fn merged_runs_are_ordered_newest_first() {
        let (store, client, pull) = setup();
        store
            .insert(stridelog_core::Record::from_remote("a", run(200)), None)
            .unwrap();
        client.seed("a", run(200));
        client.seed("b", run(300));
        client.seed("c", run(100));

        pull.pull_all("u1").unwrap();

        let times: Vec<i64> = store.list().iter().map(|r| r.payload.started_at).collect();
        assert_eq!(times, vec![300, 200, 100]);
    }

    #[test]
    fn empty_remote_is_a_no_op() {
        let (store, _, pull) = setup();
        store
            .insert(stridelog_core::Record::local(run(100)), None)
            .unwrap();

        let outcome = pull.pull_all("u1").unwrap();
        assert_eq!(outcome.pulled, 0);
        assert_eq!(store.len(), 1);
    }
}
