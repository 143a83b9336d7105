//! Push synchronization: upload locally originated changes.

use crate::client::RemoteClient;
use crate::error::{SyncError, SyncResult};
use crate::guard::InFlightGuard;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use stridelog_core::{LocalId, LocalStore, RecordPatch, SyncEntity};

/// Result of a push walk.
#[derive(Debug)]
pub struct PushOutcome {
    /// Records successfully pushed and stamped before any failure.
    pub pushed: usize,
    /// Present if the walk halted on a remote failure; the named record and
    /// all dirty records after it remain dirty and will be retried by the
    /// next invocation.
    pub halted: Option<PushHalt>,
}

/// The record and error that halted a push walk.
#[derive(Debug)]
pub struct PushHalt {
    /// The record whose push failed.
    pub local_id: LocalId,
    /// The remote failure.
    pub error: SyncError,
}

/// Walks dirty local records in store order and uploads them.
///
/// Each record without a remote id is created remotely; each with one is
/// updated. A successful call stamps the record clean (and records the new
/// remote id for creates) before the next record is attempted, so a
/// cancelled or failed walk leaves the store at its last durable state.
///
/// The walk halts on the first remote failure rather than hammering a down
/// or rate-limiting service; unpushed records stay dirty, so a later sweep
/// resumes in the same order.
pub struct PushSynchronizer<E: SyncEntity, C: RemoteClient<E>> {
    store: Arc<LocalStore<E>>,
    client: Arc<C>,
    in_flight: AtomicBool,
}

impl<E: SyncEntity, C: RemoteClient<E>> PushSynchronizer<E, C> {
    /// Creates a push synchronizer over a store and remote client.
    pub fn new(store: Arc<LocalStore<E>>, client: Arc<C>) -> Self {
        Self {
            store,
            client,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Pushes all dirty records for the user.
    ///
    /// Remote failures halt the walk and are reported in the outcome, not
    /// as an `Err` - partial progress is the expected result of pushing
    /// over an unreliable network. Zero pushed records is valid and not
    /// itself an error.
    ///
    /// # Errors
    ///
    /// Returns an error if another push is already in flight, or if a
    /// record that succeeded remotely could not be stamped locally. The
    /// latter is a correctness hazard (the record stays dirty and may be
    /// re-created remotely on the next push) and is logged loudly.
    pub fn push_all(&self, user_id: &str) -> SyncResult<PushOutcome> {
        let _guard = InFlightGuard::acquire(&self.in_flight, "push")?;

        let dirty = self.store.dirty_records();
        tracing::debug!(count = dirty.len(), "starting push walk");

        let mut pushed = 0;
        for record in dirty {
            let result = match &record.remote_id {
                None => self
                    .client
                    .create(user_id, &record.payload)
                    .map(|remote| Some(remote.remote_id)),
                Some(remote_id) => self
                    .client
                    .update(user_id, remote_id, &record.payload)
                    .map(|_| None),
            };

            match result {
                Ok(remote_id) => {
                    if let Err(e) = self
                        .store
                        .update(record.local_id, RecordPatch::Stamp { remote_id })
                    {
                        tracing::error!(
                            local_id = %record.local_id,
                            error = %e,
                            "pushed record could not be stamped; it may be re-created remotely on the next push"
                        );
                        return Err(e.into());
                    }
                    pushed += 1;
                }
                Err(error) => {
                    tracing::warn!(
                        local_id = %record.local_id,
                        error = %error,
                        pushed,
                        "push walk halted"
                    );
                    return Ok(PushOutcome {
                        pushed,
                        halted: Some(PushHalt {
                            local_id: record.local_id,
                            error,
                        }),
                    });
                }
            }
        }

        Ok(PushOutcome {
            pushed,
            halted: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockRemoteClient, RemoteCall};
    use stridelog_core::{Record, Route, SyncState};
    use stridelog_storage::{InMemoryBackend, StorageBackend};

    fn route(name: &str) -> Route {
        Route {
            name: name.into(),
            distance_meters: 5000.0,
            waypoints: Vec::new(),
            notes: None,
        }
    }

    fn setup() -> (
        Arc<InMemoryBackend>,
        Arc<LocalStore<Route>>,
        Arc<MockRemoteClient<Route>>,
        PushSynchronizer<Route, MockRemoteClient<Route>>,
    ) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(
            LocalStore::open(Arc::clone(&backend) as Arc<dyn StorageBackend>).unwrap(),
        );
        let client = Arc::new(MockRemoteClient::new());
        let push = PushSynchronizer::new(Arc::clone(&store), Arc::clone(&client));
        (backend, store, client, push)
    }

    #[test]
    fn push_creates_new_records_and_stamps() {
        let (_, store, client, push) = setup();
        let record = Record::local(route("hill repeats"));
        let id = record.local_id;
        store.insert(record, None).unwrap();

        let outcome = push.push_all("u1").unwrap();
        assert_eq!(outcome.pushed, 1);
        assert!(outcome.halted.is_none());

        let stored = store.get(id).unwrap();
        assert_eq!(stored.sync_state, SyncState::Clean);
        assert!(stored.remote_id.is_some());
        assert_eq!(client.remote_records().len(), 1);
    }

    #[test]
    fn push_updates_records_with_remote_id() {
        let (_, store, client, push) = setup();
        client.seed("r1", route("stale name"));

        let record = Record::from_remote("r1", route("old"));
        let id = record.local_id;
        store.insert(record, None).unwrap();
        store
            .update(id, RecordPatch::Payload(route("renamed")))
            .unwrap();

        let outcome = push.push_all("u1").unwrap();
        assert_eq!(outcome.pushed, 1);

        assert_eq!(
            client.calls(),
            vec![RemoteCall::Update("r1".into())]
        );
        assert_eq!(client.remote_records()[0].payload.name, "renamed");
        assert_eq!(store.get(id).unwrap().sync_state, SyncState::Clean);
        assert_eq!(store.get(id).unwrap().remote_id.as_deref(), Some("r1"));
    }

    #[test]
    fn push_on_clean_store_makes_no_calls() {
        let (_, store, client, push) = setup();
        store
            .insert(Record::from_remote("r1", route("done")), None)
            .unwrap();

        let outcome = push.push_all("u1").unwrap();
        assert_eq!(outcome.pushed, 0);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn push_is_idempotent() {
        let (_, store, client, push) = setup();
        store.insert(Record::local(route("tempo")), None).unwrap();

        push.push_all("u1").unwrap();
        let calls_after_first = client.call_count();

        // Second push finds nothing dirty and touches the remote not at all
        let outcome = push.push_all("u1").unwrap();
        assert_eq!(outcome.pushed, 0);
        assert_eq!(client.call_count(), calls_after_first);
    }

    #[test]
    fn push_halts_on_first_failure_preserving_order() {
        let (_, store, client, push) = setup();
        let a = Record::local(route("a"));
        let b = Record::local(route("b"));
        let c = Record::local(route("c"));
        let (id_a, id_b, id_c) = (a.local_id, b.local_id, c.local_id);
        store.insert(a, None).unwrap();
        store.insert(b, None).unwrap();
        store.insert(c, None).unwrap();

        // A succeeds, B fails, C must not be attempted
        client.fail_after_calls(1);
        let outcome = push.push_all("u1").unwrap();

        assert_eq!(outcome.pushed, 1);
        let halt = outcome.halted.unwrap();
        assert_eq!(halt.local_id, id_b);

        assert_eq!(store.get(id_a).unwrap().sync_state, SyncState::Clean);
        assert_eq!(store.get(id_b).unwrap().sync_state, SyncState::Dirty);
        assert_eq!(store.get(id_c).unwrap().sync_state, SyncState::Dirty);
        assert_eq!(client.call_count(), 2);

        // Retry resumes with B, the oldest dirty record
        client.clear_failures();
        let outcome = push.push_all("u1").unwrap();
        assert_eq!(outcome.pushed, 2);
        assert_eq!(store.get(id_b).unwrap().sync_state, SyncState::Clean);
        assert_eq!(store.get(id_c).unwrap().sync_state, SyncState::Clean);
    }

    #[test]
    fn stamp_persistence_failure_is_a_hard_error() {
        let (backend, store, client, push) = setup();
        store.insert(Record::local(route("x")), None).unwrap();

        backend.set_fail_writes(true);
        let result = push.push_all("u1");
        assert!(matches!(result, Err(SyncError::Store(_))));

        // The create went through remotely, but the local record is still
        // dirty and without a remote id - the hazard the error reports.
        assert_eq!(client.remote_records().len(), 1);
        let record = &store.list()[0];
        assert_eq!(record.sync_state, SyncState::Dirty);
        assert!(record.remote_id.is_none());
    }

    #[test]
    fn guard_releases_after_walk() {
        let (_, store, _, push) = setup();
        store.insert(Record::local(route("a")), None).unwrap();

        push.push_all("u1").unwrap();
        // A failed walk must release the guard too
        assert!(push.push_all("u1").is_ok());
    }
}
