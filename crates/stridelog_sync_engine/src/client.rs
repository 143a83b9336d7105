//! Remote client abstraction.

use crate::error::{SyncError, SyncResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A record as the remote service represents it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRecord<E> {
    /// Identifier assigned by the remote service.
    pub remote_id: String,
    /// Entity payload, passed through unchanged.
    pub payload: E,
}

/// The remote service's per-entity-type interface.
///
/// This trait is consumed, not implemented, by the sync core: the host
/// application supplies an HTTP-backed implementation, and tests use
/// [`MockRemoteClient`]. Payload validation belongs behind this boundary;
/// the synchronizers treat payloads as opaque.
///
/// Implementations own their timeout and cancellation policy; the
/// synchronizers propagate whatever errors they surface.
pub trait RemoteClient<E>: Send + Sync {
    /// Creates a record remotely, returning the service's representation
    /// with its newly assigned remote id.
    fn create(&self, user_id: &str, payload: &E) -> SyncResult<RemoteRecord<E>>;

    /// Updates an existing remote record's payload.
    fn update(&self, user_id: &str, remote_id: &str, payload: &E) -> SyncResult<RemoteRecord<E>>;

    /// Deletes a remote record.
    fn delete(&self, user_id: &str, remote_id: &str) -> SyncResult<()>;

    /// Lists all remote records for the user.
    fn list(&self, user_id: &str) -> SyncResult<Vec<RemoteRecord<E>>>;
}

/// One recorded call against a [`MockRemoteClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// `create` was invoked.
    Create,
    /// `update` was invoked for this remote id.
    Update(String),
    /// `delete` was invoked for this remote id.
    Delete(String),
    /// `list` was invoked.
    List,
}

/// A scriptable in-memory remote service for testing.
///
/// Holds a single user's record set, assigns sequential remote ids on
/// create, records every call, and can be scripted to start failing after a
/// set number of calls.
#[derive(Debug, Default)]
pub struct MockRemoteClient<E> {
    records: Mutex<Vec<RemoteRecord<E>>>,
    calls: Mutex<Vec<RemoteCall>>,
    next_id: AtomicU64,
    fail_after: Mutex<Option<usize>>,
}

impl<E: Clone + Send + Sync> MockRemoteClient<E> {
    /// Creates a new mock client with an empty remote record set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            fail_after: Mutex::new(None),
        }
    }

    /// Seeds a record into the remote set, as if another device created it.
    pub fn seed(&self, remote_id: impl Into<String>, payload: E) {
        self.records.lock().push(RemoteRecord {
            remote_id: remote_id.into(),
            payload,
        });
    }

    /// Returns a copy of the remote record set.
    pub fn remote_records(&self) -> Vec<RemoteRecord<E>> {
        self.records.lock().clone()
    }

    /// Returns all recorded calls, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Makes every call after the first `n` fail with a retryable transport
    /// error. `n = 0` fails everything.
    pub fn fail_after_calls(&self, n: usize) {
        *self.fail_after.lock() = Some(n);
    }

    /// Clears any scripted failure.
    pub fn clear_failures(&self) {
        *self.fail_after.lock() = None;
    }

    /// Records a call and applies the scripted failure, if due.
    fn record_call(&self, call: RemoteCall) -> SyncResult<()> {
        let mut calls = self.calls.lock();
        calls.push(call);
        if let Some(limit) = *self.fail_after.lock() {
            if calls.len() > limit {
                return Err(SyncError::transport_retryable("scripted failure"));
            }
        }
        Ok(())
    }
}

impl<E: Clone + Send + Sync> RemoteClient<E> for MockRemoteClient<E> {
    fn create(&self, _user_id: &str, payload: &E) -> SyncResult<RemoteRecord<E>> {
        self.record_call(RemoteCall::Create)?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = RemoteRecord {
            remote_id: format!("srv-{n}"),
            payload: payload.clone(),
        };
        self.records.lock().push(record.clone());
        Ok(record)
    }

    fn update(&self, _user_id: &str, remote_id: &str, payload: &E) -> SyncResult<RemoteRecord<E>> {
        self.record_call(RemoteCall::Update(remote_id.to_string()))?;
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.remote_id == remote_id)
            .ok_or_else(|| SyncError::Remote(format!("unknown remote id {remote_id:?}")))?;
        record.payload = payload.clone();
        Ok(record.clone())
    }

    fn delete(&self, _user_id: &str, remote_id: &str) -> SyncResult<()> {
        self.record_call(RemoteCall::Delete(remote_id.to_string()))?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.remote_id != remote_id);
        if records.len() == before {
            return Err(SyncError::Remote(format!("unknown remote id {remote_id:?}")));
        }
        Ok(())
    }

    fn list(&self, _user_id: &str) -> SyncResult<Vec<RemoteRecord<E>>> {
        self.record_call(RemoteCall::List)?;
        Ok(self.records.lock().clone())
    }
}
