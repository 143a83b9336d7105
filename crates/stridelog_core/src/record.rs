//! Record model: local identity, remote identity, and sync state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Locally generated identifier for a record.
///
/// Local ids are:
/// - Generated at local creation time (or synthesized during a pull)
/// - Stable for the record's local lifetime
/// - Unique within an entity type's store
/// - Never reused
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalId(Uuid);

impl LocalId {
    /// Creates a new random local id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a local id from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Converts to a UUID.
    #[must_use]
    pub const fn to_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalId({})", self.0)
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LocalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<LocalId> for Uuid {
    fn from(id: LocalId) -> Self {
        id.0
    }
}

/// Whether a record's payload is known to match the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// The local payload may differ from the remote service, or the record
    /// was never pushed.
    Dirty,
    /// The record matches what was last pushed to or pulled from the remote
    /// service.
    Clean,
}

/// A synchronized record: immutable identity, mutable payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record<E> {
    /// Locally generated id, stable for the record's local lifetime.
    pub local_id: LocalId,
    /// Remote service id; present once the remote service has accepted the
    /// record. Set exactly once, never changed thereafter.
    pub remote_id: Option<String>,
    /// Dirty/clean tracking.
    pub sync_state: SyncState,
    /// Entity payload. Opaque to the sync engine, which copies it verbatim.
    pub payload: E,
}

impl<E> Record<E> {
    /// Creates a locally originated record: dirty, with no remote id.
    pub fn local(payload: E) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            sync_state: SyncState::Dirty,
            payload,
        }
    }

    /// Creates a record materialized from a remote listing: clean, with the
    /// remote id set and a freshly synthesized local id.
    pub fn from_remote(remote_id: impl Into<String>, payload: E) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: Some(remote_id.into()),
            sync_state: SyncState::Clean,
            payload,
        }
    }

    /// Returns true if the record needs to be pushed.
    pub fn is_dirty(&self) -> bool {
        self.sync_state == SyncState::Dirty
    }
}

/// A mutation to apply to a stored record.
///
/// The two variants encode the dirty-tracking rule directly: a payload edit
/// always dirties the record, while stamping a remote identifier after a
/// successful push never does.
#[derive(Debug, Clone)]
pub enum RecordPatch<E> {
    /// Replaces the payload and marks the record dirty.
    Payload(E),
    /// Records the outcome of a successful push: sets the remote id (if the
    /// record was newly created remotely) and clears dirtiness.
    ///
    /// `remote_id: None` stamps an update-push, where the record already
    /// carries its remote id.
    Stamp {
        /// Remote id assigned by the service, if this was a create.
        remote_id: Option<String>,
    },
}
