//! Durable ordered record store with dirty tracking.

use crate::entity::SyncEntity;
use crate::error::{StoreError, StoreResult};
use crate::record::{LocalId, Record, RecordPatch, SyncState};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use stridelog_storage::StorageBackend;

/// A per-entity-type persistent ordered record list.
///
/// The store is the single source of truth for one entity type on this
/// device. Records keep insertion order; indexed insertion exists so a
/// delete can be undone at the record's original position.
///
/// # Durability
///
/// Every mutation serializes the full record list and writes it through the
/// backend **before** the in-memory list is updated. A failed durable write
/// surfaces as an error and leaves both the blob and the in-memory list at
/// the previous state.
///
/// # Concurrency
///
/// All mutations serialize on an internal mutex, so the store's invariants
/// cannot be violated by interleaving even if the host invokes it from more
/// than one thread.
pub struct LocalStore<E: SyncEntity> {
    backend: Arc<dyn StorageBackend>,
    records: Mutex<Vec<Record<E>>>,
}

impl<E: SyncEntity> LocalStore<E> {
    /// Opens the store, loading any previously persisted record list.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob exists but cannot be read or decoded.
    pub fn open(backend: Arc<dyn StorageBackend>) -> StoreResult<Self> {
        let records = match backend.load(E::STORE_KEY)? {
            Some(blob) => ciborium::from_reader(blob.as_slice())
                .map_err(|e| StoreError::Codec(e.to_string()))?,
            None => Vec::new(),
        };
        tracing::debug!(
            key = E::STORE_KEY,
            count = records.len(),
            "opened local store"
        );
        Ok(Self {
            backend,
            records: Mutex::new(records),
        })
    }

    /// Returns all records in store (insertion) order.
    pub fn list(&self) -> Vec<Record<E>> {
        self.records.lock().clone()
    }

    /// Returns all records in the entity's display order.
    pub fn list_for_display(&self) -> Vec<Record<E>> {
        let mut records = self.list();
        E::sort_for_display(&mut records);
        records
    }

    /// Returns the record with the given local id, if present.
    pub fn get(&self, local_id: LocalId) -> Option<Record<E>> {
        self.records
            .lock()
            .iter()
            .find(|r| r.local_id == local_id)
            .cloned()
    }

    /// Returns all dirty records in store order.
    pub fn dirty_records(&self) -> Vec<Record<E>> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.is_dirty())
            .cloned()
            .collect()
    }

    /// Returns the number of records in the store.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Inserts a record, optionally at a specific index.
    ///
    /// `at = None` appends. `at = Some(i)` inserts before the record
    /// currently at index `i`; `i` may equal the list length. Indexed
    /// insertion is what makes delete-undo restore the original position.
    ///
    /// # Errors
    ///
    /// Rejects duplicate local ids, duplicate remote ids, out-of-bounds
    /// indices, and failed durable writes.
    pub fn insert(&self, record: Record<E>, at: Option<usize>) -> StoreResult<()> {
        let mut records = self.records.lock();

        if records.iter().any(|r| r.local_id == record.local_id) {
            return Err(StoreError::DuplicateLocalId {
                local_id: record.local_id,
            });
        }
        if let Some(remote_id) = &record.remote_id {
            if records
                .iter()
                .any(|r| r.remote_id.as_deref() == Some(remote_id))
            {
                return Err(StoreError::DuplicateRemoteId {
                    remote_id: remote_id.clone(),
                });
            }
        }

        let index = at.unwrap_or(records.len());
        if index > records.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: records.len(),
            });
        }

        let mut next = records.clone();
        next.insert(index, record);
        self.persist(&next)?;
        *records = next;
        Ok(())
    }

    /// Applies a patch to the record with the given local id.
    ///
    /// A [`RecordPatch::Payload`] marks the record dirty. A
    /// [`RecordPatch::Stamp`] records the remote id (at most once) and
    /// clears dirtiness; it never dirties the record. A stamp that would
    /// leave a clean record without a remote id is rejected.
    ///
    /// Returns the record as stored after the patch.
    ///
    /// # Errors
    ///
    /// Fails if the record does not exist, the stamp would reassign,
    /// duplicate, or leave out a remote id, or the durable write fails.
    pub fn update(&self, local_id: LocalId, patch: RecordPatch<E>) -> StoreResult<Record<E>> {
        let mut records = self.records.lock();
        let index = records
            .iter()
            .position(|r| r.local_id == local_id)
            .ok_or(StoreError::RecordNotFound { local_id })?;

        let mut next = records.clone();
        match patch {
            RecordPatch::Payload(payload) => {
                next[index].payload = payload;
                next[index].sync_state = SyncState::Dirty;
            }
            RecordPatch::Stamp { remote_id } => {
                match (remote_id, next[index].remote_id.clone()) {
                    (Some(new_id), Some(existing)) => {
                        if existing != new_id {
                            return Err(StoreError::RemoteIdReassigned { local_id });
                        }
                    }
                    (Some(new_id), None) => {
                        if next
                            .iter()
                            .any(|r| r.remote_id.as_deref() == Some(new_id.as_str()))
                        {
                            return Err(StoreError::DuplicateRemoteId { remote_id: new_id });
                        }
                        next[index].remote_id = Some(new_id);
                    }
                    (None, Some(_)) => {}
                    // A clean record must have a remote id; refusing here
                    // keeps never-pushed records visible to the dirty sweep.
                    (None, None) => {
                        return Err(StoreError::StampWithoutRemoteId { local_id });
                    }
                }
                next[index].sync_state = SyncState::Clean;
            }
        }

        self.persist(&next)?;
        *records = next;
        Ok(records[index].clone())
    }

    /// Removes the record with the given local id.
    ///
    /// Returns the removed record together with the index it occupied, so a
    /// compensating undo can reinsert it at the same position.
    ///
    /// # Errors
    ///
    /// Fails if the record does not exist or the durable write fails.
    pub fn remove(&self, local_id: LocalId) -> StoreResult<(usize, Record<E>)> {
        let mut records = self.records.lock();
        let index = records
            .iter()
            .position(|r| r.local_id == local_id)
            .ok_or(StoreError::RecordNotFound { local_id })?;

        let mut next = records.clone();
        let removed = next.remove(index);
        self.persist(&next)?;
        *records = next;
        Ok((index, removed))
    }

    /// Replaces the entire record list in one durable write.
    ///
    /// This is the bulk write for pull merges: the merged list lands in a
    /// single operation so a crash never leaves a half-merged store.
    ///
    /// # Errors
    ///
    /// Fails if the new list violates the local- or remote-id uniqueness
    /// invariants, or the durable write fails.
    pub fn replace_all(&self, new_records: Vec<Record<E>>) -> StoreResult<()> {
        let mut local_ids = HashSet::new();
        let mut remote_ids = HashSet::new();
        for record in &new_records {
            if !local_ids.insert(record.local_id) {
                return Err(StoreError::DuplicateLocalId {
                    local_id: record.local_id,
                });
            }
            if let Some(remote_id) = &record.remote_id {
                if !remote_ids.insert(remote_id.as_str()) {
                    return Err(StoreError::DuplicateRemoteId {
                        remote_id: remote_id.clone(),
                    });
                }
            }
        }

        let mut records = self.records.lock();
        self.persist(&new_records)?;
        tracing::debug!(
            key = E::STORE_KEY,
            count = new_records.len(),
            "replaced record list"
        );
        *records = new_records;
        Ok(())
    }

    fn persist(&self, records: &[Record<E>]) -> StoreResult<()> {
        let mut blob = Vec::new();
        ciborium::into_writer(&records, &mut blob)
            .map_err(|e| StoreError::Codec(e.to_string()))?;
        self.backend.store(E::STORE_KEY, &blob)?;
        Ok(())
    }
}

impl<E: SyncEntity> std::fmt::Debug for LocalStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("key", &E::STORE_KEY)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
