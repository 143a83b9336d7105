//! # Stridelog Core
//!
//! Local record store and dirty tracking for Stridelog.
//!
//! This crate provides:
//! - The record model: locally generated identifiers, optional remote
//!   identifiers, and dirty/clean sync state
//! - The `Run` and `Route` entity payloads
//! - [`LocalStore`], a durable ordered record list with indexed insertion
//!
//! ## Key Invariants
//!
//! - Exactly one record per local id within a store
//! - At most one record per remote id within a store
//! - A record without a remote id is always dirty
//! - A payload edit dirties the record; stamping a remote id never does
//! - Every mutation is durable before the call returns

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod record;
mod store;

pub use entity::{KmSplit, PathSample, Route, Run, SyncEntity, Waypoint};
pub use error::{StoreError, StoreResult};
pub use record::{LocalId, Record, RecordPatch, SyncState};
pub use store::LocalStore;
