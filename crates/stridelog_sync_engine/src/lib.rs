//! # Stridelog Sync Engine
//!
//! Push/pull reconciliation between a device-local record store and a
//! remote service.
//!
//! This crate provides:
//! - [`RemoteClient`], the consumed remote-service abstraction (plus a
//!   scriptable [`MockRemoteClient`] for tests)
//! - [`PushSynchronizer`]: walks dirty records in store order, creates or
//!   updates them remotely, and stamps them clean; halts on first failure
//! - [`PullSynchronizer`]: additive-only merge of remote records not yet
//!   represented locally
//! - [`OptimisticDelete`]: immediate local removal with a best-effort remote
//!   delete and a short-lived positional undo
//! - [`SyncEngine`]: a facade running push-then-pull and keeping stats
//!
//! ## Key Invariants
//!
//! - Push order is store order; a halted walk resumes from the oldest dirty
//!   record on the next invocation
//! - Pull never mutates or removes an existing local record
//! - A record's remote id is set exactly once; stamping never dirties
//! - Local deletion stands whether or not the remote delete succeeds
//! - Each synchronizer rejects a concurrent invocation of itself

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod delete;
mod engine;
mod error;
mod guard;
mod pull;
mod push;

pub use client::{MockRemoteClient, RemoteCall, RemoteClient, RemoteRecord};
pub use config::SyncConfig;
pub use delete::{DeleteOutcome, OptimisticDelete};
pub use engine::{SyncCycleResult, SyncEngine, SyncStats};
pub use error::{SyncError, SyncResult};
pub use pull::{PullOutcome, PullSynchronizer};
pub use push::{PushHalt, PushOutcome, PushSynchronizer};
