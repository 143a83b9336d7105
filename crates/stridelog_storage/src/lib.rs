//! # Stridelog Storage
//!
//! Durable blob storage backends for Stridelog.
//!
//! Stridelog persists one blob per entity type: the full ordered record list,
//! rewritten whole on every logical mutation. This crate provides the backend
//! trait for those blobs and two implementations:
//! - [`InMemoryBackend`] for tests and ephemeral stores
//! - [`FileBackend`] for persistent storage that survives process restarts

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
