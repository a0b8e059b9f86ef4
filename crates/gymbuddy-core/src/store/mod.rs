//! Key-value persistence primitive.
//!
//! # Overview
//!
//! The storage engine keeps each document as one JSON string under a fixed
//! key. This module defines the async [`KeyValueStore`] interface it writes
//! through, plus two backends:
//!
//! - [`MemoryStore`] - in-process map, for tests and ephemeral sessions
//! - [`FileStore`] - one file per key in a data directory
//!
//! The interface is narrow: get a string, set a string. No
//! transactions, no listing, no deletes. Serialization of concurrent writes
//! is the storage engine's job, not the backend's.

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Error type for key-value operations.
#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend cannot serve requests (closed, misconfigured, ...).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Async string store keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Replace the value stored under `key`.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), KvError>;
}
