//! Persistence substrate
//!
//! The leaderboard only needs an opaque, string-keyed get/put of bytes.
//! There are no transactions: callers treat each get+put pair as their own
//! critical section (the actor guarantees only one is ever in flight).
//!
//! - [`KvStore`]: the minimal backend interface
//! - [`MemoryStore`]: volatile backend for tests and ephemeral servers
//! - [`FileStore`]: one file per key with atomic replace
//! - [`TableStore`]: typed `load`/`store` of the ranking table

pub mod error;
pub mod file;
pub mod memory;
pub mod table;

use std::future::Future;

use bytes::Bytes;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use table::{TableStore, SCORES_KEY};

/// Opaque durable get/put keyed by string
pub trait KvStore: Send + Sync + 'static {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, StoreError>> + Send;

    /// Replace the value stored under `key`
    fn put(&self, key: &str, value: Bytes) -> impl Future<Output = Result<(), StoreError>> + Send;
}
