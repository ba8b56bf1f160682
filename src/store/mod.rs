//! Timer store module
//!
//! The store is the only shared mutable resource: the tick engine and the
//! control API both read and write complete records through it, and the
//! store resolves concurrent writes to the same record as last-write-wins.

mod hub;
mod json_file;
mod memory;
mod record;
mod table;

pub use hub::TimerSubscription;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::TimerRecord;

use async_trait::async_trait;
use thiserror::Error;

use crate::state::{Timer, TimerId};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("timer {0} not found")]
    NotFound(TimerId),
    #[error("store is closed")]
    Closed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Corrupt(String),
}

/// Durable keyed collection of timers.
///
/// Each operation is individually atomic. There are no cross-record
/// transactions.
#[async_trait]
pub trait TimerStore: Send + Sync + 'static {
    /// Live view of the full collection; the current snapshot comes first
    fn subscribe(&self) -> Result<TimerSubscription, StoreError>;

    /// Point-in-time copy of the full collection, in insertion order
    async fn read_all_once(&self) -> Result<Vec<Timer>, StoreError>;

    /// Insert a timer, replacing any existing record with the same id
    async fn insert(&self, timer: Timer) -> Result<(), StoreError>;

    /// Replace the record with the same id. Fails with `NotFound` when the
    /// id is absent, so a removed timer is never brought back by a stale write.
    async fn update(&self, timer: Timer) -> Result<(), StoreError>;

    /// Remove a timer, returning whether a record was removed
    async fn remove_by_id(&self, id: TimerId) -> Result<bool, StoreError>;

    /// Flush pending state and end all subscriptions
    async fn close(&self) -> Result<(), StoreError>;

    async fn read_by_id(&self, id: TimerId) -> Result<Option<Timer>, StoreError> {
        Ok(self
            .read_all_once()
            .await?
            .into_iter()
            .find(|timer| timer.id == id))
    }
}
