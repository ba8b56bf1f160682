//! In-process timer store

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{hub::SnapshotHub, table::TimerTable, StoreError, TimerStore, TimerSubscription};
use crate::state::{Timer, TimerId};

/// Non-durable store holding the collection in memory.
///
/// Useful for embedding the engine without a backing file and in tests.
#[derive(Debug)]
pub struct MemoryStore {
    table: Mutex<TimerTable>,
    hub: SnapshotHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_timers(Vec::new())
    }

    pub fn with_timers(timers: Vec<Timer>) -> Self {
        let table = TimerTable::from_rows(timers);
        let hub = SnapshotHub::new(table.snapshot());
        Self {
            table: Mutex::new(table),
            hub,
        }
    }

    /// Apply a mutation and publish the resulting snapshot while still
    /// holding the table lock, so subscribers see changes in write order.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TimerTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut table = self.table.lock();
        if self.hub.is_closed() {
            return Err(StoreError::Closed);
        }
        let result = f(&mut table)?;
        self.hub.publish(table.snapshot());
        Ok(result)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimerStore for MemoryStore {
    fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.hub.subscribe()
    }

    async fn read_all_once(&self) -> Result<Vec<Timer>, StoreError> {
        if self.hub.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(self.table.lock().snapshot())
    }

    async fn insert(&self, timer: Timer) -> Result<(), StoreError> {
        self.mutate(|table| {
            table.upsert(timer);
            Ok(())
        })
    }

    async fn update(&self, timer: Timer) -> Result<(), StoreError> {
        self.mutate(|table| table.replace(timer))
    }

    async fn remove_by_id(&self, id: TimerId) -> Result<bool, StoreError> {
        self.mutate(|table| Ok(table.remove(id)))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.hub.close();
        Ok(())
    }
}
