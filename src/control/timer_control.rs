//! Start, stop, reset, edit, add and remove operations on timers

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    state::{Timer, TimerId, DEFAULT_DURATION_SECS},
    store::{StoreError, TimerStore, TimerSubscription},
};

/// Fields to change on an existing timer; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerUpdate {
    pub name: Option<String>,
    /// New configured duration in seconds; sets both remaining and default
    pub duration: Option<u64>,
}

impl TimerUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn duration(duration: u64) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    fn apply(self, timer: &Timer) -> Timer {
        let mut next = match self.duration {
            Some(duration) => timer.with_duration(duration),
            None => timer.clone(),
        };
        if let Some(name) = self.name {
            next.name = name;
        }
        next
    }
}

/// Intentional timer changes issued by the interactive surface.
///
/// Each operation reads the current record and writes back a complete one.
/// Operations on an id that no longer exists return `Ok(None)` rather than
/// an error, since the timer may have been removed concurrently.
#[derive(Clone)]
pub struct TimerControl {
    store: Arc<dyn TimerStore>,
}

impl TimerControl {
    pub fn new(store: Arc<dyn TimerStore>) -> Self {
        Self { store }
    }

    /// Live view of the collection for display
    pub fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.store.subscribe()
    }

    pub async fn list(&self) -> Result<Vec<Timer>, StoreError> {
        self.store.read_all_once().await
    }

    pub async fn get(&self, id: TimerId) -> Result<Option<Timer>, StoreError> {
        self.store.read_by_id(id).await
    }

    /// Add a stopped timer with the given name and duration in seconds
    pub async fn add(&self, name: impl Into<String>, duration: u64) -> Result<Timer, StoreError> {
        let timer = Timer::new(name, duration);
        self.store.insert(timer.clone()).await?;
        info!(timer_id = %timer.id, name = %timer.name, duration, "Added timer");
        Ok(timer)
    }

    /// Add a timer named after its position, e.g. "Timer 3"
    pub async fn add_default(&self) -> Result<Timer, StoreError> {
        let count = self.store.read_all_once().await?.len();
        self.add(format!("Timer {}", count + 1), DEFAULT_DURATION_SECS)
            .await
    }

    pub async fn remove(&self, id: TimerId) -> Result<bool, StoreError> {
        let removed = self.store.remove_by_id(id).await?;
        if removed {
            info!(timer_id = %id, "Removed timer");
        } else {
            debug!(timer_id = %id, "Remove ignored, timer not found");
        }
        Ok(removed)
    }

    pub async fn toggle_ticking(&self, id: TimerId) -> Result<Option<Timer>, StoreError> {
        self.modify(id, |timer| Timer {
            ticking: !timer.ticking,
            ..timer.clone()
        })
        .await
    }

    /// Stop the timer and restore its configured duration
    pub async fn reset(&self, id: TimerId) -> Result<Option<Timer>, StoreError> {
        self.modify(id, Timer::reset_to_default).await
    }

    pub async fn update(
        &self,
        id: TimerId,
        fields: TimerUpdate,
    ) -> Result<Option<Timer>, StoreError> {
        self.modify(id, |timer| fields.apply(timer)).await
    }

    /// Set every timer ticking; returns how many were changed
    pub async fn start_all(&self) -> Result<usize, StoreError> {
        self.set_all_ticking(true).await
    }

    /// Stop every timer; returns how many were changed
    pub async fn stop_all(&self) -> Result<usize, StoreError> {
        self.set_all_ticking(false).await
    }

    async fn modify(
        &self,
        id: TimerId,
        f: impl FnOnce(&Timer) -> Timer,
    ) -> Result<Option<Timer>, StoreError> {
        let Some(current) = self.store.read_by_id(id).await? else {
            debug!(timer_id = %id, "Change ignored, timer not found");
            return Ok(None);
        };

        let next = f(&current);
        match self.store.update(next.clone()).await {
            Ok(()) => Ok(Some(next)),
            Err(StoreError::NotFound(_)) => {
                debug!(timer_id = %id, "Change ignored, timer removed concurrently");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// A failed write is logged and does not stop the remaining timers
    async fn set_all_ticking(&self, ticking: bool) -> Result<usize, StoreError> {
        let mut changed = 0;
        let mut failed = 0;
        for timer in self.store.read_all_once().await? {
            if timer.ticking == ticking {
                continue;
            }
            let id = timer.id;
            match self.store.update(Timer { ticking, ..timer }).await {
                Ok(()) => changed += 1,
                Err(StoreError::NotFound(_)) => {}
                Err(e) => {
                    warn!(timer_id = %id, error = %e, "Failed to change timer");
                    failed += 1;
                }
            }
        }

        info!(ticking, changed, failed, "Changed all timers");
        Ok(changed)
    }
}
