//! Shared fakes for the integration tests
#![allow(dead_code)]

use std::{
    collections::HashSet,
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use countdown_timers::{
    status::{StatusError, StatusReporter},
    MemoryStore, StoreError, TickEngine, Timer, TimerId, TimerStore, TimerSubscription,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub fn timer(name: &str, remaining: u64, default_value: u64, ticking: bool) -> Timer {
    Timer {
        remaining,
        default_value,
        ticking,
        ..Timer::new(name, default_value)
    }
}

/// Records every status report in order
#[derive(Debug, Default)]
pub struct RecordingReporter {
    calls: Mutex<Vec<Option<usize>>>,
}

impl RecordingReporter {
    pub fn calls(&self) -> Vec<Option<usize>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl StatusReporter for RecordingReporter {
    async fn report(&self, active_count: Option<usize>) -> Result<(), StatusError> {
        self.calls.lock().push(active_count);
        Ok(())
    }
}

/// Memory store with switchable failures
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    failing_updates: Mutex<HashSet<TimerId>>,
    fail_reads: AtomicBool,
    panic_next_read: AtomicBool,
}

impl FailingStore {
    pub fn with_timers(timers: Vec<Timer>) -> Self {
        Self {
            inner: MemoryStore::with_timers(timers),
            ..Self::default()
        }
    }

    pub fn fail_updates_for(&self, id: TimerId) {
        self.failing_updates.lock().insert(id);
    }

    pub fn clear_failures(&self) {
        self.failing_updates.lock().clear();
        self.fail_reads.store(false, Ordering::SeqCst);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn panic_next_read(&self) {
        self.panic_next_read.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimerStore for FailingStore {
    fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.inner.subscribe()
    }

    async fn read_all_once(&self) -> Result<Vec<Timer>, StoreError> {
        if self.panic_next_read.swap(false, Ordering::SeqCst) {
            panic!("injected read panic");
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected read failure").into());
        }
        self.inner.read_all_once().await
    }

    async fn insert(&self, timer: Timer) -> Result<(), StoreError> {
        self.inner.insert(timer).await
    }

    async fn update(&self, timer: Timer) -> Result<(), StoreError> {
        if self.failing_updates.lock().contains(&timer.id) {
            return Err(io::Error::other("injected write failure").into());
        }
        self.inner.update(timer).await
    }

    async fn remove_by_id(&self, id: TimerId) -> Result<bool, StoreError> {
        self.inner.remove_by_id(id).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }
}

/// Memory store that can hold a chosen `read_all_once` call open until the
/// test releases it, to interleave control operations with a cycle.
///
/// The paused read returns the snapshot taken before pausing.
#[derive(Debug, Default)]
pub struct PausingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    pause_at: Mutex<Option<usize>>,
    reached: Notify,
    resume: Notify,
}

impl PausingStore {
    pub fn with_timers(timers: Vec<Timer>) -> Self {
        Self {
            inner: MemoryStore::with_timers(timers),
            ..Self::default()
        }
    }

    /// Pause the `n`th read from now (1-based)
    pub fn pause_on_read(&self, n: usize) {
        let done = self.reads.load(Ordering::SeqCst);
        *self.pause_at.lock() = Some(done + n);
    }

    pub async fn wait_paused(&self) {
        self.reached.notified().await;
    }

    pub fn resume(&self) {
        self.resume.notify_one();
    }
}

#[async_trait]
impl TimerStore for PausingStore {
    fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.inner.subscribe()
    }

    async fn read_all_once(&self) -> Result<Vec<Timer>, StoreError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        let pause = {
            let mut pause_at = self.pause_at.lock();
            if *pause_at == Some(n) {
                *pause_at = None;
                true
            } else {
                false
            }
        };
        let snapshot = self.inner.read_all_once().await?;
        if pause {
            self.reached.notify_one();
            self.resume.notified().await;
        }
        Ok(snapshot)
    }

    async fn insert(&self, timer: Timer) -> Result<(), StoreError> {
        self.inner.insert(timer).await
    }

    async fn update(&self, timer: Timer) -> Result<(), StoreError> {
        self.inner.update(timer).await
    }

    async fn remove_by_id(&self, id: TimerId) -> Result<bool, StoreError> {
        self.inner.remove_by_id(id).await
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.inner.close().await
    }
}

pub fn engine_over<S: TimerStore>(store: Arc<S>) -> (TickEngine, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let engine = TickEngine::new(store, reporter.clone());
    (engine, reporter)
}
