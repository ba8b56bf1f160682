//! Snapshot fan-out for store subscribers

use futures::stream::{self, Stream};
use parking_lot::Mutex;
use tokio::sync::watch;

use super::StoreError;
use crate::state::Timer;

/// Publishes full-collection snapshots to subscribers.
///
/// Backed by a `watch` channel, so a slow subscriber only ever sees the most
/// recent snapshot rather than a backlog.
#[derive(Debug)]
pub(crate) struct SnapshotHub {
    tx: Mutex<Option<watch::Sender<Vec<Timer>>>>,
}

impl SnapshotHub {
    pub(crate) fn new(initial: Vec<Timer>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    pub(crate) fn publish(&self, snapshot: Vec<Timer>) {
        if let Some(tx) = self.tx.lock().as_ref() {
            // send_replace never fails, even with no receivers
            tx.send_replace(snapshot);
        }
    }

    pub(crate) fn subscribe(&self) -> Result<TimerSubscription, StoreError> {
        self.tx
            .lock()
            .as_ref()
            .map(|tx| TimerSubscription::new(tx.subscribe()))
            .ok_or(StoreError::Closed)
    }

    /// Drop the sender; every open subscription ends after its last snapshot
    pub(crate) fn close(&self) {
        self.tx.lock().take();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

/// Live sequence of full timer collections.
///
/// The first call to [`next`](Self::next) yields the snapshot current at
/// subscription time; every later call waits for the next change. Dropping
/// the subscription unsubscribes.
#[derive(Debug)]
pub struct TimerSubscription {
    rx: watch::Receiver<Vec<Timer>>,
    primed: bool,
}

impl TimerSubscription {
    fn new(rx: watch::Receiver<Vec<Timer>>) -> Self {
        Self { rx, primed: false }
    }

    /// Next snapshot, or `None` once the store has been closed
    pub async fn next(&mut self) -> Option<Vec<Timer>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }

        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Timer>> {
        stream::unfold(self, |mut sub| async move {
            let snapshot = sub.next().await?;
            Some((snapshot, sub))
        })
    }
}
