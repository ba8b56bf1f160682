//! Status published on a watch channel

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{status_text, StatusError, StatusReporter};

/// Last status reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub active_count: Option<usize>,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn new(active_count: Option<usize>) -> Self {
        Self {
            active_count,
            text: status_text(active_count),
            updated_at: Utc::now(),
        }
    }
}

/// Reporter that keeps one in-place status value for any number of viewers
#[derive(Debug)]
pub struct WatchStatusReporter {
    tx: watch::Sender<StatusSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _rx: watch::Receiver<StatusSnapshot>,
}

impl WatchStatusReporter {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(StatusSnapshot::new(None));
        Self { tx, _rx: rx }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }
}

impl Default for WatchStatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusReporter for WatchStatusReporter {
    async fn report(&self, active_count: Option<usize>) -> Result<(), StatusError> {
        self.tx
            .send(StatusSnapshot::new(active_count))
            .map_err(|e| StatusError::ReportFailed(e.to_string()))
    }
}
