//! Application composition: store, control API and tick engine

use std::{sync::Arc, time::Duration};

use tokio::time::Instant;
use tracing::info;

use crate::{
    config::Config,
    control::TimerControl,
    status::{LogStatusReporter, StatusReporter},
    store::{JsonFileStore, StoreError, TimerStore},
    tasks::TickEngine,
};

/// Owns everything the process needs and tears it down in order.
///
/// Built explicitly at startup and handed to whoever needs it; there is no
/// global instance.
pub struct AppState {
    store: Arc<dyn TimerStore>,
    control: TimerControl,
    engine: TickEngine,
    start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TimerStore>,
        reporter: Arc<dyn StatusReporter>,
        interval: Duration,
    ) -> Self {
        Self {
            control: TimerControl::new(Arc::clone(&store)),
            engine: TickEngine::new(Arc::clone(&store), reporter).with_interval(interval),
            store,
            start_time: Instant::now(),
        }
    }

    /// Open the JSON store named in the config and log status changes
    pub async fn open(config: &Config) -> Result<Self, StoreError> {
        let store = JsonFileStore::open(&config.store).await?;
        Ok(Self::new(
            Arc::new(store),
            Arc::new(LogStatusReporter::new()),
            config.interval(),
        ))
    }

    pub fn control(&self) -> &TimerControl {
        &self.control
    }

    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn TimerStore> {
        &self.store
    }

    pub async fn start(&self) -> bool {
        self.engine.start().await
    }

    /// Stop the cadence, then flush and close the store
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.engine.stop().await;
        self.store.close().await?;
        info!("Shut down after {}", self.get_uptime());
        Ok(())
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
