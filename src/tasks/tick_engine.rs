//! Background tick engine
//!
//! Owns the one-second cadence that counts every ticking timer down. Each
//! cycle reads the whole collection, writes back only the timers whose state
//! changed, then reports how many timers are still ticking.
//!
//! The engine and the control API write through the same store without a
//! shared lock. Every write is a complete record, so a race between a
//! decrement and a user toggle resolves to whichever write lands last and
//! never leaves a record with mixed fields.

use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    state::Timer,
    status::StatusReporter,
    store::{StoreError, TimerStore},
};

/// Cadence period used unless overridden
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of a single cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Timers written back with their next state
    pub updated: usize,
    /// Timers removed between this cycle's read and its write
    pub skipped: usize,
    /// Timers whose write failed; they are retried next cycle
    pub failed: usize,
    /// Timers ticking after this cycle's writes
    pub active_count: usize,
}

fn count_active(timers: &[Timer]) -> usize {
    timers.iter().filter(|timer| timer.ticking).count()
}

/// The per-cycle read-modify-write, shared between the engine handle and the
/// spawned cadence task
#[derive(Clone)]
struct CycleRunner {
    store: Arc<dyn TimerStore>,
    reporter: Arc<dyn StatusReporter>,
}

impl CycleRunner {
    async fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        let timers = self.store.read_all_once().await?;
        let changed: Vec<Timer> = timers.iter().filter_map(Timer::ticked).collect();

        let mut report = CycleReport::default();
        let mut view = timers;

        for next in changed {
            let id = next.id;
            match self.store.update(next.clone()).await {
                Ok(()) => {
                    report.updated += 1;
                    if let Some(slot) = view.iter_mut().find(|timer| timer.id == id) {
                        *slot = next;
                    }
                }
                Err(StoreError::NotFound(_)) => {
                    debug!(timer_id = %id, "Timer removed during cycle, skipping");
                    report.skipped += 1;
                    view.retain(|timer| timer.id != id);
                }
                Err(e) => {
                    warn!(timer_id = %id, error = %e, "Failed to write timer tick");
                    report.failed += 1;
                }
            }
        }

        // Re-read so the count includes control writes that landed mid-cycle
        report.active_count = match self.store.read_all_once().await {
            Ok(current) => count_active(&current),
            Err(e) => {
                warn!(error = %e, "Failed to re-read timers, counting from cycle view");
                count_active(&view)
            }
        };

        if let Err(e) = self.reporter.report(Some(report.active_count)).await {
            warn!(error = %e, "Failed to report status");
        }

        debug!(
            updated = report.updated,
            skipped = report.skipped,
            failed = report.failed,
            active = report.active_count,
            "Tick cycle complete"
        );
        Ok(report)
    }
}

/// A running cadence and the means to stop it
struct Cadence {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Supervisor for the tick cadence.
///
/// At most one cadence runs per engine. `stop` waits for the cadence task to
/// exit, so once it returns the engine makes no further writes or reports.
pub struct TickEngine {
    runner: CycleRunner,
    period: Duration,
    cadence: Mutex<Option<Cadence>>,
}

impl TickEngine {
    pub fn new(store: Arc<dyn TimerStore>, reporter: Arc<dyn StatusReporter>) -> Self {
        Self {
            runner: CycleRunner { store, reporter },
            period: TICK_INTERVAL,
            cadence: Mutex::new(None),
        }
    }

    /// Override the cadence period
    pub fn with_interval(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Start the cadence. Returns `false` if one is already running.
    ///
    /// The reporter receives `None` once, before the first cycle runs.
    pub async fn start(&self) -> bool {
        let mut cadence = self.cadence.lock().await;
        if cadence
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
        {
            debug!("Tick engine already running");
            return false;
        }

        if let Err(e) = self.runner.reporter.report(None).await {
            warn!(error = %e, "Failed to report initial status");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_cadence(self.runner.clone(), self.period, shutdown_rx));
        *cadence = Some(Cadence {
            shutdown_tx,
            handle,
        });

        info!(interval_ms = self.period.as_millis() as u64, "Tick engine started");
        true
    }

    /// Stop the cadence and wait for it to exit. Returns `false` if it was
    /// not running.
    ///
    /// A cycle already in progress is allowed to finish.
    pub async fn stop(&self) -> bool {
        let mut cadence = self.cadence.lock().await;
        let Some(running) = cadence.take() else {
            return false;
        };

        // The task may already be gone, in which case nobody is listening
        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.handle.await {
            error!("Tick cadence task ended abnormally: {}", e);
        }

        info!("Tick engine stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        self.cadence
            .lock()
            .await
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Run one cycle immediately, outside the cadence
    pub async fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        self.runner.run_cycle().await
    }
}

impl Drop for TickEngine {
    fn drop(&mut self) {
        if let Some(running) = self.cadence.get_mut().take() {
            let _ = running.shutdown_tx.send(true);
            running.handle.abort();
        }
    }
}

/// Cadence loop: one cycle per period until shutdown is signalled.
///
/// Shutdown is only observed between cycles. Errors and panics inside a
/// cycle are logged and the loop carries on with the next period.
async fn run_cadence(
    runner: CycleRunner,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            // Signalled, or the engine was dropped
            _ = shutdown_rx.changed() => break,

            _ = ticker.tick() => {}
        }

        match AssertUnwindSafe(runner.run_cycle()).catch_unwind().await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Tick cycle failed: {}", e),
            Err(_) => error!("Tick cycle panicked, continuing with next cycle"),
        }
    }

    debug!("Tick cadence exited");
}
