//! Countdown Timers - background tick engine host
//!
//! Opens the timer store, keeps the tick cadence running and shuts both down
//! cleanly on SIGINT/SIGTERM.

use tracing::info;

use countdown_timers::{config::Config, state::AppState, utils::shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timers={}", config.log_level()))
        .init();

    info!("Starting countdown-timers v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: store={}, interval={}ms",
        config.store.display(),
        config.interval_ms
    );

    let app = AppState::open(&config).await?;

    let timers = app.control().list().await?;
    let ticking = timers.iter().filter(|timer| timer.ticking).count();
    info!("Loaded {} timers, {} ticking", timers.len(), ticking);

    app.start().await;

    if let Err(e) = shutdown_signal().await {
        tracing::error!("Failed to install signal handler: {}", e);
    }
    info!("Shutdown signal received");

    app.shutdown().await?;
    info!("Shutdown complete");
    Ok(())
}
