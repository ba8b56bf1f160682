//! Status reporting module
//!
//! The tick engine reports the number of active timers once per cycle. A
//! reporter must update a single status surface in place rather than
//! accumulate one entry per call.

mod log;
mod watch;

pub use self::log::LogStatusReporter;
pub use self::watch::{StatusSnapshot, WatchStatusReporter};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from status reporting
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("report failed: {0}")]
    ReportFailed(String),
}

/// Receiver of the aggregate engine status
#[async_trait]
pub trait StatusReporter: Send + Sync + 'static {
    /// `None` means the engine has started but not finished a cycle yet
    async fn report(&self, active_count: Option<usize>) -> Result<(), StatusError>;
}

/// Human readable status line for an active count
pub fn status_text(active_count: Option<usize>) -> String {
    match active_count {
        None => "Timer service running".to_string(),
        Some(0) => "No active timers".to_string(),
        Some(n) => format!("Active timers: {}", n),
    }
}
