//! Status written to the log

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::{status_text, StatusError, StatusReporter};

/// Logs the status line, but only when it differs from the previous one
#[derive(Debug, Default)]
pub struct LogStatusReporter {
    last: Mutex<Option<String>>,
}

impl LogStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent status line, if any was reported
    pub fn last_text(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

#[async_trait]
impl StatusReporter for LogStatusReporter {
    async fn report(&self, active_count: Option<usize>) -> Result<(), StatusError> {
        let text = status_text(active_count);
        let mut last = self.last.lock();
        if last.as_deref() != Some(text.as_str()) {
            info!("{}", text);
            *last = Some(text);
        }
        Ok(())
    }
}
