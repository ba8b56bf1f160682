//! State management module
//!
//! This module contains the timer record and the application composition.

pub mod app_state;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use timer::{Timer, TimerId, DEFAULT_DURATION_SECS};
