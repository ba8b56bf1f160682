//! Countdown Timers - background tick engine for persisted countdown timers
//!
//! This library keeps a collection of independent named countdowns ticking
//! once per second, persists every change through a store, and reports how
//! many timers are active to a status surface.

pub mod config;
pub mod control;
pub mod state;
pub mod status;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use control::{TimerControl, TimerUpdate};
pub use state::{AppState, Timer, TimerId};
pub use status::{StatusReporter, WatchStatusReporter};
pub use store::{JsonFileStore, MemoryStore, StoreError, TimerStore, TimerSubscription};
pub use tasks::{CycleReport, TickEngine};
pub use utils::signals::shutdown_signal;
