//! Background tasks module
//!
//! This module contains the background cadence that keeps timers counting
//! down while no interactive surface is attached.

pub mod tick_engine;

// Re-export main types
pub use tick_engine::{CycleReport, TickEngine, TICK_INTERVAL};
