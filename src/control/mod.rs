//! Timer control module
//!
//! The only entry points an interactive surface uses to change timers.

pub mod timer_control;

pub use timer_control::{TimerControl, TimerUpdate};
