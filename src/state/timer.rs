//! Timer record and its countdown transitions

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Duration given to timers created without an explicit one
pub const DEFAULT_DURATION_SECS: u64 = 60;

/// Stable identifier of a timer, generated once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TimerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single named countdown.
///
/// `remaining` and `default_value` are whole seconds. Every writer stores a
/// complete `Timer`, never a subset of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub remaining: u64,
    pub ticking: bool,
    pub default_value: u64,
}

impl Timer {
    /// Create a stopped timer whose remaining and default values are both `duration`
    pub fn new(name: impl Into<String>, duration: u64) -> Self {
        Self {
            id: TimerId::new(),
            name: name.into(),
            remaining: duration,
            ticking: false,
            default_value: duration,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining_duration(&self) -> Duration {
        Duration::from_secs(self.remaining)
    }

    /// Take one second off, never going below zero
    pub fn decrement_second(&self) -> Self {
        Self {
            remaining: self.remaining.saturating_sub(1),
            ..self.clone()
        }
    }

    /// Park the timer at its configured duration and stop it
    pub fn reset_to_default(&self) -> Self {
        Self {
            remaining: self.default_value,
            ticking: false,
            ..self.clone()
        }
    }

    /// Set a new configured duration; remaining and default move together
    pub fn with_duration(&self, duration: u64) -> Self {
        Self {
            remaining: duration,
            default_value: duration,
            ..self.clone()
        }
    }

    /// State after one cadence cycle, or `None` if this timer is not ticking.
    ///
    /// A timer that is already at zero, or that reaches zero by this
    /// decrement, completes in the same step: it goes back to its default
    /// value with ticking switched off.
    pub fn ticked(&self) -> Option<Self> {
        if !self.ticking {
            return None;
        }

        let decremented = self.decrement_second();
        if decremented.is_finished() {
            Some(decremented.reset_to_default())
        } else {
            Some(decremented)
        }
    }
}
