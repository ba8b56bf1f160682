//! Persisted record shape

use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::state::{Timer, TimerId};

/// On-disk form of a [`Timer`].
///
/// `ticking` defaults to `false` and `defaultValue` defaults to `remaining`
/// when absent, so older files without those fields still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub id: String,
    pub name: String,
    pub remaining: u64,
    #[serde(default)]
    pub ticking: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<u64>,
}

impl From<&Timer> for TimerRecord {
    fn from(timer: &Timer) -> Self {
        Self {
            id: timer.id.to_string(),
            name: timer.name.clone(),
            remaining: timer.remaining,
            ticking: timer.ticking,
            default_value: Some(timer.default_value),
        }
    }
}

impl TryFrom<TimerRecord> for Timer {
    type Error = StoreError;

    fn try_from(record: TimerRecord) -> Result<Self, Self::Error> {
        let id: TimerId = record
            .id
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("bad id {:?}: {}", record.id, e)))?;

        Ok(Timer {
            id,
            name: record.name,
            remaining: record.remaining,
            ticking: record.ticking,
            default_value: record.default_value.unwrap_or(record.remaining),
        })
    }
}
