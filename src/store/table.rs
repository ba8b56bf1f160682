//! In-memory ordered table shared by the store implementations

use super::StoreError;
use crate::state::{Timer, TimerId};

#[derive(Debug, Clone, Default)]
pub(crate) struct TimerTable {
    rows: Vec<Timer>,
}

impl TimerTable {
    pub(crate) fn from_rows(rows: Vec<Timer>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.upsert(row);
        }
        table
    }

    pub(crate) fn rows(&self) -> &[Timer] {
        &self.rows
    }

    pub(crate) fn snapshot(&self) -> Vec<Timer> {
        self.rows.clone()
    }

    fn position(&self, id: TimerId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// Replace in place if present, otherwise append
    pub(crate) fn upsert(&mut self, timer: Timer) {
        match self.position(timer.id) {
            Some(index) => self.rows[index] = timer,
            None => self.rows.push(timer),
        }
    }

    pub(crate) fn replace(&mut self, timer: Timer) -> Result<(), StoreError> {
        let index = self
            .position(timer.id)
            .ok_or(StoreError::NotFound(timer.id))?;
        self.rows[index] = timer;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: TimerId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.rows.remove(index);
                true
            }
            None => false,
        }
    }
}
