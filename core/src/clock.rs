//! Simulation clock: owns the tick counter and pause state.
//!
//! The in-game calendar (month 1..=12, year >= 1) lives in the saved
//! state; the clock only counts ticks since the run started.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub paused:       bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called while paused. Callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// English name for a calendar month. Out-of-range months wrap into 1..=12.
pub fn month_name(month: f64) -> &'static str {
    let m = month.floor() as i64;
    let idx = (m - 1).rem_euclid(12) as usize;
    MONTH_NAMES[idx]
}

/// The calendar position that follows `(month, year)`.
pub fn next_month(month: f64, year: f64) -> (f64, f64) {
    let next = month + 1.0;
    if next > 12.0 {
        (1.0, year + 1.0)
    } else {
        (next, year)
    }
}
