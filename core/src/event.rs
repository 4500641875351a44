//! The event bus: what happened each month, in the order it happened.
//!
//! Subsystems report through events; the engine persists every event to
//! the event log. Variants are only ever appended.

use crate::{
    step::StepSignal,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    GameLoaded {
        tick: Tick,
        records: usize,
    },

    // ── Economy events ─────────────────────────────
    MonthClosed {
        tick: Tick,
        month: f64,
        year: f64,
        gold: f64,
        loan: f64,
        wheat: f64,
        slaves: f64,
        oxen: f64,
        horses: f64,
        wk_eff: f64,
    },
    Signal {
        tick: Tick,
        signal: StepSignal,
    },

    // ── Hazard events ──────────────────────────────
    Plague {
        tick: Tick,
        plague: String,
        deaths: f64,
    },
    Locusts {
        tick: Tick,
        wheat_destroyed: f64,
    },

    // ── Player command events ──────────────────────
    PlayerCommandReceived {
        tick: Tick,
        command_type: String,
    },
}

impl SimEvent {
    /// Stable name for the `event_type` column of the event log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }           => "tick_started",
            Self::TickCompleted { .. }         => "tick_completed",
            Self::RunInitialized { .. }        => "run_initialized",
            Self::GameLoaded { .. }            => "game_loaded",
            Self::MonthClosed { .. }           => "month_closed",
            Self::Signal { .. }                => "signal",
            Self::Plague { .. }                => "plague",
            Self::Locusts { .. }               => "locusts",
            Self::PlayerCommandReceived { .. } => "player_command_received",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}
