//! Snapshot serialization: the full estate at one tick.
//!
//! A snapshot is taken every `snapshot_interval` ticks. Its body is the
//! symbol-table dump, so a snapshot restores exactly as a save file does.

use crate::{
    clock::SimClock,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id: RunId,
    pub tick:   Tick,
    pub clock:  SimClock,
    /// `NAME:VALUE` records, one per line.
    pub save:   String,
}
