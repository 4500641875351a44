//! Subsystem trait.
//!
//! The engine calls update() on each registered subsystem in
//! registration order, once per month. Execution order is fixed and
//! documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimState,
    types::Tick,
};
use std::any::Any;

pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:      the current tick number
    /// - `state`:     the estate, as left by earlier subsystems this tick
    /// - `events_in`: events emitted by earlier subsystems this tick
    /// - `rng`:       this subsystem's deterministic RNG for this tick
    ///
    /// Returns the new events to add to the tick's event log.
    fn update(
        &mut self,
        tick: Tick,
        state: &mut SimState,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}
