//! Economy subsystem: runs the monthly step over the estate.
//!
//! Execution: every tick, after hazards.
//! Emits one `MonthClosed` per tick plus one `Signal` per step signal.

use crate::{
    config::SimConfig,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimState,
    step::{self, MonthReport},
    subsystem::SimSubsystem,
    table::TableSet,
    types::Tick,
};

pub struct EconomySubsystem {
    tables: TableSet,
    config: SimConfig,
    /// Figures from the most recent month, for advice and display.
    pub last_report: Option<MonthReport>,
}

impl EconomySubsystem {
    pub fn new(tables: TableSet, config: SimConfig) -> Self {
        Self { tables, config, last_report: None }
    }

    pub fn tables(&self) -> &TableSet { &self.tables }
}

impl SimSubsystem for EconomySubsystem {
    fn name(&self) -> &'static str { "economy" }

    fn update(
        &mut self,
        tick: Tick,
        state: &mut SimState,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let outcome = step::advance(state, &self.tables, &self.config);

        let mut events = Vec::with_capacity(1 + outcome.signals.len());
        for signal in outcome.signals {
            events.push(SimEvent::Signal { tick, signal });
        }

        let s = &outcome.state;
        events.push(SimEvent::MonthClosed {
            tick,
            month: s.month,
            year: s.year,
            gold: s.gold,
            loan: s.loan,
            wheat: s.wheat,
            slaves: s.slaves,
            oxen: s.oxen,
            horses: s.horses,
            wk_eff: outcome.report.wk_eff,
        });

        *state = outcome.state;
        self.last_report = Some(outcome.report);
        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
