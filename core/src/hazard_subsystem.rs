//! Hazard subsystem: seeded plague and locust strikes.
//!
//! Execution: every tick, before the economy runs, so the month's step
//! sees the losses. Draws come only from this subsystem's RNG stream.

use crate::{
    config::HazardConfig,
    error::SimResult,
    event::SimEvent,
    rng::SubsystemRng,
    state::SimState,
    subsystem::SimSubsystem,
    types::Tick,
};

const PLAGUES: [&str; 6] = [
    "the boils",
    "the red fever",
    "the river flux",
    "the wasting sickness",
    "the shaking pox",
    "the blight of Set",
];

pub struct HazardSubsystem {
    config: HazardConfig,
}

impl HazardSubsystem {
    pub fn new(config: HazardConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for HazardSubsystem {
    fn name(&self) -> &'static str { "hazard" }

    fn update(
        &mut self,
        tick: Tick,
        state: &mut SimState,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if !self.config.enabled {
            return Ok(vec![]);
        }
        let mut events = Vec::new();

        // Every roll is drawn each month, struck or not.
        let plague_roll = rng.chance(self.config.plague_chance);
        let mortality = rng.uniform(self.config.plague_mortality_min, self.config.plague_mortality_max);
        let which = rng.next_u64_below(PLAGUES.len() as u64) as usize;
        let locust_roll = rng.chance(self.config.locust_chance);
        let loss = rng.uniform(self.config.locust_loss_min, self.config.locust_loss_max);

        if plague_roll && state.slaves > 0.0 {
            let deaths = (state.slaves * mortality.clamp(0.0, 1.0)).floor();
            state.slaves -= deaths;
            log::info!("tick={tick} plague: {} kills {deaths} slaves", PLAGUES[which]);
            events.push(SimEvent::Plague { tick, plague: PLAGUES[which].to_string(), deaths });
        }

        let crop = state.fields.wt_sewn + state.fields.wt_grown;
        if locust_roll && crop > 0.0 {
            let keep = 1.0 - loss.clamp(0.0, 1.0);
            state.fields.wt_sewn *= keep;
            state.fields.wt_grown *= keep;
            let wheat_destroyed = crop - (state.fields.wt_sewn + state.fields.wt_grown);
            log::info!("tick={tick} locusts devour {wheat_destroyed:.0} bushels of growing crop");
            events.push(SimEvent::Locusts { tick, wheat_destroyed });
        }

        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any { self }
}
