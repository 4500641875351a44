//! The simulation engine. One tick is one month of the estate.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Hazard subsystem   (plague, locusts)
//!   2. Economy subsystem  (the monthly step)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - Each subsystem sees the estate as left by the ones before it.
//!   - All randomness flows through the RngBank.
//!   - Every subsystem event is recorded in the event log.
//!   - The estate reaches save files only through the symbol table.

use crate::{
    advice::{self, Advice},
    clock::SimClock,
    command::PlayerCommand,
    config::SimConfig,
    economy_subsystem::EconomySubsystem,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    hazard_subsystem::HazardSubsystem,
    narration::{describe_event, Announcer, LogAnnouncer},
    rng::{RngBank, SubsystemSlot},
    snapshot::SimSnapshot,
    state::SimState,
    step::MonthReport,
    store::SimStore,
    subsystem::SimSubsystem,
    symbols::SymbolTable,
    table::TableSet,
    types::{RunId, Tick},
};

pub struct SimEngine {
    pub run_id:   RunId,
    pub clock:    SimClock,
    pub rng_bank: RngBank,
    seed:         u64,
    config:       SimConfig,
    state:        SimState,
    symbols:      SymbolTable,
    subsystems:   Vec<(SubsystemSlot, Box<dyn SimSubsystem>)>,
    store:        SimStore,
    announcer:    Box<dyn Announcer>,
    initialized:  bool,
}

impl SimEngine {
    /// A bare engine with a new game seated from `seed` and no subsystems.
    pub fn new(run_id: RunId, seed: u64, store: SimStore, config: SimConfig) -> Self {
        let rng_bank = RngBank::new(seed);
        let state = SimState::new_game(&mut rng_bank.for_subsystem(SubsystemSlot::Players));
        Self {
            clock:       SimClock::new(run_id.clone()),
            rng_bank,
            seed,
            config,
            state,
            symbols:     SymbolTable::standard(),
            subsystems:  Vec::new(),
            store,
            announcer:   Box::new(LogAnnouncer),
            initialized: false,
            run_id,
        }
    }

    /// Build a fully wired engine, with coefficients from `data_dir`.
    pub fn build(run_id: RunId, seed: u64, store: SimStore, data_dir: &str) -> SimResult<Self> {
        let config = SimConfig::load(data_dir)?;
        Ok(Self::build_with_config(run_id, seed, store, config))
    }

    pub fn build_with_config(run_id: RunId, seed: u64, store: SimStore, config: SimConfig) -> Self {
        let hazards = HazardSubsystem::new(config.hazards.clone());
        let economy = EconomySubsystem::new(TableSet::standard(), config.clone());
        let mut engine = SimEngine::new(run_id, seed, store, config);

        // EXECUTION ORDER: fixed, documented, never reordered.
        engine.register(SubsystemSlot::Hazard, Box::new(hazards));
        engine.register(SubsystemSlot::Economy, Box::new(economy));
        engine
    }

    /// In-memory engine on the deterministic test configuration.
    pub fn build_test(run_id: &str, seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        store.insert_run(run_id, seed, "test")?;
        Ok(Self::build_with_config(run_id.to_string(), seed, store, SimConfig::default_test()))
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, subsystem));
    }

    pub fn set_announcer(&mut self, announcer: Box<dyn Announcer>) {
        self.announcer = announcer;
    }

    pub fn state(&self) -> &SimState { &self.state }

    /// Direct access for scenario setup. Play goes through commands.
    pub fn state_mut(&mut self) -> &mut SimState { &mut self.state }

    pub fn symbols(&self) -> &SymbolTable { &self.symbols }

    pub fn config(&self) -> &SimConfig { &self.config }

    /// Advance one month.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let mut tick_events: Vec<SimEvent> = vec![
            SimEvent::TickStarted { tick: current_tick }
        ];

        for (slot, subsystem) in &mut self.subsystems {
            let mut rng = self.rng_bank.for_subsystem_at_tick(*slot, current_tick);
            let new_events =
                subsystem.update(current_tick, &mut self.state, &tick_events, &mut rng)?;

            for event in &new_events {
                let entry = log_entry(&self.run_id, current_tick, subsystem.name(), event)?;
                self.store.append_event(&entry)?;
            }
            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });

        for event in &tick_events {
            if let Some(text) = describe_event(event) {
                self.announcer.announce(&text);
            }
        }

        let interval = self.config.snapshot_interval;
        if interval > 0 && current_tick.is_multiple_of(interval) {
            self.take_snapshot(current_tick)?;
        }

        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        // RunInitialized at tick 0 so seed differences are observable.
        if !self.initialized {
            let init_event = SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed:   self.seed,
            };
            let entry = log_entry(&self.run_id, self.clock.current_tick, "engine", &init_event)?;
            self.store.append_event(&entry)?;
            self.initialized = true;
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick()?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Apply a player command between months.
    pub fn apply_command(&mut self, command: PlayerCommand) -> SimResult<()> {
        match &command {
            PlayerCommand::Pause => self.clock.pause(),
            PlayerCommand::Resume => self.clock.resume(),
            PlayerCommand::SetControl { symbol, value } => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(SimError::InvalidControl { name: symbol.clone(), value: *value });
                }
                self.symbols.set_number(&mut self.state, symbol, *value)?;
            }
        }

        let event = SimEvent::PlayerCommandReceived {
            tick:         self.clock.current_tick,
            command_type: command.type_name().to_string(),
        };
        let entry = log_entry(&self.run_id, self.clock.current_tick, "player", &event)?;
        self.store.append_event(&entry)?;
        Ok(())
    }

    /// The estate as save-file text.
    pub fn save_game(&self) -> String {
        self.symbols.dump(&self.state)
    }

    /// Apply save-file text over the current estate. Returns the number
    /// of records applied; unknown or malformed records are skipped.
    pub fn load_game(&mut self, text: &str) -> SimResult<usize> {
        let records = self.symbols.load(&mut self.state, text);
        log::info!("loaded {records} records into run {}", self.run_id);

        let event = SimEvent::GameLoaded { tick: self.clock.current_tick, records };
        let entry = log_entry(&self.run_id, self.clock.current_tick, "engine", &event)?;
        self.store.append_event(&entry)?;
        Ok(records)
    }

    /// Replace the estate and clock with the newest snapshot at or before
    /// `tick`. Returns the snapshot's tick, or None if there is none.
    pub fn restore_snapshot(&mut self, tick: Tick) -> SimResult<Option<Tick>> {
        let Some((_, json)) = self.store.latest_snapshot_before(&self.run_id, tick)? else {
            return Ok(None);
        };
        let snapshot: SimSnapshot = serde_json::from_str(&json)?;
        let mut state = SimState::default();
        self.symbols.load(&mut state, &snapshot.save);
        self.state = state;
        self.clock = snapshot.clock;
        log::debug!("restored snapshot from tick {}", snapshot.tick);
        Ok(Some(snapshot.tick))
    }

    /// Figures from the most recent month, if one has run.
    pub fn last_report(&self) -> Option<&MonthReport> {
        self.economy().and_then(|e| e.last_report.as_ref())
    }

    /// The overseer's verdicts on the most recent month.
    pub fn advice(&self) -> SimResult<Vec<Advice>> {
        let economy = self.economy().ok_or(SimError::RunNotInitialized)?;
        let report = economy.last_report.as_ref().ok_or(SimError::RunNotInitialized)?;
        Ok(advice::assess(&self.state, report, economy.tables()))
    }

    /// Query events for a specific tick from the store.
    /// Used by the determinism test and replay tooling.
    pub fn store_events_for_tick(
        &self,
        run_id: &str,
        tick: Tick,
    ) -> SimResult<Vec<EventLogEntry>> {
        self.store.events_for_tick(run_id, tick)
    }

    pub fn store_event_count(&self, event_type: &str) -> SimResult<i64> {
        self.store.event_count(&self.run_id, event_type)
    }

    fn economy(&self) -> Option<&EconomySubsystem> {
        self.subsystems
            .iter()
            .find_map(|(_, sub)| sub.as_any().downcast_ref::<EconomySubsystem>())
    }

    fn take_snapshot(&self, tick: Tick) -> SimResult<()> {
        let snapshot = SimSnapshot {
            run_id: self.run_id.clone(),
            tick,
            clock:  self.clock.clone(),
            save:   self.save_game(),
        };
        let json = serde_json::to_string(&snapshot)?;
        self.store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot saved at tick {tick}");
        Ok(())
    }
}

fn log_entry(run_id: &str, tick: Tick, subsystem: &str, event: &SimEvent) -> SimResult<EventLogEntry> {
    Ok(EventLogEntry {
        id:         None,
        run_id:     run_id.to_string(),
        tick,
        subsystem:  subsystem.to_string(),
        event_type: event.type_name().to_string(),
        payload:    serde_json::to_string(event)?,
    })
}
