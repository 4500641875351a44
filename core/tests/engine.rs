//! Engine wiring: ticking, commands, saves, snapshots and narration.

use pharaoh_core::{
    command::PlayerCommand,
    engine::SimEngine,
    error::SimError,
    narration::RecordingAnnouncer,
};

fn stocked_engine(run_id: &str) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = SimEngine::build_test(run_id, 7).expect("engine");
    let s = engine.state_mut();
    s.slaves = 200.0;
    s.overseers = 10.0;
    s.oxen = 40.0;
    s.horses = 10.0;
    s.wheat = 80_000.0;
    s.gold = 20_000.0;
    s.fields.fallow = 300.0;
    s.controls.sl_feed_rt = 6.0;
    s.controls.ox_feed_rt = 60.0;
    s.controls.hs_feed_rt = 50.0;
    s.controls.ln_to_sew = 20.0;
    engine
}

#[test]
fn each_tick_closes_one_month() {
    let mut engine = stocked_engine("engine-months");
    engine.run_ticks(3).expect("run");

    assert_eq!(engine.clock.current_tick, 3);
    assert!(engine.clock.paused);
    assert_eq!(engine.state().month, 4.0);
    assert_eq!(engine.state().year, 1.0);
    assert_eq!(engine.store_event_count("month_closed").unwrap(), 3);
    assert_eq!(engine.store_event_count("run_initialized").unwrap(), 1);
    assert!(engine.last_report().is_some());
}

#[test]
fn run_initialized_is_logged_once() {
    let mut engine = stocked_engine("engine-init");
    engine.run_ticks(1).expect("first");
    engine.run_ticks(1).expect("second");
    assert_eq!(engine.store_event_count("run_initialized").unwrap(), 1);
}

#[test]
fn year_rolls_over_after_december() {
    let mut engine = stocked_engine("engine-year");
    engine.run_ticks(12).expect("run");
    assert_eq!(engine.state().month, 1.0);
    assert_eq!(engine.state().year, 2.0);
}

#[test]
fn set_control_writes_through_the_symbol_table() {
    let mut engine = stocked_engine("engine-controls");
    engine
        .apply_command(PlayerCommand::SetControl { symbol: "slFeedRt".into(), value: 8.5 })
        .expect("set");

    assert_eq!(engine.state().controls.sl_feed_rt, 8.5);
    assert_eq!(engine.symbols().get_number(engine.state(), "slFeedRt"), Some(8.5));
    assert_eq!(engine.store_event_count("player_command_received").unwrap(), 1);
}

#[test]
fn bad_controls_are_rejected_without_mutation() {
    let mut engine = stocked_engine("engine-bad-controls");
    let before = engine.save_game();

    let negative = engine.apply_command(PlayerCommand::SetControl { symbol: "lnToSew".into(), value: -5.0 });
    assert!(matches!(negative, Err(SimError::InvalidControl { .. })));

    let nan = engine.apply_command(PlayerCommand::SetControl { symbol: "lnToSew".into(), value: f64::NAN });
    assert!(matches!(nan, Err(SimError::InvalidControl { .. })));

    let unknown = engine.apply_command(PlayerCommand::SetControl { symbol: "lnToSow".into(), value: 5.0 });
    assert!(matches!(unknown, Err(SimError::UnknownSymbol { .. })));

    assert_eq!(engine.save_game(), before);
    assert_eq!(engine.store_event_count("player_command_received").unwrap(), 0);
}

#[test]
fn pause_and_resume_commands_drive_the_clock() {
    let mut engine = stocked_engine("engine-pause");
    engine.apply_command(PlayerCommand::Pause).unwrap();
    assert!(engine.clock.paused);
    engine.apply_command(PlayerCommand::Resume).unwrap();
    assert!(!engine.clock.paused);
    engine.tick().expect("tick while running");
    assert_eq!(engine.clock.current_tick, 1);
}

#[test]
#[should_panic(expected = "paused engine")]
fn ticking_a_paused_engine_panics() {
    let mut engine = stocked_engine("engine-paused-tick");
    engine.apply_command(PlayerCommand::Pause).unwrap();
    let _ = engine.tick();
}

#[test]
fn saved_game_loads_into_a_fresh_engine() {
    let mut engine = stocked_engine("engine-save");
    engine.run_ticks(5).expect("run");
    let text = engine.save_game();

    let mut other = SimEngine::build_test("engine-load", 99).expect("engine");
    let applied = other.load_game(&text).expect("load");

    assert_eq!(applied, engine.symbols().len());
    assert_eq!(other.save_game(), text);
    assert_eq!(other.state().players, engine.state().players);
    assert_eq!(other.store_event_count("game_loaded").unwrap(), 1);
}

#[test]
fn snapshots_restore_the_estate_and_clock() {
    let mut engine = stocked_engine("engine-snapshot");
    engine.run_ticks(12).expect("first year");
    let at_twelve = engine.save_game();

    engine.run_ticks(5).expect("more months");
    assert_ne!(engine.save_game(), at_twelve);

    let restored = engine.restore_snapshot(17).expect("restore");
    assert_eq!(restored, Some(12));
    assert_eq!(engine.clock.current_tick, 12);
    assert_eq!(engine.save_game(), at_twelve);

    assert_eq!(engine.restore_snapshot(11).expect("restore early"), None);
}

#[test]
fn month_closings_are_announced_in_words() {
    let mut engine = stocked_engine("engine-announce");
    let recorder = RecordingAnnouncer::default();
    engine.set_announcer(Box::new(recorder.clone()));

    engine.run_ticks(2).expect("run");

    let lines = recorder.lines();
    assert!(lines.contains(&"It is now February of year one.".to_string()), "{lines:?}");
    assert!(lines.contains(&"It is now March of year one.".to_string()), "{lines:?}");
}

#[test]
fn advice_needs_a_closed_month() {
    let mut engine = stocked_engine("engine-advice");
    assert!(matches!(engine.advice(), Err(SimError::RunNotInitialized)));

    engine.run_ticks(1).expect("run");
    let advice = engine.advice().expect("advice");

    assert_eq!(advice.len(), 10);
    for a in &advice {
        assert_eq!(a.code, a.category.base_code() + u32::from(!a.good));
        assert!(!a.phrase.is_empty());
    }
}
