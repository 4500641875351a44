//! sim-runner: headless runner for the Pharaoh estate simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 24 --db run.db
//!   sim-runner --load estate.sav --ticks 12 --save estate.sav
//!   sim-runner --seed 12345 --ipc-mode

use anyhow::{Context, Result};
use pharaoh_core::{
    command::PlayerCommand,
    engine::SimEngine,
    store::SimStore,
    types::Tick,
    words::format_quantity,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Set { symbol: String, value: f64 },
    Dump,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick:   Tick,
    paused: bool,
    month:  f64,
    year:   f64,
    gold:   f64,
    loan:   f64,
    wheat:  f64,
    slaves: f64,
    oxen:   f64,
    horses: f64,
    advice: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 12u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let load = flag_value(&args, "--load");
    let save = flag_value(&args, "--save");

    if !ipc_mode {
        println!("Pharaoh sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().timestamp());
    store.insert_run(&run_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut engine = SimEngine::build(run_id.clone(), seed, store, data_dir)?;

    if let Some(path) = load {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let records = engine.load_game(&text)?;
        log::info!("applied {records} records from {path}");
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        engine.run_ticks(ticks)?;
        print_summary(&engine, &run_id)?;
    }

    if let Some(path) = save {
        std::fs::write(path, engine.save_game()).with_context(|| format!("writing {path}"))?;
        log::info!("saved estate to {path}");
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count)?;
                writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
            }
            IpcCommand::GetState => {
                writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?;
            }
            IpcCommand::Set { symbol, value } => {
                match engine.apply_command(PlayerCommand::SetControl { symbol, value }) {
                    Ok(()) => writeln!(stdout, "{}", serde_json::to_string(&build_ui_state(engine))?)?,
                    Err(e) => writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?,
                }
            }
            IpcCommand::Dump => {
                writeln!(stdout, "{}", serde_json::json!({ "save": engine.save_game() }))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine) -> UiState {
    let s = engine.state();
    UiState {
        tick:   engine.clock.current_tick,
        paused: engine.clock.paused,
        month:  s.month,
        year:   s.year,
        gold:   s.gold,
        loan:   s.loan,
        wheat:  s.wheat,
        slaves: s.slaves,
        oxen:   s.oxen,
        horses: s.horses,
        advice: engine
            .advice()
            .map(|all| all.into_iter().map(|a| a.phrase.to_string()).collect())
            .unwrap_or_default(),
    }
}

fn print_summary(engine: &SimEngine, run_id: &str) -> Result<()> {
    let s = engine.state();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:      {run_id}");
    println!("  final tick:  {}", engine.clock.current_tick);
    println!("  calendar:    {} of year {}", pharaoh_core::clock::month_name(s.month), s.year);
    println!("  gold:        {}", format_quantity(s.gold));
    println!("  loan:        {}", format_quantity(s.loan));
    println!("  wheat:       {}", format_quantity(s.wheat));
    println!("  slaves:      {}", format_quantity(s.slaves));
    println!("  oxen:        {}", format_quantity(s.oxen));
    println!("  horses:      {}", format_quantity(s.horses));
    println!("  pyramid:     {} layers", format_quantity(s.py_height));
    println!("  plagues:     {}", engine.store_event_count("plague")?);
    println!("  locusts:     {}", engine.store_event_count("locusts")?);

    if let Ok(advice) = engine.advice() {
        println!();
        println!("=== OVERSEER'S REPORT ===");
        for a in advice {
            println!("  {}", a.phrase);
        }
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
