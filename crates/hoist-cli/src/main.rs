//! `hoist-cli` – console front end for the Hoist elevator dispatcher.
//!
//! The binary:
//!
//! 1. Loads `~/.hoist/config.toml`, writing the defaults on first run, and
//!    applies `HOIST_*` environment overrides.
//! 2. Runs one dispatch session, either **interactive** (hallway calls and
//!    destinations typed at the prompt) or **simulate** (seeded random
//!    riders, no delays).
//! 3. Intercepts **Ctrl-C** so the car parks and empties before exiting.

mod config;
mod console;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use hoist_core::{Collaborators, Elevator, SessionReport, SessionState, TripObserver};
use hoist_sim::{RandomPassengers, SimBuilder};
use tracing::{error, info, info_span, warn};

use config::{Config, Mode};
use console::{ConsoleCallSource, ConsoleClock, ConsoleObserver, ConsolePanel, EventMirror};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the level (default "info"); HOIST_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Narration still goes to stdout.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("HOIST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    let (stop_tx, stop_rx) = console::stop_channel();
    let mut stop_tx = Some(stop_tx);

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – parking the car …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
        // Closing the channel wakes a door that is waiting for buttons.
        stop_tx.take();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; Ctrl-C will exit without parking");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = load_config();
    if let Err(e) = cfg.validate() {
        error!(error = %e, "invalid configuration");
        println!("{}: {}", "Config error".red().bold(), e);
        std::process::exit(1);
    }
    println!(
        "  Floors {}–{}, limit {} lb, mode {}\n",
        cfg.building.min_floor,
        cfg.building.max_floor,
        cfg.building.max_weight,
        cfg.mode.to_string().bold()
    );

    // ── Session ───────────────────────────────────────────────────────────
    let elevator = match cfg.mode {
        Mode::Interactive => interactive_elevator(&cfg, shutdown.clone(), stop_rx),
        Mode::Simulate => simulated_elevator(&cfg),
    };
    let mut elevator = match elevator {
        Ok(elevator) => elevator,
        Err(e) => {
            error!(error = %e, "failed to build elevator");
            println!("{}: {}", "Startup error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let report = drive(&mut elevator, &shutdown);
    print_summary(&report);
}

/// Step the session until it parks, parking early on Ctrl-C.
fn drive(elevator: &mut Elevator, shutdown: &AtomicBool) -> SessionReport {
    let span = info_span!("session");
    let _enter = span.enter();
    info!("session started");
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return elevator.stop().clone();
        }
        if elevator.step() == SessionState::Parked {
            return elevator.report().clone();
        }
    }
}

fn observers(cfg: &Config) -> Vec<Box<dyn TripObserver>> {
    let mut observers: Vec<Box<dyn TripObserver>> = vec![Box::new(ConsoleObserver::new(&cfg.building))];
    if std::env::var("HOIST_EVENT_LOG").as_deref() == Ok("json") {
        observers.push(Box::new(EventMirror::stdout()));
    }
    observers
}

fn interactive_elevator(
    cfg: &Config,
    shutdown: Arc<AtomicBool>,
    stop: crossbeam_channel::Receiver<()>,
) -> Result<Elevator, hoist_types::HoistError> {
    let lines = console::spawn_stdin_reader();
    let calls = ConsoleCallSource::new(lines.clone(), shutdown, &cfg.building);
    let panel = ConsolePanel::new(lines, stop, &cfg.building);
    let passengers = RandomPassengers::new(cfg.seed);

    let mut collab = Collaborators::new(Box::new(calls), Box::new(panel), Box::new(passengers))
        .with_clock(Box::new(ConsoleClock::new(cfg.realtime)));
    for observer in observers(cfg) {
        collab = collab.with_observer(observer);
    }
    Elevator::new(cfg.building.clone(), collab)
}

fn simulated_elevator(cfg: &Config) -> Result<Elevator, hoist_types::HoistError> {
    info!(seed = cfg.seed, rounds = cfg.sim_rounds, "starting simulation");
    let mut builder = SimBuilder::new(cfg.building.clone(), cfg.seed).with_rounds(cfg.sim_rounds);
    for observer in observers(cfg) {
        builder = builder.with_observer(observer);
    }
    builder.build()
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __ __     _     __ "#.bold().cyan());
    println!("{}", r#"  / // /__  (_)__ / /_"#.bold().cyan());
    println!("{}", r#" / _  / _ \/ (_-</ __/"#.bold().cyan());
    println!("{}", r#"/_//_/\___/_/___/\__/ "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Hoist".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Welcome to the Elevator. A business with ups and downs.");
    println!();
}

fn print_summary(report: &SessionReport) {
    println!();
    println!("{}", "  Session summary".bold());
    println!("    trips dispatched : {}", report.trips);
    println!("    floors visited   : {}", report.visits.len());
    println!("    moves            : {}", report.moves);
    println!("    boarded          : {}", report.boarded);
    println!("    exited           : {}", report.offboarded);
    if report.stranded > 0 {
        println!("    stranded         : {}", report.stranded.to_string().yellow());
    }
    if !report.refused.is_empty() {
        println!("    refused          : {}", report.refused.len().to_string().red());
    }
    if report.abandoned > 0 {
        println!("    left waiting     : {}", report.abandoned.to_string().red());
    }
    if let Some(floor) = report.parked_at {
        println!("    parked at floor  : {floor}");
    }
    println!();
}
