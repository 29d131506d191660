use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ember_app::console;
use ember_app::dispatch_loop::spawn_dispatch_loop;
use ember_app::error::AppError;
use ember_app::snapshot::save_snapshot;
use ember_core::commands::DispatchCommand;
use ember_core::config::DispatchConfig;
use ember_dispatch::scenario::{self, ScenarioSpec};
use ember_dispatch::DispatchEngine;

/// Dispatch a generated drone fleet against generated fire incidents.
#[derive(Debug, Parser)]
#[command(name = "ember", version)]
struct Args {
    /// Scenario seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of drones to generate
    #[arg(long, default_value_t = 4)]
    units: usize,

    /// Number of fire incidents to generate
    #[arg(long, default_value_t = 4)]
    incidents: usize,

    /// Optimize + resolve rounds to run
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// JSON dispatch config; missing fields take their defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the final fleet snapshot here as JSON
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Dispatch loop cycle in milliseconds
    #[arg(long, default_value_t = 10)]
    cycle_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "ember stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };

    let mut engine = DispatchEngine::new(config);
    let spec = ScenarioSpec {
        seed: args.seed,
        units: args.units,
        incidents: args.incidents,
        ..Default::default()
    };
    let (units, incidents) = scenario::populate(&mut engine, &spec)?;
    info!(
        seed = args.seed,
        units = units.len(),
        incidents = incidents.len(),
        "scenario loaded"
    );
    print!("{}", console::format_units(engine.store().units()));
    println!();
    print!("{}", console::format_incidents(engine.store().incidents()));
    println!();

    let handle = spawn_dispatch_loop(engine, Duration::from_millis(args.cycle_ms))?;
    for _ in 0..args.rounds {
        handle.send_all([DispatchCommand::Optimize, DispatchCommand::ResolveNext])?;
    }
    handle.shutdown();

    for event in handle.events() {
        print!("{}", console::format_event(&event));
    }
    let snapshot = handle.join()?;

    println!();
    print!("{}", console::format_units(&snapshot.units));
    println!();
    print!("{}", console::format_incidents(&snapshot.incidents));
    println!();
    print!("{}", console::format_report(&snapshot.report));

    if let Some(path) = &args.snapshot {
        save_snapshot(path, &snapshot)?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}
