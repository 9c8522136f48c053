//! Engine binary for the colony simulation.
//!
//! This is the entry point that wires the configuration, the starting
//! layout, and the bounded tick loop together. It runs until the tick
//! limit, extinction, or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `colony-config.yaml` in the working directory
//! 2. Initialize structured logging (tracing)
//! 3. Create the colony and its clock
//! 4. Spawn the starting layout
//! 5. Run the simulation loop with the first-fit behaviour
//! 6. Log the result and print the final summary as JSON

mod error;
mod spawner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colony_core::config::LoggingConfig;
use colony_core::runner::{self, RunControl, TickCallback};
use colony_core::{Colony, FirstFitBehavior, LogSink, SimulationConfig, TickSummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "colony-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_arg = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_arg.as_deref())?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "Configuration loaded"
    );

    // 3. Create the colony.
    let mut colony = Colony::new(&config).map_err(EngineError::from)?;
    colony.add_sink(Box::new(LogSink));

    // 4. Spawn the starting layout.
    let report = spawner::populate(&mut colony, &config.spawn, config.world.seed)?;
    info!(
        agents = report.agents.len(),
        homeless = colony.world().beds.unmatched_consumers().len(),
        "Colony ready"
    );

    // 5. Run the simulation.
    let control = Arc::new(RunControl::new(config.world.tick_interval_ms, config.world.max_ticks));
    let stop = Arc::clone(&control);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current tick");
            stop.request_stop();
        }
    });

    let mut behavior = FirstFitBehavior::new(config.agents.clone(), config.world.seed);
    let mut callback = SummaryLogger::new(config.logging.summary_interval_ticks);
    let result = runner::run_simulation(&mut colony, &mut behavior, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Report.
    runner::log_simulation_end(&result);
    if let Some(summary) = &result.final_summary {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "colony-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// An explicit path must exist. Without one, `colony-config.yaml` is used
/// if present and the defaults otherwise.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    if let Some(path) = path {
        return Ok(SimulationConfig::from_file(path)?);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        Ok(SimulationConfig::from_file(default_path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

// -----------------------------------------------------------------------
// Tick callback
// -----------------------------------------------------------------------

/// Logs a one-line summary every `interval` ticks and every death as it
/// happens.
struct SummaryLogger {
    interval: u64,
}

impl SummaryLogger {
    const fn new(interval: u64) -> Self {
        Self { interval }
    }
}

impl TickCallback for SummaryLogger {
    fn on_tick(&mut self, summary: &TickSummary, colony: &Colony) {
        for death in &summary.deaths {
            warn!(tick = summary.tick, agent = %death.agent_id, cause = ?death.cause, "Unit died");
        }
        if !matches!(summary.tick.checked_rem(self.interval), Some(0)) {
            return;
        }
        info!(
            tick = summary.tick,
            day = summary.day,
            agents_alive = summary.agents_alive,
            homeless = colony.world().beds.unmatched_consumers().len(),
            open_postings = colony.world().board.len(),
            tasks_completed = summary.tasks_completed,
            tasks_failed = summary.tasks_failed,
            "Tick summary"
        );
    }
}
