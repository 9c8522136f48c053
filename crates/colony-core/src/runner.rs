//! Bounded simulation loop.
//!
//! [`run_simulation`] wraps [`run_tick`] with the control plane around it:
//!
//! - **Bounded run**: stop after `max_ticks`, or when no unit is left
//! - **Pause/resume** and **stop**, through a shared [`RunControl`]
//! - **Variable tick speed**: the interval is read before every sleep
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::colony::Colony;
use crate::dispatch::Behavior;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks`.
    MaxTicksReached,
    /// A stop was requested through [`RunControl`].
    Stopped,
    /// Every unit is gone.
    Extinction,
}

/// Shared run controls. Safe to poke from another task (a signal handler,
/// say) while the loop runs.
#[derive(Debug)]
pub struct RunControl {
    paused: AtomicBool,
    resume: Notify,
    stop_requested: AtomicBool,
    tick_interval_ms: AtomicU64,
    max_ticks: u64,
}

impl RunControl {
    /// Controls for a run of at most `max_ticks` ticks (0 = unbounded)
    /// spaced `tick_interval_ms` apart.
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
        }
    }

    /// Pause before the next tick.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resume a paused run.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resume.notify_waiters();
    }

    /// Whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Ask the loop to stop before the next tick. Also releases a pause.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.resume();
    }

    /// Whether a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Milliseconds between ticks.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::SeqCst)
    }

    /// Change the tick interval; takes effect after the current tick.
    pub fn set_tick_interval_ms(&self, interval_ms: u64) {
        self.tick_interval_ms.store(interval_ms, Ordering::SeqCst);
    }

    /// Tick limit; 0 means none.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` is the last tick allowed.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }

    async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            let notified = self.resume.notified();
            if !self.is_paused() {
                break;
            }
            notified.await;
        }
    }
}

/// Result of the simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, colony: &Colony);
}

/// A no-op tick callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _colony: &Colony) {}
}

/// Run ticks until the tick limit, extinction, or a stop request.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails unrecoverably.
pub async fn run_simulation(
    colony: &mut Colony,
    behavior: &mut dyn Behavior,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        agents = colony.agents().len(),
        "Simulation starting"
    );

    loop {
        if control.is_paused() {
            info!("Simulation paused, waiting for resume");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Stopped,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(colony, behavior)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, colony);

        if summary.agents_alive == 0 {
            info!(tick = summary.tick, "No units left");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Extinction,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        if control.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, max_ticks = control.max_ticks(), "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log how the run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_agents_alive = result.final_summary.as_ref().map(|s| s.agents_alive),
        "Simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}
