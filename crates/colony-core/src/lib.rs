//! Task dispatch, colony container, and tick cycle for the colony
//! simulation.
//!
//! Units are matched to scarce resources and driven through multi-step
//! tasks. Every task acquires its reservations on start and releases them
//! on whichever terminal transition it takes, so nothing outlives the
//! task that holds it, not even when the unit or the resource disappears
//! mid-job.
//!
//! # Modules
//!
//! - [`board`] -- [`PostedTaskBoard`], shared multi-worker jobs with
//!   worker caps.
//! - [`clock`] -- Tick counter with day arithmetic.
//! - [`colony`] -- [`Colony`], the owner of agents, drivers, and world,
//!   with explicit lifecycle calls.
//! - [`config`] -- Configuration loading from `colony-config.yaml`.
//! - [`dispatch`] -- [`TaskDriver`], the [`Behavior`] seam, and
//!   [`FirstFitBehavior`].
//! - [`runner`] -- Bounded async loop around the tick cycle.
//! - [`sink`] -- Notification listeners.
//! - [`task`] -- The [`Task`] state machine and its variants.
//! - [`tick`] -- One step of the colony.
//! - [`world`] -- [`WorldState`], everything tasks act on.
//!
//! [`PostedTaskBoard`]: board::PostedTaskBoard
//! [`Colony`]: colony::Colony
//! [`TaskDriver`]: dispatch::TaskDriver
//! [`Behavior`]: dispatch::Behavior
//! [`FirstFitBehavior`]: dispatch::FirstFitBehavior
//! [`Task`]: task::Task
//! [`WorldState`]: world::WorldState

pub mod board;
pub mod clock;
pub mod colony;
pub mod config;
pub mod dispatch;
pub mod runner;
pub mod sink;
pub mod task;
pub mod tick;
pub mod world;

pub use board::{PostedTask, PostedTaskBoard};
pub use clock::{ClockError, WorldClock};
pub use colony::Colony;
pub use config::{ConfigError, SimulationConfig};
pub use dispatch::{Behavior, DriverStats, FirstFitBehavior, TaskDriver};
pub use sink::{LogSink, NoOpSink, NotificationSink};
pub use task::{Task, TaskStep, TaskVariant};
pub use tick::{TickError, TickSummary, run_tick};
pub use world::WorldState;
