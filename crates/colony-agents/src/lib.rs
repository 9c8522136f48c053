//! Units, inventories, and vitals for the colony simulation.
//!
//! Tasks drive agents only through the [`Unit`] capability trait.
//! [`UnitState`] is the concrete implementation the engine spawns;
//! [`AgentRoster`] owns units in join order.
//!
//! # Modules
//!
//! - [`unit`] -- The [`Unit`] contract tasks program against
//! - [`agent`] -- [`UnitState`] and [`AgentRoster`]
//! - [`config`] -- Tunables for movement, work, and vitals ([`AgentConfig`])
//! - [`inventory`] -- Carried items with a capacity limit
//! - [`vitals`] -- Per-tick hunger, energy, and health
//! - [`death`] -- Death conditions and dropped items ([`DeathCause`])
//! - [`error`] -- Error types ([`AgentError`])

pub mod agent;
pub mod config;
pub mod death;
pub mod error;
pub mod inventory;
pub mod unit;
pub mod vitals;

// Re-export primary types at crate root for convenience.
pub use agent::{AgentRoster, UnitState};
pub use config::{AgentConfig, MAX_VITAL};
pub use death::{DeathCause, DeathConsequences, check_death, process_death};
pub use error::AgentError;
pub use inventory::Inventory;
pub use unit::{ARRIVAL_EPSILON, Unit};
pub use vitals::{VitalTickResult, apply_vital_tick};
