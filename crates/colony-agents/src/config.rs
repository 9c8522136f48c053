//! Tunables for unit movement, work output, and vital mechanics.
//!
//! The engine reads these from the `agents` section of the simulation
//! YAML and hands them to [`UnitState::new`](crate::agent::UnitState::new)
//! and the per-tick vital update.

use serde::{Deserialize, Serialize};

/// Upper bound for every vital stat.
pub const MAX_VITAL: u32 = 100;

/// Configuration for spawned units.
///
/// Rates are whole `u32` values applied once per tick. Movement and work
/// figures are `f32` because they mix with world-space distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// World units moved per tick (default: 1.0).
    pub move_speed: f32,

    /// Work applied per tick at construction sites and workstations
    /// (default: 1.0).
    pub work_speed: f32,

    /// Gather power applied per tick at harvest nodes (default: 1.0).
    pub gather_power: f32,

    /// Maximum number of carried items (default: 10).
    pub carry_capacity: u32,

    /// Hunger points added per tick (default: 1).
    pub hunger_rate: u32,

    /// Energy lost per tick while awake (default: 1).
    pub energy_decay: u32,

    /// Health damage per tick once hunger reaches the threshold (default: 5).
    pub starvation_damage: u32,

    /// Hunger at or above which starvation damage applies (default: 100).
    pub starvation_threshold: u32,

    /// Hunger at or above which a unit goes looking for food (default: 60).
    pub hungry_threshold: u32,

    /// Energy at or below which a unit goes to bed (default: 25).
    pub tired_threshold: u32,

    /// Starting energy for new units (default: 80).
    pub starting_energy: u32,

    /// Starting health for new units (default: 100).
    pub starting_health: u32,

    /// Starting morale for new units (default: 70).
    pub starting_morale: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            work_speed: 1.0,
            gather_power: 1.0,
            carry_capacity: 10,
            hunger_rate: 1,
            energy_decay: 1,
            starvation_damage: 5,
            starvation_threshold: 100,
            hungry_threshold: 60,
            tired_threshold: 25,
            starting_energy: 80,
            starting_health: 100,
            starting_morale: 70,
        }
    }
}

impl AgentConfig {
    /// Whether a unit with `hunger` should prioritise eating.
    pub const fn is_hungry(&self, hunger: u32) -> bool {
        hunger >= self.hungry_threshold
    }

    /// Whether a unit with `energy` should prioritise sleeping.
    pub const fn is_tired(&self, energy: u32) -> bool {
        energy <= self.tired_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.carry_capacity, 10);
        assert_eq!(cfg.hunger_rate, 1);
        assert_eq!(cfg.starting_energy, 80);
        assert_eq!(cfg.starting_health, 100);
        assert!(cfg.starting_morale <= MAX_VITAL);
    }

    #[test]
    fn thresholds() {
        let cfg = AgentConfig::default();
        assert!(!cfg.is_hungry(59));
        assert!(cfg.is_hungry(60));
        assert!(cfg.is_tired(25));
        assert!(!cfg.is_tired(26));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: AgentConfig = serde_json::from_str(r#"{"move_speed": 2.5}"#).unwrap_or_default();
        assert!((cfg.move_speed - 2.5).abs() < f32::EPSILON);
        assert_eq!(cfg.carry_capacity, 10);
    }
}
