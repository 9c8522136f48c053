//! Death conditions and what a dead unit leaves behind.
//!
//! A unit dies when its health reaches 0. Its carried items drop at its
//! position; the colony turns them into loose items and releases every
//! reservation the unit held.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, ItemKind, Position};

use crate::agent::UnitState;
use crate::config::AgentConfig;
use crate::unit::Unit;

/// The cause of a unit's death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health ran out while starving.
    Starvation,
    /// Health ran out for any other reason.
    Injury,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::Injury => write!(f, "injury"),
        }
    }
}

/// Check whether a unit meets a death condition. Inspects only.
pub const fn check_death(state: &UnitState, config: &AgentConfig) -> Option<DeathCause> {
    if state.health > 0 {
        return None;
    }
    if state.hunger >= config.starvation_threshold {
        return Some(DeathCause::Starvation);
    }
    Some(DeathCause::Injury)
}

/// Data produced when a unit dies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathConsequences {
    /// The unit that died.
    pub agent_id: AgentId,

    /// The cause of death.
    pub cause: DeathCause,

    /// Ticks lived.
    pub final_age: u64,

    /// Where the unit died; dropped items land here.
    pub position: Position,

    /// Items the unit was carrying. Empty if it carried nothing.
    pub dropped_inventory: BTreeMap<ItemKind, u32>,
}

/// Empty the unit's inventory and describe its death. The caller removes
/// the unit and materialises the dropped items.
pub fn process_death(state: &mut UnitState, cause: DeathCause) -> DeathConsequences {
    state.stop();
    DeathConsequences {
        agent_id: state.id,
        cause,
        final_age: state.age,
        position: state.position,
        dropped_inventory: state.take_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> UnitState {
        UnitState::new("Test", Position::new(2.0, 3.0), &AgentConfig::default())
    }

    #[test]
    fn alive_unit_returns_none() {
        let state = test_state();
        assert_eq!(check_death(&state, &AgentConfig::default()), None);
    }

    #[test]
    fn death_by_starvation() {
        let mut state = test_state();
        state.health = 0;
        state.hunger = 100;
        assert_eq!(
            check_death(&state, &AgentConfig::default()),
            Some(DeathCause::Starvation)
        );
    }

    #[test]
    fn death_by_injury() {
        let mut state = test_state();
        state.health = 0;
        state.hunger = 30;
        assert_eq!(check_death(&state, &AgentConfig::default()), Some(DeathCause::Injury));
    }

    #[test]
    fn process_death_drains_inventory() {
        let mut state = test_state();
        assert!(state.add_item(ItemKind::Wood, 3).is_ok());
        assert!(state.add_item(ItemKind::Berries, 2).is_ok());

        let result = process_death(&mut state, DeathCause::Starvation);
        assert_eq!(result.dropped_inventory.get(&ItemKind::Wood).copied(), Some(3));
        assert_eq!(result.dropped_inventory.get(&ItemKind::Berries).copied(), Some(2));
        assert_eq!(result.position, Position::new(2.0, 3.0));
        assert!(state.is_inventory_empty());
    }

    #[test]
    fn death_cause_display() {
        assert_eq!(DeathCause::Starvation.to_string(), "starvation");
        assert_eq!(DeathCause::Injury.to_string(), "injury");
    }
}
