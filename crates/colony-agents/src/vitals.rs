//! Vital mechanics applied to units each tick.
//!
//! - Age increments by 1
//! - Hunger increases by `hunger_rate`, clamped to 100
//! - At or above the starvation threshold, health drops by `starvation_damage`
//! - Energy drops by `energy_decay`; an exhausted unit loses morale instead
//! - A housed, fed, rested unit regenerates 1 health
//!
//! Sleeping units recover energy through the sleep task, which outpaces
//! the decay applied here.

use crate::agent::UnitState;
use crate::config::{AgentConfig, MAX_VITAL};
use crate::death::{DeathCause, check_death};
use crate::error::AgentError;

/// Hunger below which a housed unit may heal.
const HEAL_HUNGER_BELOW: u32 = 50;

/// Energy above which a housed unit may heal.
const HEAL_ENERGY_ABOVE: u32 = 50;

/// Result of applying one tick of vital mechanics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VitalTickResult {
    /// If the unit died during this tick, the cause of death.
    pub death: Option<DeathCause>,
}

/// Apply one tick of vital mechanics. `housed` is whether the unit owns
/// a bed.
pub fn apply_vital_tick(
    state: &mut UnitState,
    config: &AgentConfig,
    housed: bool,
) -> Result<VitalTickResult, AgentError> {
    state.age = state.age.checked_add(1).ok_or_else(|| AgentError::ArithmeticOverflow {
        context: String::from("age increment overflow"),
    })?;

    state.hunger = state
        .hunger
        .checked_add(config.hunger_rate)
        .ok_or_else(|| AgentError::ArithmeticOverflow {
            context: String::from("hunger increase overflow"),
        })?
        .min(MAX_VITAL);

    if state.hunger >= config.starvation_threshold {
        state.health = state.health.saturating_sub(config.starvation_damage);
    }

    if state.energy == 0 {
        state.morale = state.morale.saturating_sub(1);
    } else {
        state.energy = state.energy.saturating_sub(config.energy_decay);
    }

    if housed
        && state.health > 0
        && state.hunger < HEAL_HUNGER_BELOW
        && state.energy > HEAL_ENERGY_ABOVE
    {
        state.health = state.health.saturating_add(1).min(MAX_VITAL);
    }

    Ok(VitalTickResult {
        death: check_death(state, config),
    })
}
