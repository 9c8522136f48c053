//! Sleep in the bed the unit owns.
//!
//! Only the owner may sleep, so the task never reserves anything itself:
//! ownership comes from the bed registry's matching. Occupancy starts on
//! arrival and ends on every terminal path. A cancelled sleep is an
//! interruption and costs morale.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{AgentId, FailureReason, Position, ResourceId, TaskState};
use colony_world::Reservable;

use super::{TaskStep, approach};
use crate::world::{WorldState, apply_morale_penalty};

/// Sleep task state.
#[derive(Debug, Clone, PartialEq)]
pub struct Sleep {
    bed: ResourceId,
    at: Position,
    sleeping: bool,
    done: bool,
}

impl Sleep {
    /// Sleep in `bed`.
    pub const fn new(bed: ResourceId, at: Position) -> Self {
        Self {
            bed,
            at,
            sleeping: false,
            done: false,
        }
    }

    /// Whether the unit is in bed.
    pub const fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

impl TaskStep for Sleep {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let bed = world.beds.get(self.bed).ok_or(FailureReason::TargetMissing)?;
        self.at = bed.position();
        if world.beds.resource_of(unit.id()) != Some(self.bed) {
            return Err(FailureReason::ReservationRejected);
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let range = world.tasks.interaction_range;
        let energy = world.bed_config.energy_per_tick;
        let bed = world.beds.get_mut(self.bed).ok_or(FailureReason::TargetMissing)?;

        if !self.sleeping {
            if !approach(unit, bed.position(), range) {
                return Ok(());
            }
            unit.stop();
            if !bed.start_sleep(unit.id()) {
                return Err(FailureReason::ReservationRejected);
            }
            self.sleeping = true;
            debug!(bed = %self.bed, agent = %unit.id(), "Fell asleep");
            return Ok(());
        }

        if !bed.is_sleeping(unit.id()) {
            // Woken by someone else: the bed changed hands mid-sleep.
            return Err(FailureReason::Interrupted);
        }
        unit.rest(energy);
        self.done = bed.advance_sleep();
        Ok(())
    }

    fn is_complete(&self, _unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        if !world.beds.contains(self.bed) {
            return Err(FailureReason::TargetMissing);
        }
        Ok(self.done)
    }

    fn cleanup(
        &mut self,
        agent: AgentId,
        unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
        outcome: TaskState,
    ) {
        let Some(bed) = world.beds.get_mut(self.bed) else {
            return;
        };
        if !bed.is_sleeping(agent) {
            return;
        }
        let eviction = match outcome {
            TaskState::Cancelled => bed.end_sleep(true, true),
            TaskState::Failed => bed.end_sleep(true, false),
            TaskState::Completed | TaskState::Pending | TaskState::InProgress => {
                bed.end_sleep(false, false)
            }
        };
        self.sleeping = false;
        debug!(bed = %self.bed, agent = %agent, outcome = %outcome, "Woke up");

        if let Some(eviction) = eviction
            && eviction.penalize
            && let Some(unit) = unit
        {
            let penalty = world.bed_config.eviction_penalty;
            apply_morale_penalty(unit, penalty, "sleep_interrupted", &mut world.events);
        }
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.bed)
    }
}
