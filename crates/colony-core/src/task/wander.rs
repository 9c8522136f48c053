//! Stroll to a random point near where the unit started.

use rand::Rng;

use colony_agents::Unit;
use colony_types::{AgentId, FailureReason, Position, TaskState};

use super::TaskStep;
use crate::world::WorldState;

/// Wander state. The destination is drawn from the world's seeded RNG
/// when the task starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Wander {
    destination: Position,
    walked: u64,
}

impl Wander {
    /// Wander with a destination chosen at start.
    pub const fn new() -> Self {
        Self {
            destination: Position::ORIGIN,
            walked: 0,
        }
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStep for Wander {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let radius = world.tasks.wander_radius.abs();
        let origin = unit.position();
        self.destination = if radius > 0.0 {
            let rng = world.rng();
            origin.offset(rng.random_range(-radius..=radius), rng.random_range(-radius..=radius))
        } else {
            origin
        };
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, _world: &mut WorldState) -> Result<(), FailureReason> {
        self.walked = self.walked.saturating_add(1);
        unit.move_to(self.destination);
        Ok(())
    }

    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(unit.has_arrived() || self.walked >= world.tasks.wander_ticks)
    }

    fn cleanup(
        &mut self,
        _agent: AgentId,
        unit: Option<&mut dyn Unit>,
        _world: &mut WorldState,
        _outcome: TaskState,
    ) {
        if let Some(unit) = unit {
            unit.stop();
        }
    }

    fn target(&self) -> Position {
        self.destination
    }
}
