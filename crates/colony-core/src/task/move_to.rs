//! Walk to a point.

use colony_agents::Unit;
use colony_types::{FailureReason, Position};

use super::TaskStep;
use crate::world::WorldState;

/// Move task state.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTo {
    target: Position,
}

impl MoveTo {
    /// Head for `target`.
    pub const fn new(target: Position) -> Self {
        Self { target }
    }
}

impl TaskStep for MoveTo {
    fn execute(&mut self, unit: &mut dyn Unit, _world: &mut WorldState) -> Result<(), FailureReason> {
        unit.move_to(self.target);
        Ok(())
    }

    // The distance check covers a navigation layer that never reports
    // arrival for a target it is already standing on.
    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(unit.has_arrived()
            || unit.position().distance(self.target) < world.tasks.arrival_threshold)
    }

    fn target(&self) -> Position {
        self.target
    }
}
