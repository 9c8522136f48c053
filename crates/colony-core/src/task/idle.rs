//! Stand still for a fixed time.

use colony_agents::Unit;
use colony_types::{FailureReason, Position};

use super::TaskStep;
use crate::world::WorldState;

/// Idle wait state.
#[derive(Debug, Clone, PartialEq)]
pub struct IdleWait {
    at: Position,
    waited: u64,
}

impl IdleWait {
    /// Wait where the unit stands.
    pub const fn new() -> Self {
        Self {
            at: Position::ORIGIN,
            waited: 0,
        }
    }
}

impl Default for IdleWait {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStep for IdleWait {
    fn start(&mut self, unit: &mut dyn Unit, _world: &mut WorldState) -> Result<(), FailureReason> {
        self.at = unit.position();
        unit.stop();
        Ok(())
    }

    fn execute(&mut self, _unit: &mut dyn Unit, _world: &mut WorldState) -> Result<(), FailureReason> {
        self.waited = self.waited.saturating_add(1);
        Ok(())
    }

    fn is_complete(&self, _unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(self.waited >= world.tasks.idle_wait_ticks)
    }

    fn target(&self) -> Position {
        self.at
    }
}
