//! Carry the inventory to a stockpile.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{FailureReason, Position, ResourceId};

use super::{TaskStep, approach};
use crate::world::WorldState;

/// Delivery task state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverToStorage {
    storage: ResourceId,
    at: Position,
    delivered: u32,
}

impl DeliverToStorage {
    /// Deliver to `storage`.
    pub const fn new(storage: ResourceId, at: Position) -> Self {
        Self {
            storage,
            at,
            delivered: 0,
        }
    }

    /// Units deposited so far.
    pub const fn delivered(&self) -> u32 {
        self.delivered
    }
}

impl TaskStep for DeliverToStorage {
    fn start(&mut self, _unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let storage = world.storage(self.storage).ok_or(FailureReason::TargetMissing)?;
        self.at = storage.position();
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let at = world
            .storage(self.storage)
            .map(|s| s.position())
            .ok_or(FailureReason::TargetMissing)?;
        if !approach(unit, at, world.tasks.interaction_range) {
            return Ok(());
        }
        unit.stop();

        let storage = world
            .storage_mut(self.storage)
            .ok_or(FailureReason::TargetMissing)?;
        for (kind, quantity) in unit.take_all() {
            let accepted = storage.deposit(kind, quantity);
            self.delivered = self.delivered.saturating_add(accepted);
            let rest = quantity.saturating_sub(accepted);
            // Rest came out of the inventory a moment ago, so it fits back.
            if rest > 0 && unit.add_item(kind, rest).is_err() {
                debug!(agent = %unit.id(), item = %kind, rest, "Could not return undelivered items");
            }
        }
        debug!(storage = %self.storage, agent = %unit.id(), delivered = self.delivered, "Delivered");
        Ok(())
    }

    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        let storage = world.storage(self.storage).ok_or(FailureReason::TargetMissing)?;
        Ok(unit.is_inventory_empty() || storage.is_full())
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.storage)
    }
}
