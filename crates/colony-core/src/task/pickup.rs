//! Reserve a loose item, walk to it, and carry it.
//!
//! The reservation is the item's owner slot in the item registry. It is
//! taken on start and released on every terminal path; picking up the
//! whole stack deregisters the item, which releases it as a side effect.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{AgentId, FailureReason, Position, ResourceId, TaskState};
use colony_world::Reservable;

use super::{TaskStep, approach};
use crate::world::WorldState;

/// Pickup task state.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupItem {
    item: ResourceId,
    at: Position,
    picked: u32,
    done: bool,
}

impl PickupItem {
    /// Pick up `item`.
    pub const fn new(item: ResourceId, at: Position) -> Self {
        Self {
            item,
            at,
            picked: 0,
            done: false,
        }
    }

    /// Units carried away so far.
    pub const fn picked(&self) -> u32 {
        self.picked
    }
}

impl TaskStep for PickupItem {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let Some(item) = world.items.get(self.item) else {
            return Err(FailureReason::TargetMissing);
        };
        self.at = item.position();
        if !world.items.assign(unit.id(), self.item, &mut world.events).is_assigned() {
            return Err(FailureReason::ReservationRejected);
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let Some(item) = world.items.get(self.item) else {
            return Ok(());
        };
        let (at, kind, quantity) = (item.position(), item.kind(), item.quantity());
        if !approach(unit, at, world.tasks.interaction_range) {
            return Ok(());
        }
        unit.stop();

        let amount = quantity.min(unit.free_capacity());
        if amount == 0 || unit.add_item(kind, amount).is_err() {
            debug!(item = %self.item, agent = %unit.id(), "Pickup failed: inventory full");
            return Err(FailureReason::InventoryFull);
        }
        if let Some(item) = world.items.get_mut(self.item) {
            item.take(amount);
        }
        self.picked = self.picked.saturating_add(amount);
        debug!(item = %self.item, agent = %unit.id(), picked = amount, "Item picked up");

        if world.items.get(self.item).is_some_and(|i| i.quantity() == 0) {
            world.items.deregister(self.item, &mut world.events);
        }
        self.done = true;
        Ok(())
    }

    fn is_complete(&self, _unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(self.done || !world.items.contains(self.item))
    }

    fn cleanup(
        &mut self,
        agent: AgentId,
        _unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
        _outcome: TaskState,
    ) {
        let held = world
            .items
            .get(self.item)
            .is_some_and(|i| i.reservation().is_owned_by(agent));
        if held {
            world.items.release(self.item, &mut world.events);
        }
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.item)
    }
}

#[cfg(test)]
mod tests {
    use colony_types::ItemKind;

    use super::super::Task;
    use super::super::test_support::{run, unit_at, world};
    use super::*;

    fn owner_of(world: &WorldState, item: ResourceId) -> Option<AgentId> {
        world.items.get(item).and_then(|i| i.reservation().owner())
    }

    #[test]
    fn picks_up_whole_stack() {
        let mut world = world();
        let item = world.drop_item(ItemKind::Stone, 3, Position::new(2.0, 0.0));
        let Some(item) = item else { return };
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::pickup(item, Position::new(2.0, 0.0));
        assert_eq!(run(&mut task, &mut unit, &mut world, 10), TaskState::Completed);
        assert_eq!(unit.carried(ItemKind::Stone), 3);
        assert!(!world.items.contains(item));
    }

    #[test]
    fn partial_pickup_releases_reservation() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Wood, 5, Position::ORIGIN) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        unit.inventory = colony_agents::Inventory::new(2);
        let mut task = Task::pickup(item, Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(world.items.get(item).map(|i| i.quantity()), Some(3));
        assert_eq!(owner_of(&world, item), None);
    }

    #[test]
    fn full_inventory_fails_pickup() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Wood, 4, Position::ORIGIN) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        unit.inventory = colony_agents::Inventory::new(2);
        assert!(unit.inventory.add(ItemKind::Stone, 2).is_ok());
        let mut task = Task::pickup(item, Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Failed);
        assert_eq!(task.failure(), Some(FailureReason::InventoryFull));
        assert_eq!(unit.carried(ItemKind::Wood), 0);
        assert_eq!(world.items.get(item).map(|i| i.quantity()), Some(4));
        assert_eq!(owner_of(&world, item), None);
    }

    #[test]
    fn reserved_item_rejects_second_agent() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Wood, 1, Position::new(5.0, 0.0)) else {
            return;
        };
        let mut first = unit_at(0.0, 0.0);
        let mut second = unit_at(0.0, 0.0);
        let mut a = Task::pickup(item, Position::new(5.0, 0.0));
        let mut b = Task::pickup(item, Position::new(5.0, 0.0));
        assert_eq!(a.start(&mut first, &mut world), TaskState::InProgress);
        assert_eq!(owner_of(&world, item), Some(first.id));
        assert_eq!(b.start(&mut second, &mut world), TaskState::Failed);
        assert_eq!(b.failure(), Some(FailureReason::ReservationRejected));
        // The failed task must not have released the first reservation.
        assert_eq!(owner_of(&world, item), Some(first.id));
    }

    #[test]
    fn cancel_releases_reservation() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Wood, 1, Position::new(5.0, 0.0)) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::pickup(item, Position::new(5.0, 0.0));
        task.step(&mut unit, &mut world);
        assert_eq!(owner_of(&world, item), Some(unit.id));
        assert!(task.cancel(None, &mut world));
        assert_eq!(owner_of(&world, item), None);
    }
}
