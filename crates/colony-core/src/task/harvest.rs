//! Gather from a harvest node into the unit's inventory.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{FailureReason, Position, ResourceId};

use super::{TaskStep, WorkTimer, approach};
use crate::world::WorldState;

/// Harvest task state.
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    node: ResourceId,
    at: Position,
    timer: WorkTimer,
    gathered: u32,
}

impl Harvest {
    /// Gather from `node`.
    pub const fn new(node: ResourceId, at: Position) -> Self {
        Self {
            node,
            at,
            timer: WorkTimer::new(),
            gathered: 0,
        }
    }

    /// Units moved into the inventory so far.
    pub const fn gathered(&self) -> u32 {
        self.gathered
    }
}

impl TaskStep for Harvest {
    fn start(&mut self, _unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        if world.node(self.node).is_none() {
            return Err(FailureReason::TargetMissing);
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let Some(node) = world.node(self.node) else {
            return Ok(());
        };
        if node.is_depleted() {
            return Ok(());
        }
        let (at, kind) = (node.position(), node.yields());
        if !approach(unit, at, world.tasks.harvest_range) {
            return Ok(());
        }
        unit.stop();
        if !self.timer.tick(world.tasks.harvest_interval) {
            return Ok(());
        }

        let power = unit.gather_power();
        let yielded = world.node_mut(self.node).map_or(0, |n| n.apply_gather(power));
        if yielded == 0 {
            return Ok(());
        }
        let kept = yielded.min(unit.free_capacity());
        if kept > 0 && unit.add_item(kind, kept).is_ok() {
            self.gathered = self.gathered.saturating_add(kept);
        }
        // Whatever did not fit lands on the ground next to the node.
        let spilled = yielded.saturating_sub(kept);
        world.drop_item(kind, spilled, at);
        debug!(node = %self.node, agent = %unit.id(), item = %kind, kept, spilled, "Harvested");
        Ok(())
    }

    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(unit.is_inventory_full() || world.node(self.node).is_none_or(|n| n.is_depleted()))
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.node)
    }
}

#[cfg(test)]
mod tests {
    use colony_types::{ItemKind, TaskState};
    use colony_world::ResourceNode;

    use super::super::Task;
    use super::super::test_support::{run, unit_at, world};
    use super::*;

    fn add_node(world: &mut WorldState, units: u32) -> ResourceId {
        let node = ResourceNode::new(ItemKind::Wood, units, Position::new(2.0, 0.0))
            .with_power_per_unit(1.0);
        let id = node.id();
        world.nodes.push(node);
        id
    }

    #[test]
    fn harvests_until_depleted() {
        let mut world = world();
        world.tasks.harvest_interval = 1;
        let node = add_node(&mut world, 3);
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::harvest(node, Position::new(2.0, 0.0));
        assert_eq!(run(&mut task, &mut unit, &mut world, 20), TaskState::Completed);
        assert_eq!(unit.carried(ItemKind::Wood), 3);
        assert!(world.node(node).is_some_and(ResourceNode::is_depleted));
    }

    #[test]
    fn stops_when_inventory_full_and_spills_excess() {
        let mut world = world();
        world.tasks.harvest_interval = 1;
        let node = add_node(&mut world, 10);
        let mut unit = unit_at(2.0, 0.0);
        unit.gather_power = 3.0;
        unit.inventory = colony_agents::Inventory::new(2);
        let mut task = Task::harvest(node, Position::new(2.0, 0.0));
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(unit.carried(ItemKind::Wood), 2);
        assert_eq!(world.items.len(), 1);
        assert_eq!(world.items.iter().map(|i| i.quantity()).sum::<u32>(), 1);
    }

    #[test]
    fn missing_node_fails_start() {
        let mut world = world();
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::harvest(ResourceId::new(), Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Failed);
        assert_eq!(task.failure(), Some(FailureReason::TargetMissing));
    }
}
