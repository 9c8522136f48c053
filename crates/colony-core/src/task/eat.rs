//! Eat one unit of food, either from the ground or from the inventory.
//!
//! Nutrition is applied exactly once, guarded by the `eaten` flag.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{AgentId, FailureReason, Position, ResourceId, TaskState};
use colony_world::Reservable;

use super::{TaskStep, approach};
use crate::world::WorldState;

/// Where the food comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodSource {
    /// A reserved food item on the ground.
    Ground(ResourceId),
    /// Food the unit already carries.
    Carried,
}

/// Eat task state.
#[derive(Debug, Clone, PartialEq)]
pub struct Eat {
    source: FoodSource,
    at: Position,
    eaten: bool,
}

impl Eat {
    /// Eat from food item `item`.
    pub const fn ground(item: ResourceId, at: Position) -> Self {
        Self {
            source: FoodSource::Ground(item),
            at,
            eaten: false,
        }
    }

    /// Eat carried food.
    pub const fn carried() -> Self {
        Self {
            source: FoodSource::Carried,
            at: Position::ORIGIN,
            eaten: false,
        }
    }

    /// Where the food comes from.
    pub const fn source(&self) -> FoodSource {
        self.source
    }

    /// Whether the one-shot meal has happened.
    pub const fn has_eaten(&self) -> bool {
        self.eaten
    }

    fn eat_from_ground(&mut self, item_id: ResourceId, unit: &mut dyn Unit, world: &mut WorldState) {
        let Some(item) = world.items.get(item_id) else {
            return;
        };
        let (at, nutrition) = (item.position(), item.kind().nutrition().unwrap_or(0));
        if !approach(unit, at, world.tasks.interaction_range) {
            return;
        }
        unit.stop();
        if world.items.get_mut(item_id).map_or(0, |i| i.take(1)) == 0 {
            return;
        }
        unit.eat(nutrition);
        self.eaten = true;
        debug!(item = %item_id, agent = %unit.id(), nutrition, "Ate from the ground");

        if world.items.get(item_id).is_some_and(|i| i.quantity() == 0) {
            world.items.deregister(item_id, &mut world.events);
        } else {
            world.items.release(item_id, &mut world.events);
        }
    }

    fn eat_carried(&mut self, unit: &mut dyn Unit) {
        let Some(food) = unit.carried_food() else {
            return;
        };
        if unit.remove_item(food, 1).is_ok() {
            let nutrition = food.nutrition().unwrap_or(0);
            unit.eat(nutrition);
            self.eaten = true;
            debug!(agent = %unit.id(), item = %food, nutrition, "Ate carried food");
        }
    }
}

impl TaskStep for Eat {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        match self.source {
            FoodSource::Ground(item_id) => {
                let Some(item) = world.items.get(item_id) else {
                    return Err(FailureReason::TargetMissing);
                };
                if !item.is_food() {
                    return Err(FailureReason::ReservationRejected);
                }
                self.at = item.position();
                if !world.items.assign(unit.id(), item_id, &mut world.events).is_assigned() {
                    return Err(FailureReason::ReservationRejected);
                }
            }
            FoodSource::Carried => {
                if unit.carried_food().is_none() {
                    return Err(FailureReason::TargetMissing);
                }
                self.at = unit.position();
            }
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        if self.eaten {
            return Ok(());
        }
        match self.source {
            FoodSource::Ground(item_id) => self.eat_from_ground(item_id, unit, world),
            FoodSource::Carried => self.eat_carried(unit),
        }
        Ok(())
    }

    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        if self.eaten {
            return Ok(true);
        }
        Ok(match self.source {
            FoodSource::Ground(item_id) => !world.items.contains(item_id),
            FoodSource::Carried => unit.carried_food().is_none(),
        })
    }

    fn cleanup(
        &mut self,
        agent: AgentId,
        _unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
        _outcome: TaskState,
    ) {
        if let FoodSource::Ground(item_id) = self.source {
            let held = world
                .items
                .get(item_id)
                .is_some_and(|i| i.reservation().is_owned_by(agent));
            if held {
                world.items.release(item_id, &mut world.events);
            }
        }
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        match self.source {
            FoodSource::Ground(item) => Some(item),
            FoodSource::Carried => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use colony_types::ItemKind;

    use super::super::Task;
    use super::super::test_support::{run, unit_at, world};
    use super::*;

    #[test]
    fn eats_exactly_once() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Berries, 3, Position::new(1.0, 0.0)) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        unit.hunger = 70;
        let mut task = Task::eat(item, Position::new(1.0, 0.0));
        assert_eq!(run(&mut task, &mut unit, &mut world, 10), TaskState::Completed);
        assert_eq!(unit.hunger, 50);
        assert_eq!(world.items.get(item).map(|i| i.quantity()), Some(2));
        assert_eq!(world.items.get(item).and_then(|i| i.reservation().owner()), None);
    }

    #[test]
    fn last_portion_removes_item() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Meal, 1, Position::ORIGIN) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        unit.hunger = 80;
        let mut task = Task::eat(item, Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(unit.hunger, 30);
        assert!(!world.items.contains(item));
    }

    #[test]
    fn inedible_item_is_rejected() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Stone, 1, Position::ORIGIN) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::eat(item, Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Failed);
        assert_eq!(task.failure(), Some(FailureReason::ReservationRejected));
    }

    #[test]
    fn vanished_food_completes_without_eating() {
        let mut world = world();
        let Some(item) = world.drop_item(ItemKind::Berries, 1, Position::new(9.0, 0.0)) else {
            return;
        };
        let mut unit = unit_at(0.0, 0.0);
        unit.hunger = 70;
        let mut task = Task::eat(item, Position::new(9.0, 0.0));
        task.step(&mut unit, &mut world);
        world.items.deregister(item, &mut world.events);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(unit.hunger, 70);
    }

    #[test]
    fn eats_carried_food() {
        let mut world = world();
        let mut unit = unit_at(0.0, 0.0);
        unit.hunger = 60;
        assert!(unit.add_item(ItemKind::Berries, 2).is_ok());
        let mut task = Task::eat_carried();
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(unit.hunger, 40);
        assert_eq!(unit.carried(ItemKind::Berries), 1);

        let mut empty = unit_at(0.0, 0.0);
        let mut task = Task::eat_carried();
        assert_eq!(task.step(&mut empty, &mut world), TaskState::Failed);
    }
}
