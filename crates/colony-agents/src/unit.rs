//! The capability contract tasks use to drive a unit.
//!
//! Tasks never see a concrete agent type. Movement, inventory, and vitals
//! are reached through [`Unit`], so tests can drive tasks with scripted
//! units and the engine can swap in a pathfinding mover later.

use std::collections::BTreeMap;

use colony_types::{AgentId, ItemKind, Position};

use crate::error::AgentError;

/// Distance below which a unit counts as standing on its target.
pub const ARRIVAL_EPSILON: f32 = 0.05;

/// What a task may ask of the unit executing it.
pub trait Unit {
    /// Stable identifier.
    fn id(&self) -> AgentId;

    /// Current position.
    fn position(&self) -> Position;

    /// Head towards `target`. Calling again with the same target is a
    /// no-op; a new target replaces the old one.
    fn move_to(&mut self, target: Position);

    /// Whether the last requested destination has been reached.
    fn has_arrived(&self) -> bool;

    /// Drop the current destination.
    fn stop(&mut self);

    /// Whether the unit stands within `radius` of `target`.
    fn is_near(&self, target: Position, radius: f32) -> bool {
        self.position().distance(target) <= radius.max(ARRIVAL_EPSILON)
    }

    /// Add carried items. Fails without change if they do not fit.
    fn add_item(&mut self, item: ItemKind, quantity: u32) -> Result<(), AgentError>;

    /// Remove carried items.
    fn remove_item(&mut self, item: ItemKind, quantity: u32) -> Result<(), AgentError>;

    /// Quantity of `item` carried.
    fn carried(&self, item: ItemKind) -> u32;

    /// Empty the inventory, returning its contents.
    fn take_all(&mut self) -> BTreeMap<ItemKind, u32>;

    /// Room left in the inventory.
    fn free_capacity(&self) -> u32;

    /// Whether nothing more fits.
    fn is_inventory_full(&self) -> bool {
        self.free_capacity() == 0
    }

    /// Whether nothing is carried.
    fn is_inventory_empty(&self) -> bool;

    /// First carried food item, if any.
    fn carried_food(&self) -> Option<ItemKind>;

    /// Work applied per tick at sites and workstations.
    fn work_speed(&self) -> f32;

    /// Gather power applied per tick at harvest nodes.
    fn gather_power(&self) -> f32;

    /// Current hunger (0 = sated).
    fn hunger(&self) -> u32;

    /// Current energy (0 = exhausted).
    fn energy(&self) -> u32;

    /// Current morale.
    fn morale(&self) -> u32;

    /// Shift morale by `delta`, clamped to the vital range.
    fn adjust_morale(&mut self, delta: i32);

    /// Reduce hunger by `nutrition`.
    fn eat(&mut self, nutrition: u32);

    /// Recover `amount` energy.
    fn rest(&mut self, amount: u32);
}
