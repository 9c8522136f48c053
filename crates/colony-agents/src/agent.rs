//! Unit state and the roster that owns it.
//!
//! [`UnitState`] is the reference [`Unit`]: a straight-line mover with an
//! inventory and vitals. [`AgentRoster`] keeps units in join order, which
//! is the order the tick drives them in, and enforces unique names.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, ItemKind, Position};

use crate::config::{AgentConfig, MAX_VITAL};
use crate::error::AgentError;
use crate::inventory::Inventory;
use crate::unit::{ARRIVAL_EPSILON, Unit};

/// Mutable state of one colonist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitState {
    /// Stable identifier.
    pub id: AgentId,
    /// Display name, unique within a roster.
    pub name: String,
    /// Current position.
    pub position: Position,
    /// Where the unit is heading, if anywhere.
    pub destination: Option<Position>,
    /// World units moved per tick.
    pub move_speed: f32,
    /// Work applied per tick.
    pub work_speed: f32,
    /// Gather power applied per tick.
    pub gather_power: f32,
    /// Carried items.
    pub inventory: Inventory,
    /// Hunger, 0 (sated) to 100 (starving).
    pub hunger: u32,
    /// Energy, 0 (exhausted) to 100.
    pub energy: u32,
    /// Health, 0 (dead) to 100.
    pub health: u32,
    /// Morale, 0 to 100.
    pub morale: u32,
    /// Ticks lived.
    pub age: u64,
}

impl UnitState {
    /// Create a unit at `position` with starting values from `config`.
    pub fn new(name: impl Into<String>, position: Position, config: &AgentConfig) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            position,
            destination: None,
            move_speed: config.move_speed,
            work_speed: config.work_speed,
            gather_power: config.gather_power,
            inventory: Inventory::new(config.carry_capacity),
            hunger: 0,
            energy: config.starting_energy.min(MAX_VITAL),
            health: config.starting_health.min(MAX_VITAL),
            morale: config.starting_morale.min(MAX_VITAL),
            age: 0,
        }
    }

    /// Advance one tick of movement towards the destination. Returns
    /// `true` if the unit moved.
    pub fn advance_movement(&mut self) -> bool {
        let Some(target) = self.destination else {
            return false;
        };
        if self.position.distance(target) <= ARRIVAL_EPSILON {
            return false;
        }
        self.position = self.position.step_towards(target, self.move_speed);
        true
    }

    /// Whether the unit has died.
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }
}

impl Unit for UnitState {
    fn id(&self) -> AgentId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn move_to(&mut self, target: Position) {
        if self.destination != Some(target) {
            self.destination = Some(target);
        }
    }

    fn has_arrived(&self) -> bool {
        self.destination
            .is_some_and(|target| self.position.distance(target) <= ARRIVAL_EPSILON)
    }

    fn stop(&mut self) {
        self.destination = None;
    }

    fn add_item(&mut self, item: ItemKind, quantity: u32) -> Result<(), AgentError> {
        self.inventory.add(item, quantity)
    }

    fn remove_item(&mut self, item: ItemKind, quantity: u32) -> Result<(), AgentError> {
        self.inventory.remove(item, quantity)
    }

    fn carried(&self, item: ItemKind) -> u32 {
        self.inventory.count(item)
    }

    fn take_all(&mut self) -> BTreeMap<ItemKind, u32> {
        self.inventory.take_all()
    }

    fn free_capacity(&self) -> u32 {
        self.inventory.free_capacity()
    }

    fn is_inventory_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    fn carried_food(&self) -> Option<ItemKind> {
        self.inventory.first_food()
    }

    fn work_speed(&self) -> f32 {
        self.work_speed
    }

    fn gather_power(&self) -> f32 {
        self.gather_power
    }

    fn hunger(&self) -> u32 {
        self.hunger
    }

    fn energy(&self) -> u32 {
        self.energy
    }

    fn morale(&self) -> u32 {
        self.morale
    }

    fn adjust_morale(&mut self, delta: i32) {
        let magnitude = delta.unsigned_abs();
        self.morale = if delta < 0 {
            self.morale.saturating_sub(magnitude)
        } else {
            self.morale.saturating_add(magnitude).min(MAX_VITAL)
        };
    }

    fn eat(&mut self, nutrition: u32) {
        self.hunger = self.hunger.saturating_sub(nutrition);
    }

    fn rest(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(MAX_VITAL);
    }
}

/// Units in join order, keyed by ID.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    units: BTreeMap<AgentId, UnitState>,
    order: Vec<AgentId>,
    names_in_use: BTreeSet<String>,
}

impl AgentRoster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            units: BTreeMap::new(),
            order: Vec::new(),
            names_in_use: BTreeSet::new(),
        }
    }

    /// Add a unit at the end of the join order.
    pub fn insert(&mut self, unit: UnitState) -> Result<AgentId, AgentError> {
        if self.names_in_use.contains(&unit.name) {
            return Err(AgentError::DuplicateName(unit.name));
        }
        let id = unit.id;
        self.names_in_use.insert(unit.name.clone());
        self.order.push(id);
        self.units.insert(id, unit);
        Ok(id)
    }

    /// Remove a unit, returning its final state.
    pub fn remove(&mut self, id: AgentId) -> Result<UnitState, AgentError> {
        let unit = self.units.remove(&id).ok_or(AgentError::AgentNotFound(id))?;
        self.order.retain(|a| *a != id);
        self.names_in_use.remove(&unit.name);
        Ok(unit)
    }

    /// Whether a unit with this ID exists.
    pub fn contains(&self, id: AgentId) -> bool {
        self.units.contains_key(&id)
    }

    /// Look up a unit.
    pub fn get(&self, id: AgentId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    /// Look up a unit mutably.
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    /// IDs in join order.
    pub fn ids(&self) -> &[AgentId] {
        &self.order
    }

    /// Units in join order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.order.iter().filter_map(|id| self.units.get(id))
    }

    /// Whether `name` is taken.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names_in_use.contains(name)
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
