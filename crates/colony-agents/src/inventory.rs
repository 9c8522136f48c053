//! Carried items with a capacity limit.
//!
//! Quantities are kept in a `BTreeMap` so iteration order (and therefore
//! delivery order and log output) is deterministic. All arithmetic is
//! checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::ItemKind;

use crate::error::AgentError;

/// Items carried by a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    capacity: u32,
    items: BTreeMap<ItemKind, u32>,
}

impl Inventory {
    /// Create an empty inventory holding at most `capacity` items.
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            items: BTreeMap::new(),
        }
    }

    /// Maximum number of items.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Sum of all quantities. Saturates rather than overflowing.
    pub fn load(&self) -> u32 {
        self.items.values().fold(0_u32, |acc, qty| acc.saturating_add(*qty))
    }

    /// Room left before the inventory is full.
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.load())
    }

    /// Whether nothing more fits.
    pub fn is_full(&self) -> bool {
        self.free_capacity() == 0
    }

    /// Whether nothing is carried.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of `item` carried.
    pub fn count(&self, item: ItemKind) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Read-only view of all carried items.
    pub const fn items(&self) -> &BTreeMap<ItemKind, u32> {
        &self.items
    }

    /// First carried food item, if any. Meals sort after berries, so this
    /// prefers the cheaper food.
    pub fn first_food(&self) -> Option<ItemKind> {
        self.items.keys().copied().find(|k| k.is_food())
    }

    /// Add `amount` units of `item`.
    ///
    /// Fails without changing anything if the result would exceed capacity.
    pub fn add(&mut self, item: ItemKind, amount: u32) -> Result<(), AgentError> {
        let current_load = self.load();
        let fits = current_load
            .checked_add(amount)
            .is_some_and(|new_load| new_load <= self.capacity);
        if !fits {
            return Err(AgentError::InventoryOverflow {
                item,
                attempted: amount,
                current_load,
                capacity: self.capacity,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        let entry = self.items.entry(item).or_insert(0);
        *entry = entry.checked_add(amount).ok_or_else(|| AgentError::ArithmeticOverflow {
            context: String::from("item quantity overflow"),
        })?;
        Ok(())
    }

    /// Remove `amount` units of `item`. The entry disappears at zero.
    pub fn remove(&mut self, item: ItemKind, amount: u32) -> Result<(), AgentError> {
        let current = self.count(item);
        let remaining = current.checked_sub(amount).ok_or(AgentError::InsufficientItems {
            item,
            requested: amount,
            available: current,
        })?;

        if remaining == 0 {
            self.items.remove(&item);
        } else {
            self.items.insert(item, remaining);
        }
        Ok(())
    }

    /// Empty the inventory, returning everything that was carried.
    pub fn take_all(&mut self) -> BTreeMap<ItemKind, u32> {
        core::mem::take(&mut self.items)
    }
}
