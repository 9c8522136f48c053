//! Stockpiles that accept deliveries of any item kind up to a capacity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use colony_types::{ItemKind, Position, ResourceId};

/// A stockpile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    id: ResourceId,
    position: Position,
    capacity: u32,
    contents: BTreeMap<ItemKind, u32>,
}

impl Storage {
    /// Create an empty stockpile holding at most `capacity` units.
    pub fn new(position: Position, capacity: u32) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            capacity,
            contents: BTreeMap::new(),
        }
    }

    /// Stable identifier.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Where the stockpile is.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Units stored across all kinds.
    pub fn stored(&self) -> u32 {
        self.contents
            .values()
            .fold(0_u32, |acc, qty| acc.saturating_add(*qty))
    }

    /// Units of `kind` stored.
    pub fn count(&self, kind: ItemKind) -> u32 {
        self.contents.get(&kind).copied().unwrap_or(0)
    }

    /// Room left.
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.stored())
    }

    /// Whether no more units fit.
    pub fn is_full(&self) -> bool {
        self.free_capacity() == 0
    }

    /// Store up to `quantity` units of `kind`; returns how many were accepted.
    pub fn deposit(&mut self, kind: ItemKind, quantity: u32) -> u32 {
        let accepted = quantity.min(self.free_capacity());
        if accepted > 0 {
            let entry = self.contents.entry(kind).or_insert(0);
            *entry = entry.saturating_add(accepted);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_respects_capacity() {
        let mut storage = Storage::new(Position::ORIGIN, 5);
        assert_eq!(storage.deposit(ItemKind::Wood, 3), 3);
        assert_eq!(storage.deposit(ItemKind::Stone, 4), 2);
        assert!(storage.is_full());
        assert_eq!(storage.deposit(ItemKind::Wood, 1), 0);
        assert_eq!(storage.count(ItemKind::Wood), 3);
        assert_eq!(storage.stored(), 5);
    }
}
