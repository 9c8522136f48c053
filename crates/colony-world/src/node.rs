//! Harvest nodes: trees, rocks, and bushes that yield items when gathered.
//!
//! Gathering accumulates power; each time the accumulated power crosses
//! the node's per-unit threshold one unit is yielded. The node is depleted
//! once its remaining units reach zero.

use serde::{Deserialize, Serialize};

use colony_types::{ItemKind, Position, ResourceId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default gather power needed to yield one unit.
pub const DEFAULT_POWER_PER_UNIT: f32 = 4.0;

// ---------------------------------------------------------------------------
// ResourceNode
// ---------------------------------------------------------------------------

/// A harvestable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    id: ResourceId,
    position: Position,
    yields: ItemKind,
    remaining: u32,
    power_per_unit: f32,
    accumulated: f32,
}

impl ResourceNode {
    /// Create a node holding `units` of `yields`.
    pub fn new(yields: ItemKind, units: u32, position: Position) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            yields,
            remaining: units,
            power_per_unit: DEFAULT_POWER_PER_UNIT,
            accumulated: 0.0,
        }
    }

    /// Override the gather power needed per unit (clamped to a small
    /// positive minimum).
    #[must_use]
    pub fn with_power_per_unit(mut self, power: f32) -> Self {
        self.power_per_unit = if power > 0.01 { power } else { 0.01 };
        self
    }

    /// Stable identifier.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Where the node is.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The item kind this node yields.
    pub const fn yields(&self) -> ItemKind {
        self.yields
    }

    /// Units left.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether nothing is left to gather.
    pub const fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// Apply `power` gather power and return how many whole units dropped.
    pub fn apply_gather(&mut self, power: f32) -> u32 {
        if self.is_depleted() {
            return 0;
        }
        self.accumulated += power.max(0.0);
        let mut yielded: u32 = 0;
        while self.accumulated >= self.power_per_unit && self.remaining > 0 {
            self.accumulated -= self.power_per_unit;
            self.remaining = self.remaining.saturating_sub(1);
            yielded = yielded.saturating_add(1);
        }
        if self.is_depleted() {
            self.accumulated = 0.0;
        }
        yielded
    }
}
