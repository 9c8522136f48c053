//! Bed registry specialisation and the homeless penalty.
//!
//! Consumers without a bed are not in an error state; they simply accrue
//! a periodic morale penalty until a bed frees up or gets built.

use serde::{Deserialize, Serialize};

use colony_types::AgentId;

use crate::bed::Bed;
use crate::registry::ResourceRegistry;

/// Registry of beds.
pub type BedRegistry = ResourceRegistry<Bed>;

/// How often and how hard unhoused consumers are penalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomelessPolicy {
    /// Morale removed per penalty tick.
    pub penalty: u32,
    /// Ticks between penalties. Zero disables the penalty.
    pub interval_ticks: u64,
}

impl Default for HomelessPolicy {
    fn default() -> Self {
        Self {
            penalty: 2,
            interval_ticks: 20,
        }
    }
}

impl HomelessPolicy {
    /// Whether `tick` is a penalty tick.
    pub const fn is_due(&self, tick: u64) -> bool {
        if self.penalty == 0 || tick == 0 {
            return false;
        }
        matches!(tick.checked_rem(self.interval_ticks), Some(0))
    }

    /// Consumers to penalise at `tick`, in join order. Empty on non-penalty
    /// ticks.
    pub fn penalized(&self, beds: &BedRegistry, tick: u64) -> Vec<AgentId> {
        if self.is_due(tick) {
            beds.unmatched_consumers()
        } else {
            Vec::new()
        }
    }
}
