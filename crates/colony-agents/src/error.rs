//! Error types for the colony-agents crate.
//!
//! Inventory and vital operations return typed errors rather than
//! panicking. Callers in the task layer usually treat these as "the step
//! made no progress" and try again next tick.

use colony_types::{AgentId, ItemKind};

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Adding items would exceed the carry capacity.
    #[error("inventory overflow: adding {attempted} {item} would exceed capacity (current load: {current_load}, capacity: {capacity})")]
    InventoryOverflow {
        /// The item kind being added.
        item: ItemKind,
        /// The quantity the caller attempted to add.
        attempted: u32,
        /// The unit's current total load.
        current_load: u32,
        /// The unit's maximum carry capacity.
        capacity: u32,
    },

    /// Removing more of an item than the unit carries.
    #[error("insufficient items: wanted {requested} {item} but only have {available}")]
    InsufficientItems {
        /// The item kind being removed.
        item: ItemKind,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually carried.
        available: u32,
    },

    /// An arithmetic overflow occurred during a vital computation.
    #[error("arithmetic overflow in vital computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// No agent with the given ID exists.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Agent name already exists in the roster.
    #[error("duplicate agent name: {0}")]
    DuplicateName(String),
}
