//! Loose items lying on the ground, reservable for pickup.

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, ItemKind, Position, ResourceId, ResourceKind};

use crate::provider::Reservable;
use crate::reservation::{OccupancyGate, ReservationHolder};

/// A stack of items on the ground.
///
/// The reservation owner is the agent that has claimed the stack for
/// pickup; nobody else may claim it until the owner releases it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppableItem {
    id: ResourceId,
    position: Position,
    kind: ItemKind,
    quantity: u32,
    reservation: ReservationHolder<AgentId>,
}

impl DroppableItem {
    /// Create a stack of `quantity` items of `kind` at `position`.
    pub fn new(kind: ItemKind, quantity: u32, position: Position) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            kind,
            quantity,
            reservation: ReservationHolder::new(OccupancyGate::Open),
        }
    }

    /// The item kind.
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Units left in the stack.
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the item can be eaten.
    pub const fn is_food(&self) -> bool {
        self.kind.is_food()
    }

    /// Remove up to `amount` units from the stack, returning how many
    /// were taken.
    pub fn take(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.quantity);
        self.quantity = self.quantity.saturating_sub(taken);
        taken
    }
}

impl Reservable for DroppableItem {
    const KIND: ResourceKind = ResourceKind::Item;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn reservation(&self) -> &ReservationHolder<AgentId> {
        &self.reservation
    }

    fn reservation_mut(&mut self) -> &mut ReservationHolder<AgentId> {
        &mut self.reservation
    }

    fn is_usable(&self) -> bool {
        self.quantity > 0
    }
}
