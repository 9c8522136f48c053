//! The capability contract shared by reservable resource providers.

use colony_types::{AgentId, Position, ResourceId, ResourceKind};

use crate::reservation::ReservationHolder;

/// A resource that can be registered, looked up by position, and reserved
/// by exactly one consumer.
///
/// Registries and tasks depend only on this seam. Owner and occupant state
/// is reached through [`reservation`](Reservable::reservation) and mutated
/// only through the [`ReservationHolder`] methods.
pub trait Reservable {
    /// Category used in notifications.
    const KIND: ResourceKind;

    /// Stable identifier.
    fn id(&self) -> ResourceId;

    /// Where the resource sits.
    fn position(&self) -> Position;

    /// Read access to the reservation slot.
    fn reservation(&self) -> &ReservationHolder<AgentId>;

    /// Write access to the reservation slot.
    fn reservation_mut(&mut self) -> &mut ReservationHolder<AgentId>;

    /// Whether the facility is in a usable state (built, not depleted).
    fn is_usable(&self) -> bool;

    /// Whether a new consumer could be assigned right now.
    fn is_available(&self) -> bool {
        self.is_usable() && self.reservation().owner().is_none()
    }

    /// Finish construction of a facility registered unbuilt. Returns
    /// `true` if this changed anything. Providers without a build phase
    /// keep the default.
    fn complete_construction(&mut self) -> bool {
        false
    }
}
