//! Beds: ownership-gated sleeping slots.
//!
//! A bed is assigned to one owner for the long term. Only that owner may
//! sleep in it. Sleeping runs a fixed-length timer driven by
//! [`Bed::advance_sleep`].

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, Position, ResourceId, ResourceKind};

use crate::provider::Reservable;
use crate::reservation::{Eviction, OccupancyGate, ReservationHolder};

/// Default number of ticks a full night's sleep takes.
pub const DEFAULT_SLEEP_TICKS: u64 = 40;

/// A sleeping slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    id: ResourceId,
    position: Position,
    built: bool,
    sleep_ticks: u64,
    reservation: ReservationHolder<AgentId>,
}

impl Bed {
    /// Create a finished bed at `position`.
    pub fn new(position: Position, sleep_ticks: u64) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            built: true,
            sleep_ticks,
            reservation: ReservationHolder::new(OccupancyGate::OwnerOnly),
        }
    }

    /// Create a bed that still needs construction before anyone can use it.
    pub fn unbuilt(position: Position, sleep_ticks: u64) -> Self {
        Self {
            built: false,
            ..Self::new(position, sleep_ticks)
        }
    }

    /// Whether construction has finished.
    pub const fn is_built(&self) -> bool {
        self.built
    }

    /// Ticks a full sleep takes in this bed.
    pub const fn sleep_ticks(&self) -> u64 {
        self.sleep_ticks
    }

    /// Whether `consumer` is currently asleep here.
    pub fn is_sleeping(&self, consumer: AgentId) -> bool {
        self.reservation.is_occupied_by(consumer)
    }

    /// Put the owner to sleep. Fails for non-owners, unbuilt beds, or a
    /// bed already in use.
    pub fn start_sleep(&mut self, consumer: AgentId) -> bool {
        self.reservation.start_occupancy(consumer, self.built)
    }

    /// Advance the sleep timer. Returns `true` once the sleep is complete.
    pub fn advance_sleep(&mut self) -> bool {
        self.reservation.tick_occupancy() >= self.sleep_ticks && self.reservation.is_occupied()
    }

    /// Wake whoever is sleeping. `interrupted` marks an early wake-up; with
    /// `penalty` the returned eviction asks the caller to apply the morale
    /// cost.
    pub fn end_sleep(&mut self, interrupted: bool, penalty: bool) -> Option<Eviction<AgentId>> {
        self.reservation.end_occupancy(interrupted, penalty)
    }
}

impl Reservable for Bed {
    const KIND: ResourceKind = ResourceKind::Bed;

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
        self.built
    }

    fn complete_construction(&mut self) -> bool {
        let changed = !self.built;
        self.built = true;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_can_sleep() {
        let mut bed = Bed::new(Position::ORIGIN, 3);
        let owner = AgentId::new();
        let stranger = AgentId::new();

        assert!(!bed.start_sleep(owner));
        assert!(bed.reservation_mut().assign_owner(owner));
        assert!(!bed.start_sleep(stranger));
        assert!(bed.start_sleep(owner));
        assert!(bed.is_sleeping(owner));
    }

    #[test]
    fn unbuilt_bed_rejects_sleep() {
        let mut bed = Bed::unbuilt(Position::ORIGIN, 3);
        let owner = AgentId::new();
        assert!(bed.reservation_mut().assign_owner(owner));
        assert!(!bed.is_available());
        assert!(!bed.start_sleep(owner));

        assert!(bed.complete_construction());
        assert!(!bed.complete_construction());
        assert!(bed.start_sleep(owner));
    }

    #[test]
    fn sleep_timer_completes() {
        let mut bed = Bed::new(Position::ORIGIN, 3);
        let owner = AgentId::new();
        assert!(bed.reservation_mut().assign_owner(owner));
        assert!(bed.start_sleep(owner));

        assert!(!bed.advance_sleep());
        assert!(!bed.advance_sleep());
        assert!(bed.advance_sleep());

        let eviction = bed.end_sleep(false, true);
        assert_eq!(eviction.map(|e| e.penalize), Some(false));
        assert!(!bed.is_sleeping(owner));
    }

    #[test]
    fn advance_without_sleeper_never_completes() {
        let mut bed = Bed::new(Position::ORIGIN, 0);
        assert!(!bed.advance_sleep());
    }
}
