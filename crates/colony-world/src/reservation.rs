//! Single-owner reservation slot shared by every resource provider.
//!
//! A [`ReservationHolder`] tracks two independent facts about a resource:
//!
//! - the **owner**: a long-lived assignment ("this bed belongs to X",
//!   "X is on its way to pick up this item");
//! - the **occupant**: short-lived active use ("X is sleeping right now",
//!   "X is working this station").
//!
//! The holder's methods are the only writers of those two fields. Every
//! operation is total: preconditions that do not hold produce `false` or
//! `None`, never a panic.

use serde::{Deserialize, Serialize};

/// Who may occupy a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyGate {
    /// Only the current owner may occupy (beds).
    OwnerOnly,
    /// Any consumer may occupy unless a different owner holds the resource
    /// (workstations, items).
    Open,
}

/// A consumer removed from active use of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction<T> {
    /// The consumer that stopped occupying.
    pub consumer: T,
    /// Whether occupancy ended before it completed.
    pub interrupted: bool,
    /// Whether the caller should apply the interruption penalty.
    pub penalize: bool,
}

/// Result of clearing an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRelease<T> {
    /// The consumer that owned the resource.
    pub previous_owner: T,
    /// Set when the owner was occupying at release time and got evicted.
    pub eviction: Option<Eviction<T>>,
}

/// Exclusive owner/occupant slot for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationHolder<T> {
    owner: Option<T>,
    occupant: Option<T>,
    gate: OccupancyGate,
    /// Ticks elapsed since the current occupancy started.
    occupied_ticks: u64,
}

impl<T: Copy + Eq> ReservationHolder<T> {
    /// Create an empty holder with the given occupancy gate.
    pub const fn new(gate: OccupancyGate) -> Self {
        Self {
            owner: None,
            occupant: None,
            gate,
            occupied_ticks: 0,
        }
    }

    /// The current owner, if any.
    pub const fn owner(&self) -> Option<T> {
        self.owner
    }

    /// The current occupant, if any.
    pub const fn occupant(&self) -> Option<T> {
        self.occupant
    }

    /// The occupancy gate this holder enforces.
    pub const fn gate(&self) -> OccupancyGate {
        self.gate
    }

    /// Whether `consumer` is the owner.
    pub fn is_owned_by(&self, consumer: T) -> bool {
        self.owner == Some(consumer)
    }

    /// Whether anyone occupies the resource.
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Whether `consumer` occupies the resource.
    pub fn is_occupied_by(&self, consumer: T) -> bool {
        self.occupant == Some(consumer)
    }

    /// Ticks elapsed in the current occupancy (0 when unoccupied).
    pub const fn occupied_ticks(&self) -> u64 {
        self.occupied_ticks
    }

    /// Make `consumer` the owner.
    ///
    /// Fails if a different consumer already owns the resource. Assigning
    /// the current owner again succeeds without changing anything. Keeping
    /// a consumer to one resource per registry is the registry's job.
    pub fn assign_owner(&mut self, consumer: T) -> bool {
        match self.owner {
            Some(current) if current != consumer => false,
            _ => {
                self.owner = Some(consumer);
                true
            }
        }
    }

    /// Clear the owner.
    ///
    /// Returns `None` when there was no owner. If the owner is occupying
    /// the resource, occupancy is ended first as an interruption with
    /// penalty, so no occupancy outlives the ownership it depends on.
    pub fn release_owner(&mut self) -> Option<OwnerRelease<T>> {
        let previous_owner = self.owner?;
        let eviction = if self.occupant == Some(previous_owner) {
            self.end_occupancy(true, true)
        } else {
            None
        };
        self.owner = None;
        Some(OwnerRelease {
            previous_owner,
            eviction,
        })
    }

    /// Start active use by `consumer`.
    ///
    /// Fails if the resource is already occupied, if `usable` is false
    /// (e.g. construction incomplete), or if ownership rules forbid it:
    /// with [`OccupancyGate::OwnerOnly`] the consumer must be the owner;
    /// with [`OccupancyGate::Open`] a different owner blocks the consumer.
    pub fn start_occupancy(&mut self, consumer: T, usable: bool) -> bool {
        if self.occupant.is_some() || !usable {
            return false;
        }
        let allowed = match self.gate {
            OccupancyGate::OwnerOnly => self.owner == Some(consumer),
            OccupancyGate::Open => self.owner.is_none_or(|owner| owner == consumer),
        };
        if !allowed {
            return false;
        }
        self.occupant = Some(consumer);
        self.occupied_ticks = 0;
        true
    }

    /// Advance the occupancy timer by one tick and return the new count.
    ///
    /// Does nothing and returns 0 when unoccupied.
    pub const fn tick_occupancy(&mut self) -> u64 {
        if self.occupant.is_none() {
            return 0;
        }
        self.occupied_ticks = self.occupied_ticks.saturating_add(1);
        self.occupied_ticks
    }

    /// End active use.
    ///
    /// Safe to call when unoccupied (returns `None`). The returned
    /// [`Eviction`] tells the caller whether to penalise the consumer; the
    /// holder never touches the consumer itself, so a consumer that is
    /// being destroyed is never dereferenced here.
    pub fn end_occupancy(&mut self, interrupted: bool, penalty: bool) -> Option<Eviction<T>> {
        let Some(consumer) = self.occupant else {
            return None;
        };
        self.occupant = None;
        self.occupied_ticks = 0;
        Some(Eviction {
            consumer,
            interrupted,
            penalize: interrupted && penalty,
        })
    }
}
