//! Catalogue of resource providers of one kind, with consumer matching.
//!
//! A [`ResourceRegistry`] owns every provider of one kind in registration
//! order, the consumers it knows about in join order, and a
//! consumer -> resource map. Every mutating operation keeps the map and
//! the providers' owner fields in lock-step, which is what
//! [`ResourceRegistry::check_invariants`] verifies.
//!
//! With `auto_assign` enabled (beds), a consumer joining or a resource
//! being registered immediately pairs the first unmatched consumer with
//! the first available resource. Matching happens synchronously inside
//! the triggering call, never deferred.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use colony_types::{AgentId, Notification, Position, ResourceId};

use crate::error::WorldError;
use crate::events::NotificationQueue;
use crate::provider::Reservable;
use crate::reservation::{OccupancyGate, OwnerRelease};

/// A resource removed from a registry, with whatever reservation it held.
#[derive(Debug)]
pub struct Deregistered<R> {
    /// The removed provider.
    pub resource: R,
    /// The owner it had, if any, and any eviction that caused.
    pub release: Option<OwnerRelease<AgentId>>,
}

/// Outcome of [`ResourceRegistry::assign`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The consumer now owns the resource.
    Assigned {
        /// The reservation the consumer gave up to take this one, with any
        /// eviction that caused.
        previous: Option<OwnerRelease<AgentId>>,
    },
    /// The resource is unknown, owned by someone else, or unusable.
    Rejected,
}

impl Assignment {
    /// Whether the consumer ended up owning the resource.
    pub const fn is_assigned(&self) -> bool {
        matches!(self, Self::Assigned { .. })
    }

    /// The reservation released to make room, if any.
    pub const fn previous(&self) -> Option<OwnerRelease<AgentId>> {
        match *self {
            Self::Assigned { previous } => previous,
            Self::Rejected => None,
        }
    }
}

/// Providers of one kind plus the consumer -> resource assignment map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRegistry<R> {
    resources: Vec<R>,
    consumers: Vec<AgentId>,
    assignments: BTreeMap<AgentId, ResourceId>,
    auto_assign: bool,
}

impl<R: Reservable> Default for ResourceRegistry<R> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<R: Reservable> ResourceRegistry<R> {
    /// Create an empty registry.
    pub const fn new(auto_assign: bool) -> Self {
        Self {
            resources: Vec::new(),
            consumers: Vec::new(),
            assignments: BTreeMap::new(),
            auto_assign,
        }
    }

    /// Whether consumers are matched to resources automatically.
    pub const fn auto_assign(&self) -> bool {
        self.auto_assign
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Add a provider. Registering an ID twice is a no-op returning `false`.
    pub fn register(&mut self, resource: R, events: &mut NotificationQueue) -> bool {
        let id = resource.id();
        if self.contains(id) {
            return false;
        }
        self.resources.push(resource);
        events.push(Notification::ResourceRegistered {
            resource: id,
            kind: R::KIND,
        });
        debug!(resource = %id, kind = %R::KIND, "Resource registered");

        if self.auto_assign {
            if let Some(consumer) = self.find_unmatched_consumer() {
                let _ = self.assign(consumer, id, events);
            }
        }
        true
    }

    /// Remove a provider, releasing its owner first.
    ///
    /// Returns `None` if the ID is unknown, so deregistering twice is a
    /// no-op. The released owner becomes unmatched; with `auto_assign`
    /// another free resource may be given to them immediately.
    pub fn deregister(
        &mut self,
        id: ResourceId,
        events: &mut NotificationQueue,
    ) -> Option<Deregistered<R>> {
        let index = self.resources.iter().position(|r| r.id() == id)?;
        let release = self.release(id, events);
        let resource = self.resources.remove(index);
        events.push(Notification::ResourceUnregistered {
            resource: id,
            kind: R::KIND,
        });
        debug!(resource = %id, kind = %R::KIND, "Resource deregistered");

        if self.auto_assign {
            self.match_unassigned(events);
        }
        Some(Deregistered { resource, release })
    }

    /// Finish construction of a registered facility and offer it to
    /// unmatched consumers. Returns `false` if the ID is unknown or the
    /// facility was already built.
    pub fn complete_construction(&mut self, id: ResourceId, events: &mut NotificationQueue) -> bool {
        let changed = self
            .get_mut(id)
            .is_some_and(Reservable::complete_construction);
        if changed && self.auto_assign {
            self.match_unassigned(events);
        }
        changed
    }

    /// Whether a provider with this ID is registered.
    pub fn contains(&self, id: ResourceId) -> bool {
        self.resources.iter().any(|r| r.id() == id)
    }

    /// Look up a provider.
    pub fn get(&self, id: ResourceId) -> Option<&R> {
        self.resources.iter().find(|r| r.id() == id)
    }

    /// Look up a provider for mutation.
    ///
    /// Ownership must still go through [`assign`](Self::assign) and
    /// [`release`](Self::release) so the consumer map stays in sync.
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut R> {
        self.resources.iter_mut().find(|r| r.id() == id)
    }

    /// Providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.resources.iter()
    }

    /// Providers in registration order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.resources.iter_mut()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    // -----------------------------------------------------------------------
    // Consumers
    // -----------------------------------------------------------------------

    /// Record a consumer as live. With `auto_assign`, an unmatched consumer
    /// is immediately given the first available resource; the ID of that
    /// resource is returned.
    pub fn add_consumer(
        &mut self,
        consumer: AgentId,
        events: &mut NotificationQueue,
    ) -> Option<ResourceId> {
        if !self.consumers.contains(&consumer) {
            self.consumers.push(consumer);
        }
        if !self.auto_assign || self.assignments.contains_key(&consumer) {
            return None;
        }
        let id = self.first_available()?;
        self.assign(consumer, id, events).is_assigned().then_some(id)
    }

    /// Forget a consumer (death, disconnect) and release its reservation.
    ///
    /// The freed resource is offered to the next unmatched consumer when
    /// `auto_assign` is on. Safe to call for unknown consumers.
    pub fn remove_consumer(
        &mut self,
        consumer: AgentId,
        events: &mut NotificationQueue,
    ) -> Option<OwnerRelease<AgentId>> {
        self.consumers.retain(|c| *c != consumer);
        let release = self.release_consumer(consumer, events);
        if release.is_some() && self.auto_assign {
            self.match_unassigned(events);
        }
        release
    }

    /// Known consumers in join order.
    pub fn consumers(&self) -> &[AgentId] {
        &self.consumers
    }

    /// First known consumer without a reservation in this registry.
    pub fn find_unmatched_consumer(&self) -> Option<AgentId> {
        self.consumers
            .iter()
            .copied()
            .find(|c| !self.assignments.contains_key(c))
    }

    /// Every known consumer without a reservation, in join order.
    pub fn unmatched_consumers(&self) -> Vec<AgentId> {
        self.consumers
            .iter()
            .copied()
            .filter(|c| !self.assignments.contains_key(c))
            .collect()
    }

    /// The resource `consumer` owns in this registry.
    pub fn resource_of(&self, consumer: AgentId) -> Option<ResourceId> {
        self.assignments.get(&consumer).copied()
    }

    // -----------------------------------------------------------------------
    // Reservations
    // -----------------------------------------------------------------------

    /// Make `consumer` the owner of resource `id`.
    ///
    /// Fails if the resource is unknown, owned by someone else, or not
    /// usable. Re-assigning the current owner succeeds. A consumer holding
    /// a different resource of this registry has that reservation released
    /// first, so each consumer owns at most one resource here. That release
    /// is handed back in [`Assignment::Assigned`]; the caller applies any
    /// eviction it carries.
    pub fn assign(&mut self, consumer: AgentId, id: ResourceId, events: &mut NotificationQueue) -> Assignment {
        let Some(resource) = self.get(id) else {
            return Assignment::Rejected;
        };
        if resource.reservation().is_owned_by(consumer) {
            return Assignment::Assigned { previous: None };
        }
        if !resource.is_available() {
            return Assignment::Rejected;
        }

        let previous = self
            .assignments
            .get(&consumer)
            .copied()
            .and_then(|held| self.release(held, events));

        let assigned = self
            .get_mut(id)
            .is_some_and(|r| r.reservation_mut().assign_owner(consumer));
        if !assigned {
            warn!(resource = %id, consumer = %consumer, "Assignment rejected by reservation holder");
            return Assignment::Rejected;
        }
        self.assignments.insert(consumer, id);
        events.push(Notification::ReservationAssigned {
            resource: id,
            consumer,
        });
        debug!(resource = %id, consumer = %consumer, kind = %R::KIND, "Reservation assigned");
        Assignment::Assigned { previous }
    }

    /// Clear the owner of resource `id`.
    ///
    /// Returns `None` if the resource is unknown or has no owner; calling
    /// it twice leaves the second call without effect.
    pub fn release(
        &mut self,
        id: ResourceId,
        events: &mut NotificationQueue,
    ) -> Option<OwnerRelease<AgentId>> {
        let released = self.get_mut(id)?.reservation_mut().release_owner()?;
        let owner = released.previous_owner;
        if self.assignments.get(&owner) == Some(&id) {
            self.assignments.remove(&owner);
        }
        events.push(Notification::ReservationReleased {
            resource: id,
            consumer: owner,
        });
        debug!(resource = %id, consumer = %owner, kind = %R::KIND, "Reservation released");
        Some(released)
    }

    /// Release whatever `consumer` owns in this registry.
    pub fn release_consumer(
        &mut self,
        consumer: AgentId,
        events: &mut NotificationQueue,
    ) -> Option<OwnerRelease<AgentId>> {
        let id = self.assignments.get(&consumer).copied()?;
        self.release(id, events)
    }

    /// Pair unmatched consumers with available resources until one side
    /// runs out. Returns the new pairs. Does nothing without `auto_assign`.
    pub fn match_unassigned(&mut self, events: &mut NotificationQueue) -> Vec<(AgentId, ResourceId)> {
        let mut matched = Vec::new();
        if !self.auto_assign {
            return matched;
        }
        while let (Some(consumer), Some(id)) = (self.find_unmatched_consumer(), self.first_available()) {
            if !self.assign(consumer, id, events).is_assigned() {
                break;
            }
            matched.push((consumer, id));
        }
        matched
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// The available resource closest to `position`.
    ///
    /// Ties keep the earliest registered resource.
    pub fn find_nearest_available(&self, position: Position) -> Option<&R> {
        self.find_nearest_available_where(position, |_| true)
    }

    /// Like [`find_nearest_available`](Self::find_nearest_available) but
    /// only considering resources that also pass `filter`.
    pub fn find_nearest_available_where<F>(&self, position: Position, filter: F) -> Option<&R>
    where
        F: Fn(&R) -> bool,
    {
        let mut best: Option<(&R, f32)> = None;
        for resource in self.resources.iter().filter(|r| r.is_available() && filter(r)) {
            let distance = position.distance(resource.position());
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((resource, distance)),
            }
        }
        best.map(|(resource, _)| resource)
    }

    fn first_available(&self) -> Option<ResourceId> {
        self.resources
            .iter()
            .find(|r| r.is_available())
            .map(Reservable::id)
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify that the consumer map and owner fields agree, that no
    /// consumer owns two resources, and that owner-gated resources are
    /// only occupied by their owner.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        for (consumer, id) in &self.assignments {
            let owner = self.get(*id).and_then(|r| r.reservation().owner());
            if owner != Some(*consumer) {
                return Err(WorldError::MapOutOfSync {
                    consumer: *consumer,
                    detail: format!("mapped to {id} whose owner is {owner:?}"),
                });
            }
        }

        let mut seen: BTreeMap<AgentId, ResourceId> = BTreeMap::new();
        for resource in &self.resources {
            let reservation = resource.reservation();
            if let Some(owner) = reservation.owner() {
                if let Some(first) = seen.insert(owner, resource.id()) {
                    return Err(WorldError::DoubleOwnership {
                        consumer: owner,
                        first,
                        second: resource.id(),
                    });
                }
                if self.assignments.get(&owner) != Some(&resource.id()) {
                    return Err(WorldError::MapOutOfSync {
                        consumer: owner,
                        detail: format!("owns {} but is not mapped to it", resource.id()),
                    });
                }
            }
            if reservation.gate() == OccupancyGate::OwnerOnly {
                if let Some(occupant) = reservation.occupant() {
                    if reservation.owner() != Some(occupant) {
                        return Err(WorldError::OrphanedOccupancy {
                            resource: resource.id(),
                            occupant,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
