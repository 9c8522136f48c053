//! Error types for the `colony-world` crate.
//!
//! Reservation preconditions are reported as `bool` results, never as
//! errors. [`WorldError`] covers lookups of unknown IDs and broken
//! registry invariants, which indicate a caller bug.

use colony_types::{AgentId, ResourceId};

/// Errors that can occur during registry and provider operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No resource with this ID is registered.
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// A resource with this ID is already registered.
    #[error("duplicate resource id: {0}")]
    DuplicateResource(ResourceId),

    /// Two resources report the same owner.
    #[error("consumer {consumer} owns both {first} and {second}")]
    DoubleOwnership {
        /// The consumer holding two reservations.
        consumer: AgentId,
        /// First owned resource.
        first: ResourceId,
        /// Second owned resource.
        second: ResourceId,
    },

    /// The consumer map and resource owner fields disagree.
    #[error("registry map out of sync for consumer {consumer}: {detail}")]
    MapOutOfSync {
        /// The consumer whose entry is inconsistent.
        consumer: AgentId,
        /// What disagrees.
        detail: String,
    },

    /// A resource is occupied by a consumer that is not allowed to occupy it.
    #[error("resource {resource} occupied by {occupant} without ownership")]
    OrphanedOccupancy {
        /// The resource.
        resource: ResourceId,
        /// The occupant.
        occupant: AgentId,
    },
}
