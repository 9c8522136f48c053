//! Resource providers, reservations, and registries for the colony simulation.
//!
//! This crate models the resource side of task dispatch: exclusively
//! ownable facilities and the catalogues that match them to consumers.
//! It never touches agents directly; anything that must happen to a
//! consumer (a morale penalty after eviction, say) is returned to the
//! caller as a value.
//!
//! # Modules
//!
//! - [`reservation`] -- [`ReservationHolder`], the single-owner slot every
//!   provider wraps.
//! - [`provider`] -- The [`Reservable`] capability contract.
//! - [`bed`], [`workstation`], [`item`] -- Reservable providers.
//! - [`site`], [`node`], [`storage`] -- Construction sites, harvest
//!   nodes, and stockpiles.
//! - [`registry`] -- [`ResourceRegistry`], per-kind catalogue with
//!   auto-matching and nearest-available lookup.
//! - [`housing`] -- Bed registry alias and the homeless penalty policy.
//! - [`events`] -- Per-tick notification queue.
//! - [`error`] -- Error types for registry operations.
//!
//! [`ReservationHolder`]: reservation::ReservationHolder
//! [`Reservable`]: provider::Reservable
//! [`ResourceRegistry`]: registry::ResourceRegistry

pub mod bed;
pub mod error;
pub mod events;
pub mod housing;
pub mod item;
pub mod node;
pub mod provider;
pub mod registry;
pub mod reservation;
pub mod site;
pub mod storage;
pub mod workstation;

// Re-export primary types at crate root.
pub use bed::{Bed, DEFAULT_SLEEP_TICKS};
pub use error::WorldError;
pub use events::NotificationQueue;
pub use housing::{BedRegistry, HomelessPolicy};
pub use item::DroppableItem;
pub use node::ResourceNode;
pub use provider::Reservable;
pub use registry::{Assignment, Deregistered, ResourceRegistry};
pub use reservation::{Eviction, OccupancyGate, OwnerRelease, ReservationHolder};
pub use site::ConstructionSite;
pub use storage::Storage;
pub use workstation::Workstation;
