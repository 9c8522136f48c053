//! Shared type definitions for the colony task-dispatch simulation.
//!
//! This crate is the single source of truth for the plain data that flows
//! between the world, agent, and core crates. Types are exported to
//! `TypeScript` via `ts-rs` so presentation layers can consume
//! notifications without re-declaring them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agents, resources, and tasks
//! - [`enums`] -- Priority, lifecycle, posting, item, and resource enums
//! - [`structs`] -- Positions and posted-task definitions
//! - [`notifications`] -- Events published to external listeners

pub mod enums;
pub mod ids;
pub mod notifications;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    FailureReason, ItemKind, PostingState, ResourceKind, TaskKind, TaskPriority, TaskState,
};
pub use ids::{AgentId, PostedTaskId, ResourceId, TaskId};
pub use notifications::Notification;
pub use structs::{Position, TaskData};
