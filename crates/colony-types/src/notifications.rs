//! Notifications emitted by the colony core for UI, audio, and AI layers.
//!
//! The core pushes these into a queue that is drained once per tick.
//! Nothing in the core depends on anyone listening.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FailureReason, ResourceKind, TaskKind};
use crate::ids::{AgentId, PostedTaskId, ResourceId, TaskId};

/// Something observable happened inside the colony core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// A resource provider joined a registry.
    ResourceRegistered {
        /// The resource.
        resource: ResourceId,
        /// Its category.
        kind: ResourceKind,
    },
    /// A resource provider left a registry.
    ResourceUnregistered {
        /// The resource.
        resource: ResourceId,
        /// Its category.
        kind: ResourceKind,
    },
    /// A consumer became the owner of a resource.
    ReservationAssigned {
        /// The resource.
        resource: ResourceId,
        /// The new owner.
        consumer: AgentId,
    },
    /// A resource lost its owner.
    ReservationReleased {
        /// The resource.
        resource: ResourceId,
        /// The previous owner.
        consumer: AgentId,
    },
    /// A task finished successfully.
    TaskCompleted {
        /// The agent that ran it.
        agent: AgentId,
        /// The task.
        task: TaskId,
        /// Its kind.
        kind: TaskKind,
    },
    /// A task failed.
    TaskFailed {
        /// The agent that ran it.
        agent: AgentId,
        /// The task.
        task: TaskId,
        /// Its kind.
        kind: TaskKind,
        /// Why it failed.
        reason: FailureReason,
    },
    /// A task was cancelled.
    TaskCancelled {
        /// The agent that ran it.
        agent: AgentId,
        /// The task.
        task: TaskId,
        /// Its kind.
        kind: TaskKind,
    },
    /// A shared job on the board reached its required work.
    PostedTaskCompleted {
        /// The posting.
        posted: PostedTaskId,
    },
    /// A morale penalty was applied to an agent.
    MoralePenalty {
        /// The penalised agent.
        agent: AgentId,
        /// Morale removed.
        amount: u32,
        /// Short machine-readable cause (`homeless`, `sleep_interrupted`).
        cause: String,
    },
}
