//! Enumeration types for the colony simulation.
//!
//! Task priority and lifecycle states, posted-job states, task kinds, item
//! kinds, and the resource-kind tags carried in notifications.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Task priority
// ---------------------------------------------------------------------------

/// Urgency of a task.
///
/// Ordered so that a *lower* value is *more* urgent:
/// `Critical < High < Normal < Low`. Sorting a list of priorities
/// ascending therefore puts the most urgent first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum TaskPriority {
    /// Survival needs (eating while starving, fleeing).
    Critical,
    /// Explicit player orders and colony-critical construction.
    High,
    /// Ordinary work.
    #[default]
    Normal,
    /// Filler activity (wandering, idling).
    Low,
}

impl TaskPriority {
    /// Returns `true` if `self` should preempt a task running at `other`.
    pub fn is_more_urgent_than(self, other: Self) -> bool {
        self < other
    }
}

// ---------------------------------------------------------------------------
// Task lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
///
/// `Pending -> InProgress` happens exactly once. `Completed`, `Failed`,
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskState {
    /// Constructed but not yet started.
    Pending,
    /// Started and being advanced once per tick.
    InProgress,
    /// Finished successfully.
    Completed,
    /// Aborted because a precondition or target disappeared.
    Failed,
    /// Aborted by an external request.
    Cancelled,
}

impl TaskState {
    /// Whether this state is terminal (no further transitions allowed).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl core::fmt::Display for TaskState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Kind tag of a task variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskKind {
    /// Walk to a position.
    Move,
    /// Apply build work to a construction site.
    Construct,
    /// Gather from a harvest node.
    Harvest,
    /// Walk to a loose item and carry it.
    PickupItem,
    /// Carry inventory to a storage.
    DeliverToStorage,
    /// Walk to a food item and consume it.
    Eat,
    /// Occupy a workstation's worker slot and apply work.
    Workstation,
    /// Sleep in an owned bed.
    Sleep,
    /// Stroll to a random nearby point.
    Wander,
    /// Stand still for a fixed duration.
    IdleWait,
}

/// Why a task ended in [`TaskState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FailureReason {
    /// The target resource no longer exists.
    TargetMissing,
    /// A reservation or worker slot could not be acquired.
    ReservationRejected,
    /// The posted task refused another worker.
    PostingRejected,
    /// The agent driving the task no longer exists.
    AgentMissing,
    /// The resource was force-stopped while the agent was working it.
    Interrupted,
    /// The unit had no room for the item.
    InventoryFull,
}

// ---------------------------------------------------------------------------
// Posted task board
// ---------------------------------------------------------------------------

/// State of a shared job on the posted task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PostingState {
    /// No workers yet.
    Available,
    /// At least one worker, below the cap.
    InProgress,
    /// Worker count equals the cap.
    Full,
    /// Required work reached.
    Completed,
    /// Withdrawn by the owner.
    Cancelled,
}

impl PostingState {
    /// Whether the posting can accept another worker in this state.
    pub const fn accepts_workers(self) -> bool {
        matches!(self, Self::Available | Self::InProgress)
    }

    /// Whether the posting is finished (completed or cancelled).
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Items and resources
// ---------------------------------------------------------------------------

/// Kind of a carryable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// Logs from trees.
    Wood,
    /// Stone from rocks.
    Stone,
    /// Wild berries.
    Berries,
    /// A cooked meal.
    Meal,
}

impl ItemKind {
    /// Hunger removed by eating one unit, or `None` if inedible.
    pub const fn nutrition(self) -> Option<u32> {
        match self {
            Self::Berries => Some(20),
            Self::Meal => Some(50),
            Self::Wood | Self::Stone => None,
        }
    }

    /// Whether the item can be eaten.
    pub const fn is_food(self) -> bool {
        self.nutrition().is_some()
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Wood => write!(f, "wood"),
            Self::Stone => write!(f, "stone"),
            Self::Berries => write!(f, "berries"),
            Self::Meal => write!(f, "meal"),
        }
    }
}

/// Category of a resource provider, used in notifications and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// A sleeping slot.
    Bed,
    /// A crafting/processing station.
    Workstation,
    /// A loose item on the ground.
    Item,
    /// A building under construction.
    ConstructionSite,
    /// A harvestable node (tree, rock, bush).
    HarvestNode,
    /// A stockpile.
    Storage,
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Bed => "bed",
            Self::Workstation => "workstation",
            Self::Item => "item",
            Self::ConstructionSite => "construction_site",
            Self::HarvestNode => "harvest_node",
            Self::Storage => "storage",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_priority_value_is_more_urgent() {
        assert!(TaskPriority::Critical < TaskPriority::High);
        assert!(TaskPriority::High < TaskPriority::Normal);
        assert!(TaskPriority::Normal < TaskPriority::Low);
        assert!(TaskPriority::High.is_more_urgent_than(TaskPriority::Low));
        assert!(!TaskPriority::Normal.is_more_urgent_than(TaskPriority::Normal));
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::InProgress.is_terminal());
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Cancelled.is_terminal());
    }

    #[test]
    fn posting_acceptance() {
        assert!(PostingState::Available.accepts_workers());
        assert!(PostingState::InProgress.accepts_workers());
        assert!(!PostingState::Full.accepts_workers());
        assert!(!PostingState::Completed.accepts_workers());
        assert!(PostingState::Cancelled.is_closed());
    }

    #[test]
    fn only_food_has_nutrition() {
        assert!(ItemKind::Berries.is_food());
        assert!(ItemKind::Meal.is_food());
        assert!(!ItemKind::Wood.is_food());
        assert_eq!(ItemKind::Stone.nutrition(), None);
    }
}
