//! Tasks: single units of work with a fixed lifecycle.
//!
//! ```text
//! Pending --start--> InProgress --step--> Completed
//!    |                   |  \----------> Failed
//!    \------cancel-------+-------------> Cancelled
//! ```
//!
//! Each variant lives in its own module and implements [`TaskStep`]. The
//! [`Task`] wrapper owns the state machine: it runs the variant's start,
//! per-tick `execute` and `is_complete`, and calls the variant's
//! `cleanup` on every terminal transition so reservations never outlive
//! the task. Terminal tasks are immutable; stepping or cancelling them
//! again is logged and ignored.

mod construct;
mod deliver;
mod eat;
mod harvest;
mod idle;
mod move_to;
mod pickup;
mod sleep;
mod wander;
mod workstation;

pub use construct::Construct;
pub use deliver::DeliverToStorage;
pub use eat::{Eat, FoodSource};
pub use harvest::Harvest;
pub use idle::IdleWait;
pub use move_to::MoveTo;
pub use pickup::PickupItem;
pub use sleep::Sleep;
pub use wander::Wander;
pub use workstation::WorkstationJob;

use tracing::{debug, warn};

use colony_agents::Unit;
use colony_types::{
    AgentId, FailureReason, Notification, Position, PostedTaskId, ResourceId, TaskId, TaskKind,
    TaskPriority, TaskState,
};

use crate::world::WorldState;

/// Variant-specific behaviour driven by [`Task`].
///
/// Every call that reads a target starts with an existence check and
/// reports a missing target as `Err`, which fails the task.
pub trait TaskStep {
    /// Acquire whatever the variant needs before its first tick.
    fn start(&mut self, _unit: &mut dyn Unit, _world: &mut WorldState) -> Result<(), FailureReason> {
        Ok(())
    }

    /// One tick of work.
    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason>;

    /// Whether the work is done, checked after every `execute`.
    fn is_complete(&self, unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason>;

    /// Release everything acquired. Runs exactly once, on whichever
    /// terminal transition happens. `unit` is `None` when the agent is
    /// already gone.
    fn cleanup(
        &mut self,
        _agent: AgentId,
        _unit: Option<&mut dyn Unit>,
        _world: &mut WorldState,
        _outcome: TaskState,
    ) {
    }

    /// Where the work happens.
    fn target(&self) -> Position;

    /// The resource the work is about, if any.
    fn target_resource(&self) -> Option<ResourceId> {
        None
    }
}

/// The closed set of task variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskVariant {
    /// Walk to a point.
    Move(MoveTo),
    /// Work on a posted construction job.
    Construct(Construct),
    /// Gather from a harvest node.
    Harvest(Harvest),
    /// Reserve and pick up a loose item.
    PickupItem(PickupItem),
    /// Carry the inventory to a stockpile.
    DeliverToStorage(DeliverToStorage),
    /// Eat a reserved food item or carried food.
    Eat(Eat),
    /// Work a job at a workstation.
    Workstation(WorkstationJob),
    /// Sleep in the owned bed.
    Sleep(Sleep),
    /// Stroll to a random nearby point.
    Wander(Wander),
    /// Stand still for a while.
    IdleWait(IdleWait),
}

/// Run `$body` with `$v` bound to the active variant.
macro_rules! with_variant {
    ($variant:expr, $v:ident => $body:expr) => {
        match $variant {
            TaskVariant::Move($v) => $body,
            TaskVariant::Construct($v) => $body,
            TaskVariant::Harvest($v) => $body,
            TaskVariant::PickupItem($v) => $body,
            TaskVariant::DeliverToStorage($v) => $body,
            TaskVariant::Eat($v) => $body,
            TaskVariant::Workstation($v) => $body,
            TaskVariant::Sleep($v) => $body,
            TaskVariant::Wander($v) => $body,
            TaskVariant::IdleWait($v) => $body,
        }
    };
}

impl TaskVariant {
    /// The kind tag.
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Move(_) => TaskKind::Move,
            Self::Construct(_) => TaskKind::Construct,
            Self::Harvest(_) => TaskKind::Harvest,
            Self::PickupItem(_) => TaskKind::PickupItem,
            Self::DeliverToStorage(_) => TaskKind::DeliverToStorage,
            Self::Eat(_) => TaskKind::Eat,
            Self::Workstation(_) => TaskKind::Workstation,
            Self::Sleep(_) => TaskKind::Sleep,
            Self::Wander(_) => TaskKind::Wander,
            Self::IdleWait(_) => TaskKind::IdleWait,
        }
    }

    const fn default_priority(&self) -> TaskPriority {
        match self {
            Self::Eat(_) | Self::Sleep(_) => TaskPriority::High,
            Self::Wander(_) | Self::IdleWait(_) => TaskPriority::Low,
            Self::Move(_)
            | Self::Construct(_)
            | Self::Harvest(_)
            | Self::PickupItem(_)
            | Self::DeliverToStorage(_)
            | Self::Workstation(_) => TaskPriority::Normal,
        }
    }
}

/// A unit of work driven by one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    priority: TaskPriority,
    state: TaskState,
    agent: Option<AgentId>,
    failure: Option<FailureReason>,
    ticks: u64,
    variant: TaskVariant,
}

impl Task {
    /// Wrap a variant in a pending task with the variant's default
    /// priority.
    pub fn new(variant: TaskVariant) -> Self {
        Self {
            id: TaskId::new(),
            priority: variant.default_priority(),
            state: TaskState::Pending,
            agent: None,
            failure: None,
            ticks: 0,
            variant,
        }
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Walk to `target`.
    pub fn move_to(target: Position) -> Self {
        Self::new(TaskVariant::Move(MoveTo::new(target)))
    }

    /// Work on construction site `site` through board posting `posting`.
    pub fn construct(site: ResourceId, posting: PostedTaskId, at: Position) -> Self {
        Self::new(TaskVariant::Construct(Construct::new(site, posting, at)))
    }

    /// Gather from node `node`.
    pub fn harvest(node: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::Harvest(Harvest::new(node, at)))
    }

    /// Pick up loose item `item`.
    pub fn pickup(item: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::PickupItem(PickupItem::new(item, at)))
    }

    /// Deliver carried items to `storage`.
    pub fn deliver(storage: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::DeliverToStorage(DeliverToStorage::new(storage, at)))
    }

    /// Eat food item `item` from the ground.
    pub fn eat(item: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::Eat(Eat::ground(item, at)))
    }

    /// Eat food from the unit's own inventory.
    pub fn eat_carried() -> Self {
        Self::new(TaskVariant::Eat(Eat::carried()))
    }

    /// Work the queued job at workstation `station`.
    pub fn workstation(station: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::Workstation(WorkstationJob::new(station, at)))
    }

    /// Sleep in bed `bed`, which the unit must own.
    pub fn sleep(bed: ResourceId, at: Position) -> Self {
        Self::new(TaskVariant::Sleep(Sleep::new(bed, at)))
    }

    /// Wander near the current position.
    pub fn wander() -> Self {
        Self::new(TaskVariant::Wander(Wander::new()))
    }

    /// Stand still for the configured idle time.
    pub fn idle_wait() -> Self {
        Self::new(TaskVariant::IdleWait(IdleWait::new()))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Scheduling priority.
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Lifecycle state.
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Kind tag.
    pub const fn kind(&self) -> TaskKind {
        self.variant.kind()
    }

    /// The agent driving the task, once started.
    pub const fn agent(&self) -> Option<AgentId> {
        self.agent
    }

    /// Why the task failed, if it did.
    pub const fn failure(&self) -> Option<FailureReason> {
        self.failure
    }

    /// Ticks spent in progress.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The variant and its progress.
    pub const fn variant(&self) -> &TaskVariant {
        &self.variant
    }

    /// Where the work happens.
    pub fn target(&self) -> Position {
        with_variant!(&self.variant, v => v.target())
    }

    /// The resource the work is about, if any.
    pub fn target_resource(&self) -> Option<ResourceId> {
        with_variant!(&self.variant, v => v.target_resource())
    }

    /// Whether the task reached a terminal state.
    pub const fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Move from `Pending` to `InProgress`, acquiring the variant's
    /// reservations. A rejected acquisition fails the task immediately.
    pub fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> TaskState {
        if self.state != TaskState::Pending {
            warn!(task = %self.id, state = %self.state, "Start ignored: task already started");
            return self.state;
        }
        let agent = unit.id();
        self.agent = Some(agent);
        self.state = TaskState::InProgress;
        debug!(task = %self.id, agent = %agent, kind = ?self.kind(), "Task started");

        let started = with_variant!(&mut self.variant, v => v.start(unit, world));
        if let Err(reason) = started {
            self.fail(reason, Some(unit), world);
        }
        self.state
    }

    /// Advance one tick: start if pending, then `execute`, then check
    /// completion. Returns the state afterwards.
    pub fn step(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> TaskState {
        if self.state == TaskState::Pending && self.start(unit, world) != TaskState::InProgress {
            return self.state;
        }
        if self.state.is_terminal() {
            warn!(task = %self.id, state = %self.state, "Step ignored: task is terminal");
            return self.state;
        }
        self.ticks = self.ticks.saturating_add(1);

        let outcome = with_variant!(&mut self.variant, v => match v.execute(unit, world) {
            Ok(()) => v.is_complete(unit, world),
            Err(reason) => Err(reason),
        });
        match outcome {
            Ok(true) => self.finish(TaskState::Completed, Some(unit), world),
            Ok(false) => {}
            Err(reason) => self.fail(reason, Some(unit), world),
        }
        self.state
    }

    /// Cancel from `Pending` or `InProgress`, running cleanup before
    /// returning. Returns `false` if the task was already terminal.
    pub fn cancel(&mut self, unit: Option<&mut dyn Unit>, world: &mut WorldState) -> bool {
        if self.state.is_terminal() {
            warn!(task = %self.id, state = %self.state, "Cancel ignored: task is terminal");
            return false;
        }
        self.finish(TaskState::Cancelled, unit, world);
        true
    }

    /// Fail the task from outside (its agent vanished, say).
    pub fn abort(
        &mut self,
        reason: FailureReason,
        unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
    ) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.fail(reason, unit, world);
        true
    }

    fn fail(&mut self, reason: FailureReason, unit: Option<&mut dyn Unit>, world: &mut WorldState) {
        self.failure = Some(reason);
        self.finish(TaskState::Failed, unit, world);
    }

    fn finish(&mut self, outcome: TaskState, unit: Option<&mut dyn Unit>, world: &mut WorldState) {
        let was_started = self.state == TaskState::InProgress;
        self.state = outcome;

        let Some(agent) = self.agent else {
            debug!(task = %self.id, state = %outcome, "Unstarted task closed");
            return;
        };
        if was_started {
            with_variant!(&mut self.variant, v => v.cleanup(agent, unit, world, outcome));
        }

        let kind = self.kind();
        let task = self.id;
        let notification = match outcome {
            TaskState::Completed => Notification::TaskCompleted { agent, task, kind },
            TaskState::Failed => Notification::TaskFailed {
                agent,
                task,
                kind,
                reason: self.failure.unwrap_or(FailureReason::TargetMissing),
            },
            TaskState::Cancelled => Notification::TaskCancelled { agent, task, kind },
            TaskState::Pending | TaskState::InProgress => return,
        };
        world.events.push(notification);
        debug!(
            task = %task,
            agent = %agent,
            kind = ?kind,
            state = %outcome,
            reason = ?self.failure,
            ticks = self.ticks,
            "Task finished"
        );
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by variants
// ---------------------------------------------------------------------------

/// Rate limiter for work applied every `interval` ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkTimer {
    elapsed: u64,
}

impl WorkTimer {
    /// A timer that fires after a full interval.
    pub const fn new() -> Self {
        Self { elapsed: 0 }
    }

    /// Count one tick; returns `true` on ticks where work applies.
    /// An interval of 0 or 1 fires every tick.
    pub const fn tick(&mut self, interval: u64) -> bool {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= interval {
            self.elapsed = 0;
            return true;
        }
        false
    }
}

/// Whether `unit` is within `range` of `target`; if not, send it there.
pub(crate) fn approach(unit: &mut dyn Unit, target: Position, range: f32) -> bool {
    if unit.is_near(target, range) {
        true
    } else {
        unit.move_to(target);
        false
    }
}
