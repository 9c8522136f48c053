//! Per-agent task dispatch.
//!
//! A [`TaskDriver`] holds at most one [`Task`] and advances it once per
//! tick. When the driver is idle it asks a [`Behavior`] for the next task;
//! while busy it lets the behaviour offer something more urgent, which
//! preempts the running task only when strictly higher in priority.
//!
//! [`FirstFitBehavior`] is the stock behaviour: no look-ahead, just the
//! first need that can be met by the nearest matching resource.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use colony_agents::{AgentConfig, Unit};
use colony_types::{AgentId, FailureReason, TaskKind, TaskPriority, TaskState};
use colony_world::Reservable;

use crate::task::Task;
use crate::world::WorldState;

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// The AI seam: decides what an agent does next.
pub trait Behavior {
    /// Choose a task for an idle agent. `None` leaves the agent idle this
    /// tick.
    fn next_task(&mut self, unit: &dyn Unit, world: &WorldState) -> Option<Task>;

    /// Offer a task that may preempt `current`. Called every tick while the
    /// agent is busy; the driver only switches if the offer is strictly
    /// more urgent.
    fn urgent_task(&mut self, _unit: &dyn Unit, _world: &WorldState, _current: &Task) -> Option<Task> {
        None
    }
}

/// Counters kept by a driver over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverStats {
    /// Tasks that completed.
    pub completed: u64,
    /// Tasks that failed.
    pub failed: u64,
    /// Tasks that were cancelled, preemption included.
    pub cancelled: u64,
}

impl DriverStats {
    fn record(&mut self, state: TaskState) {
        let counter = match state {
            TaskState::Completed => &mut self.completed,
            TaskState::Failed => &mut self.failed,
            TaskState::Cancelled => &mut self.cancelled,
            TaskState::Pending | TaskState::InProgress => return,
        };
        *counter = counter.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// TaskDriver
// ---------------------------------------------------------------------------

/// Holds and advances one agent's active task.
#[derive(Debug, Clone)]
pub struct TaskDriver {
    agent: AgentId,
    current: Option<Task>,
    stats: DriverStats,
}

impl TaskDriver {
    /// An idle driver for `agent`.
    pub const fn new(agent: AgentId) -> Self {
        Self {
            agent,
            current: None,
            stats: DriverStats {
                completed: 0,
                failed: 0,
                cancelled: 0,
            },
        }
    }

    /// The agent this driver belongs to.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// The active task, if any.
    pub const fn current(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    /// Whether no task is active.
    pub const fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Lifetime counters.
    pub const fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Replace the active task unconditionally. The old task is cancelled
    /// before the new one is installed.
    pub fn assign(&mut self, task: Task, unit: &mut dyn Unit, world: &mut WorldState) {
        self.cancel(Some(unit), world);
        debug!(agent = %self.agent, task = %task.id(), kind = ?task.kind(), "Task assigned");
        self.current = Some(task);
    }

    /// Install `task` if the driver is idle or `task` is strictly more
    /// urgent than the active one, which is then cancelled. Returns whether
    /// the task was taken; a refused task was never started and is simply
    /// dropped.
    pub fn offer(&mut self, task: Task, unit: &mut dyn Unit, world: &mut WorldState) -> bool {
        if let Some(current) = &self.current
            && !task.priority().is_more_urgent_than(current.priority())
        {
            return false;
        }
        if let Some(current) = &self.current {
            debug!(
                agent = %self.agent,
                preempted = ?current.kind(),
                by = ?task.kind(),
                "Task preempted"
            );
        }
        self.assign(task, unit, world);
        true
    }

    /// One tick: pick a task if idle, let the behaviour preempt, then step.
    /// Returns the active task's state after stepping, or `None` if the
    /// agent stayed idle. A terminal task is discarded before returning.
    pub fn tick(
        &mut self,
        unit: &mut dyn Unit,
        world: &mut WorldState,
        behavior: &mut dyn Behavior,
    ) -> Option<TaskState> {
        match &self.current {
            None => {
                let task = behavior.next_task(unit, world)?;
                debug!(agent = %self.agent, task = %task.id(), kind = ?task.kind(), "Task chosen");
                self.current = Some(task);
            }
            Some(current) => {
                if let Some(urgent) = behavior.urgent_task(unit, world, current) {
                    self.offer(urgent, unit, world);
                }
            }
        }

        let state = self.current.as_mut()?.step(unit, world);
        self.retire();
        Some(state)
    }

    /// Cancel the active task. `unit` is `None` when the agent is already
    /// gone. Returns `false` if the driver was idle.
    pub fn cancel(&mut self, unit: Option<&mut dyn Unit>, world: &mut WorldState) -> bool {
        let Some(task) = self.current.as_mut() else {
            return false;
        };
        task.cancel(unit, world);
        self.retire();
        true
    }

    /// Fail the active task with `reason` without touching the agent.
    pub fn abort(&mut self, reason: FailureReason, world: &mut WorldState) -> bool {
        let Some(task) = self.current.as_mut() else {
            return false;
        };
        if !task.abort(reason, None, world) {
            warn!(agent = %self.agent, task = %task.id(), "Abort ignored: task already terminal");
        }
        self.retire();
        true
    }

    /// Drop the active task if it is terminal.
    fn retire(&mut self) {
        if let Some(task) = self.current.take_if(|t| t.is_terminal()) {
            self.stats.record(task.state());
        }
    }
}

// ---------------------------------------------------------------------------
// FirstFitBehavior
// ---------------------------------------------------------------------------

/// First-fit, nearest-resource task selection.
///
/// Needs are checked in a fixed order: hunger, tiredness, a full load,
/// posted construction, workstation jobs, loose items, harvesting. An
/// agent with nothing to do wanders or idles at random.
#[derive(Debug, Clone)]
pub struct FirstFitBehavior {
    config: AgentConfig,
    rng: StdRng,
}

impl FirstFitBehavior {
    /// Behaviour using `config`'s need thresholds and a seeded RNG for the
    /// wander/idle choice.
    pub fn new(config: AgentConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn eat_task(&self, unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        if !self.config.is_hungry(unit.hunger()) {
            return None;
        }
        let task = if unit.carried_food().is_some() {
            Task::eat_carried()
        } else {
            let item = world
                .items
                .find_nearest_available_where(unit.position(), |i| i.is_food())?;
            Task::eat(item.id(), item.position())
        };
        if unit.hunger() >= self.config.starvation_threshold {
            return Some(task.with_priority(TaskPriority::Critical));
        }
        Some(task)
    }

    fn sleep_task(&self, unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        if !self.config.is_tired(unit.energy()) {
            return None;
        }
        let bed = world
            .beds
            .resource_of(unit.id())
            .and_then(|id| world.beds.get(id))
            .filter(|b| b.is_built())?;
        Some(Task::sleep(bed.id(), bed.position()))
    }

    fn deliver_task(unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        if unit.is_inventory_empty() {
            return None;
        }
        let nothing_to_harvest = world.nearest_node(unit.position()).is_none();
        if !unit.is_inventory_full() && !nothing_to_harvest {
            return None;
        }
        let storage = world.nearest_open_storage(unit.position())?;
        Some(Task::deliver(storage.id(), storage.position()))
    }

    fn construct_task(unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        let posting = world.board.find_available(unit.position())?;
        let data = posting.data();
        if data.kind != TaskKind::Construct {
            return None;
        }
        let site = data.target_resource?;
        Some(Task::construct(site, posting.id(), data.target).with_priority(data.priority))
    }

    fn workstation_task(unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        let station = world.workstations.find_nearest_available(unit.position())?;
        Some(Task::workstation(station.id(), station.position()))
    }

    fn pickup_task(unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        if unit.is_inventory_full() || world.storages.is_empty() {
            return None;
        }
        let item = world
            .items
            .find_nearest_available_where(unit.position(), |i| !i.is_food())?;
        Some(Task::pickup(item.id(), item.position()))
    }

    fn harvest_task(unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        if unit.is_inventory_full() {
            return None;
        }
        let node = world.nearest_node(unit.position())?;
        Some(Task::harvest(node.id(), node.position()))
    }
}

impl Behavior for FirstFitBehavior {
    fn next_task(&mut self, unit: &dyn Unit, world: &WorldState) -> Option<Task> {
        let chosen = self
            .eat_task(unit, world)
            .or_else(|| self.sleep_task(unit, world))
            .or_else(|| Self::deliver_task(unit, world))
            .or_else(|| Self::construct_task(unit, world))
            .or_else(|| Self::workstation_task(unit, world))
            .or_else(|| Self::pickup_task(unit, world))
            .or_else(|| Self::harvest_task(unit, world));
        if chosen.is_some() {
            return chosen;
        }
        if self.rng.random_bool(0.5) {
            Some(Task::wander())
        } else {
            Some(Task::idle_wait())
        }
    }

    fn urgent_task(&mut self, unit: &dyn Unit, world: &WorldState, current: &Task) -> Option<Task> {
        if matches!(current.kind(), TaskKind::Eat | TaskKind::Sleep) {
            return None;
        }
        self.eat_task(unit, world)
            .or_else(|| self.sleep_task(unit, world))
    }
}
