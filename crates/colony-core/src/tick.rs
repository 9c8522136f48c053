//! Tick cycle: one discrete step of the colony.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- advance the tick counter.
//! 2. **Vitals** -- hunger, energy, aging, healing; deaths remove the unit
//!    and release everything it held.
//! 3. **Housing** -- periodic morale penalty for units without a bed.
//! 4. **Tasks** -- every unit moves, then its driver advances its task
//!    once, in join order.
//! 5. **Cleanup** -- closed postings and depleted nodes are removed.
//! 6. **Notify** -- the notification queue is drained into the summary and
//!    every registered sink.
//!
//! Given the same colony and behaviour the cycle is deterministic.

use serde::Serialize;
use tracing::{debug, info};

use colony_agents::{AgentError, DeathConsequences, apply_vital_tick};
use colony_types::{AgentId, FailureReason, Notification};
use colony_world::WorldError;

use crate::clock::ClockError;
use crate::colony::Colony;
use crate::dispatch::{Behavior, TaskDriver};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An agent vital computation failed.
    #[error("agent error for {agent_id}: {source}")]
    Agent {
        /// The agent that caused the error.
        agent_id: AgentId,
        /// The underlying agent error.
        source: AgentError,
    },

    /// A registry invariant broke.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Zero-based day of the tick.
    pub day: u64,
    /// Number of living agents at end of tick.
    pub agents_alive: u32,
    /// Agents who died during this tick.
    pub deaths: Vec<DeathConsequences>,
    /// Units that paid the homeless penalty.
    pub homeless_penalized: u32,
    /// Tasks that completed.
    pub tasks_completed: u32,
    /// Tasks that failed.
    pub tasks_failed: u32,
    /// Tasks that were cancelled.
    pub tasks_cancelled: u32,
    /// Postings removed from the board.
    pub postings_closed: u32,
    /// Harvest nodes removed after running dry.
    pub nodes_depleted: u32,
    /// Everything raised during the tick, in order.
    pub notifications: Vec<Notification>,
}

/// Execute one complete tick.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows or a unit's vitals
/// overflow. Task-level failures never surface here; they end the one
/// task and show up as notifications.
pub fn run_tick(colony: &mut Colony, behavior: &mut dyn Behavior) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = colony.clock.advance()?;
    let day = colony.clock.day();
    debug!(tick, day, "Tick started");

    // --- Phase 2: Vitals ---
    let deaths = phase_vitals(colony)?;

    // --- Phase 3: Housing ---
    let homeless = colony.apply_homeless_penalties(tick);

    // --- Phase 4: Tasks ---
    phase_tasks(colony, behavior);

    // --- Phase 5: Cleanup ---
    let postings_closed = colony.world.board.remove_closed().len();
    let nodes_before = colony.world.nodes.len();
    colony.world.nodes.retain(|n| !n.is_depleted());
    let nodes_depleted = nodes_before.saturating_sub(colony.world.nodes.len());

    // --- Phase 6: Notify ---
    let notifications = colony.world.events.drain();
    for sink in &mut colony.sinks {
        sink.deliver(tick, &notifications);
    }

    let summary = TickSummary {
        tick,
        day,
        agents_alive: u32::try_from(colony.agents.len()).unwrap_or(u32::MAX),
        homeless_penalized: u32::try_from(homeless).unwrap_or(u32::MAX),
        tasks_completed: count_where(&notifications, |n| {
            matches!(n, Notification::TaskCompleted { .. })
        }),
        tasks_failed: count_where(&notifications, |n| matches!(n, Notification::TaskFailed { .. })),
        tasks_cancelled: count_where(&notifications, |n| {
            matches!(n, Notification::TaskCancelled { .. })
        }),
        postings_closed: u32::try_from(postings_closed).unwrap_or(u32::MAX),
        nodes_depleted: u32::try_from(nodes_depleted).unwrap_or(u32::MAX),
        deaths,
        notifications,
    };

    for death in &summary.deaths {
        info!(tick, agent = %death.agent_id, cause = %death.cause, "Death processed");
    }
    debug!(
        tick,
        agents_alive = summary.agents_alive,
        completed = summary.tasks_completed,
        failed = summary.tasks_failed,
        cancelled = summary.tasks_cancelled,
        "Tick finished"
    );
    Ok(summary)
}

fn count_where(notifications: &[Notification], pred: impl Fn(&Notification) -> bool) -> u32 {
    u32::try_from(notifications.iter().filter(|n| pred(n)).count()).unwrap_or(u32::MAX)
}

/// Apply vitals to every unit in join order and remove the dead.
fn phase_vitals(colony: &mut Colony) -> Result<Vec<DeathConsequences>, TickError> {
    let mut deaths = Vec::new();
    let ids = colony.agents.ids().to_vec();
    for id in ids {
        let housed = colony.housed(id);
        let Some(unit) = colony.agents.get_mut(id) else {
            continue;
        };
        let result = apply_vital_tick(unit, &colony.agent_config, housed)
            .map_err(|source| TickError::Agent { agent_id: id, source })?;
        if let Some(cause) = result.death {
            let death = colony
                .kill_agent(id, cause)
                .map_err(|source| TickError::Agent { agent_id: id, source })?;
            deaths.push(death);
        }
    }
    Ok(deaths)
}

/// Move every unit and advance its task once, in join order. Drivers left
/// without a unit fail their task and are dropped.
fn phase_tasks(colony: &mut Colony, behavior: &mut dyn Behavior) {
    let Colony {
        world,
        agents,
        drivers,
        ..
    } = colony;

    for &id in agents.ids() {
        drivers.entry(id).or_insert_with(|| TaskDriver::new(id));
    }
    let order = agents.ids().to_vec();
    for id in order {
        let (Some(unit), Some(driver)) = (agents.get_mut(id), drivers.get_mut(&id)) else {
            continue;
        };
        unit.advance_movement();
        driver.tick(unit, world, behavior);
    }

    drivers.retain(|id, driver| {
        if agents.contains(*id) {
            return true;
        }
        driver.abort(FailureReason::AgentMissing, world);
        false
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use colony_agents::Unit;
    use colony_types::{ItemKind, Position};
    use colony_world::ResourceNode;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::dispatch::FirstFitBehavior;
    use crate::sink::NotificationSink;
    use crate::task::Task;
    use crate::world::WorldState;

    struct Passive;

    impl Behavior for Passive {
        fn next_task(&mut self, _unit: &dyn Unit, _world: &WorldState) -> Option<Task> {
            None
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(u64, usize)>>>);

    impl NotificationSink for Recorder {
        fn deliver(&mut self, tick: u64, notifications: &[Notification]) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push((tick, notifications.len()));
            }
        }
    }

    fn colony() -> Colony {
        Colony::new(&SimulationConfig::default()).unwrap()
    }

    #[test]
    fn tick_advances_clock_and_vitals() {
        let mut colony = colony();
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let hunger = colony.agent(ada).unwrap().hunger;

        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.agents_alive, 1);
        assert!(colony.agent(ada).unwrap().hunger > hunger);
    }

    #[test]
    fn starving_agent_dies_and_drops_items() {
        let mut colony = colony();
        let ada = colony.spawn_agent("Ada", Position::new(2.0, 2.0)).unwrap();
        {
            let unit = colony.agent_mut(ada).unwrap();
            unit.hunger = 100;
            unit.health = 1;
            unit.inventory.add(ItemKind::Stone, 2).unwrap();
        }
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        assert_eq!(summary.agents_alive, 0);
        assert_eq!(summary.deaths.len(), 1);
        assert_eq!(colony.world().items.len(), 1);
        assert!(colony.driver(ada).is_none());
    }

    #[test]
    fn sinks_see_every_tick() {
        let mut colony = colony();
        let recorder = Recorder::default();
        colony.add_sink(Box::new(recorder.clone()));
        colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        for _ in 0..3 {
            run_tick(&mut colony, &mut Passive).unwrap();
        }
        let seen = recorder.0.lock().unwrap();
        let ticks: Vec<u64> = seen.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[test]
    fn summary_serializes() {
        let mut colony = colony();
        colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.get("tick").and_then(serde_json::Value::as_u64), Some(1));
        assert_eq!(json.get("agents_alive").and_then(serde_json::Value::as_u64), Some(1));
    }

    #[test]
    fn depleted_nodes_are_removed() {
        let mut colony = colony();
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let node = colony.add_node(ResourceNode::new(ItemKind::Wood, 1, Position::ORIGIN));
        colony.assign_task(ada, Task::harvest(node, Position::ORIGIN)).unwrap();

        let mut depleted = 0_u32;
        for _ in 0..20 {
            let summary = run_tick(&mut colony, &mut Passive).unwrap();
            depleted = summary.nodes_depleted.saturating_add(depleted);
        }
        assert_eq!(depleted, 1);
        assert!(colony.world().node(node).is_none());
        assert_eq!(colony.agent(ada).unwrap().carried(ItemKind::Wood), 1);
    }

    #[test]
    fn first_fit_colony_makes_progress() {
        let mut colony = colony();
        colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        colony.spawn_agent("Bob", Position::new(1.0, 0.0)).unwrap();
        colony.add_node(ResourceNode::new(ItemKind::Wood, 6, Position::new(3.0, 0.0)));
        colony.add_storage(Position::new(-3.0, 0.0), 100);
        let mut behavior = FirstFitBehavior::new(colony.agent_config().clone(), 3);

        let mut completed = 0_u32;
        for _ in 0..120 {
            let summary = run_tick(&mut colony, &mut behavior).unwrap();
            completed = summary.tasks_completed.saturating_add(completed);
        }
        assert!(completed > 0);
        let stored: u32 = colony.world().storages.iter().map(|s| s.count(ItemKind::Wood)).sum();
        assert!(stored > 0);
        assert!(colony.check_invariants().is_ok());
    }
}
