//! The colony: agents, their task drivers, and the world they act on.
//!
//! Every lifecycle change that has to keep several collections in step
//! (an agent dying, a resource being destroyed) goes through an explicit
//! method here. Nothing relies on callbacks registered at construction.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use colony_agents::{
    AgentConfig, AgentError, AgentRoster, DeathCause, DeathConsequences, UnitState,
    process_death,
};
use colony_types::{
    AgentId, ItemKind, Position, PostedTaskId, ResourceId, TaskData, TaskKind, TaskPriority,
};
use colony_world::{
    Bed, ConstructionSite, OwnerRelease, Reservable, ResourceNode, Storage, Workstation,
    WorldError,
};

use crate::clock::{ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::dispatch::TaskDriver;
use crate::sink::NotificationSink;
use crate::task::Task;
use crate::world::{WorldState, apply_morale_penalty};

/// A running colony.
pub struct Colony {
    pub(crate) world: WorldState,
    pub(crate) agents: AgentRoster,
    pub(crate) drivers: BTreeMap<AgentId, TaskDriver>,
    pub(crate) clock: WorldClock,
    pub(crate) agent_config: AgentConfig,
    pub(crate) sinks: Vec<Box<dyn NotificationSink>>,
}

impl core::fmt::Debug for Colony {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Colony")
            .field("tick", &self.clock.tick())
            .field("agents", &self.agents.len())
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl Colony {
    /// Create an empty colony from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_day` is 0.
    pub fn new(config: &SimulationConfig) -> Result<Self, ClockError> {
        Ok(Self {
            world: WorldState::new(config.tasks.clone(), config.beds.clone(), config.world.seed),
            agents: AgentRoster::new(),
            drivers: BTreeMap::new(),
            clock: WorldClock::new(config.world.ticks_per_day)?,
            agent_config: config.agents.clone(),
            sinks: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Resource-side state.
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable resource-side state, for callers that need to poke at a
    /// provider directly (force-stopping a workstation, say).
    pub const fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// Living agents in join order.
    pub const fn agents(&self) -> &AgentRoster {
        &self.agents
    }

    /// Look up an agent.
    pub fn agent(&self, id: AgentId) -> Option<&UnitState> {
        self.agents.get(id)
    }

    /// Look up an agent mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut UnitState> {
        self.agents.get_mut(id)
    }

    /// The clock.
    pub const fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// Agent tuning shared by every unit.
    pub const fn agent_config(&self) -> &AgentConfig {
        &self.agent_config
    }

    /// The task driver of `agent`.
    pub fn driver(&self, agent: AgentId) -> Option<&TaskDriver> {
        self.drivers.get(&agent)
    }

    /// The active task of `agent`.
    pub fn task_of(&self, agent: AgentId) -> Option<&Task> {
        self.drivers.get(&agent).and_then(TaskDriver::current)
    }

    /// Register a listener for drained notifications.
    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    // -----------------------------------------------------------------------
    // Agents
    // -----------------------------------------------------------------------

    /// Add a unit at `position`. It joins the bed registry as a consumer
    /// and is matched to a free bed straight away when auto-assign is on.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateName`] if the name is taken.
    pub fn spawn_agent(&mut self, name: &str, position: Position) -> Result<AgentId, AgentError> {
        let unit = UnitState::new(name, position, &self.agent_config);
        let id = self.agents.insert(unit)?;
        self.drivers.insert(id, TaskDriver::new(id));
        let bed = self.world.beds.add_consumer(id, &mut self.world.events);
        info!(agent = %id, name, bed = ?bed, "Agent spawned");
        Ok(id)
    }

    /// Remove a unit (death, disconnect).
    ///
    /// The unit leaves the roster first, so its task is cancelled without
    /// a unit to touch. Its posted-task seats and every reservation it
    /// holds are then released.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<UnitState, AgentError> {
        let unit = self.agents.remove(id)?;

        if let Some(mut driver) = self.drivers.remove(&id) {
            driver.cancel(None, &mut self.world);
        }
        let seats = self.world.board.release_agent(id);

        let events = &mut self.world.events;
        let bed = self.world.beds.remove_consumer(id, events);
        self.world.workstations.release_consumer(id, events);
        self.world.items.release_consumer(id, events);
        for station in self.world.workstations.iter_mut() {
            station.release_worker(id);
        }

        // The freed bed may have gone to someone else; their eviction
        // penalties, if any, are applied to live units only.
        self.apply_release(bed);
        info!(agent = %id, name = %unit.name, seats = seats.len(), "Agent removed");
        Ok(unit)
    }

    /// Kill a unit: remove it and drop its inventory where it stood.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn kill_agent(&mut self, id: AgentId, cause: DeathCause) -> Result<DeathConsequences, AgentError> {
        let mut unit = self.remove_agent(id)?;
        let death = process_death(&mut unit, cause);
        for (&kind, &quantity) in &death.dropped_inventory {
            self.world.drop_item(kind, quantity, death.position);
        }
        info!(agent = %id, cause = %cause, age = death.final_age, "Agent died");
        Ok(death)
    }

    /// Install `task` for `agent`, cancelling whatever it was doing.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn assign_task(&mut self, agent: AgentId, task: Task) -> Result<(), AgentError> {
        let (unit, driver) = unit_and_driver(&mut self.agents, &mut self.drivers, agent)?;
        driver.assign(task, unit, &mut self.world);
        Ok(())
    }

    /// Offer `task` to `agent`; it preempts only a less urgent task.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn offer_task(&mut self, agent: AgentId, task: Task) -> Result<bool, AgentError> {
        let (unit, driver) = unit_and_driver(&mut self.agents, &mut self.drivers, agent)?;
        Ok(driver.offer(task, unit, &mut self.world))
    }

    /// Cancel `agent`'s active task.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn cancel_task(&mut self, agent: AgentId) -> Result<bool, AgentError> {
        let (unit, driver) = unit_and_driver(&mut self.agents, &mut self.drivers, agent)?;
        Ok(driver.cancel(Some(unit), &mut self.world))
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// Place a finished bed. Unhoused units are matched to it at once.
    pub fn add_bed(&mut self, position: Position) -> ResourceId {
        self.register_bed(Bed::new(position, self.world.bed_config.sleep_ticks))
    }

    /// Place a bed that has to be built first, together with the
    /// construction site and posting that build it.
    pub fn plan_bed(&mut self, position: Position, required_work: f32) -> (ResourceId, PostedTaskId) {
        let bed = self.register_bed(Bed::unbuilt(position, self.world.bed_config.sleep_ticks));
        let (_, posting) = self.add_site(ConstructionSite::for_facility(position, required_work, bed));
        (bed, posting)
    }

    fn register_bed(&mut self, bed: Bed) -> ResourceId {
        let id = bed.id();
        self.world.beds.register(bed, &mut self.world.events);
        id
    }

    /// Move `agent` into bed `bed`.
    ///
    /// A bed the unit already owned is given up first; if it was asleep
    /// there, it is woken and pays the eviction penalty. The vacated bed
    /// goes to the next unhoused unit. Returns `false` if the bed is
    /// unknown, taken, or unbuilt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown ID.
    pub fn assign_bed(&mut self, agent: AgentId, bed: ResourceId) -> Result<bool, AgentError> {
        if !self.agents.contains(agent) {
            return Err(AgentError::AgentNotFound(agent));
        }
        let outcome = self.world.beds.assign(agent, bed, &mut self.world.events);
        let previous = outcome.previous();
        if previous.is_some() {
            self.world.beds.match_unassigned(&mut self.world.events);
        }
        self.apply_release(previous);
        info!(agent = %agent, bed = %bed, assigned = outcome.is_assigned(), "Bed assignment");
        Ok(outcome.is_assigned())
    }

    /// Place a workstation with `job_work` units of queued work.
    pub fn add_workstation(&mut self, position: Position, job_work: f32) -> ResourceId {
        let mut station = Workstation::new(position);
        station.queue_job(job_work);
        let id = station.id();
        self.world.workstations.register(station, &mut self.world.events);
        id
    }

    /// Put a stack of items on the ground.
    pub fn drop_item(&mut self, kind: ItemKind, quantity: u32, position: Position) -> Option<ResourceId> {
        self.world.drop_item(kind, quantity, position)
    }

    /// Add a construction site and post its job on the board.
    pub fn add_site(&mut self, site: ConstructionSite) -> (ResourceId, PostedTaskId) {
        let id = site.id();
        let data = TaskData {
            kind: TaskKind::Construct,
            priority: TaskPriority::Normal,
            target: site.position(),
            target_resource: Some(id),
            max_workers: self.world.tasks.construct_max_workers,
            required_work: site.required_work(),
        };
        self.world.sites.push(site);
        let posting = self.world.board.post(data, id);
        debug!(site = %id, posted = %posting, "Construction posted");
        (id, posting)
    }

    /// Add a harvest node.
    pub fn add_node(&mut self, node: ResourceNode) -> ResourceId {
        let id = node.id();
        self.world.nodes.push(node);
        id
    }

    /// Add a stockpile.
    pub fn add_storage(&mut self, position: Position, capacity: u32) -> ResourceId {
        let storage = Storage::new(position, capacity);
        let id = storage.id();
        self.world.storages.push(storage);
        id
    }

    /// Destroy a resource of any kind.
    ///
    /// Registry resources release their owner first; an interrupted
    /// sleeper pays the eviction penalty. A destroyed site cancels its
    /// posting and the tasks of everyone working it. Tasks still pointing
    /// at the resource fail on their next step.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ResourceNotFound`] for an unknown ID.
    pub fn destroy_resource(&mut self, id: ResourceId) -> Result<(), WorldError> {
        let world = &mut self.world;
        if let Some(removed) = world.beds.deregister(id, &mut world.events) {
            self.apply_release(removed.release);
        } else if let Some(removed) = world.workstations.deregister(id, &mut world.events) {
            self.apply_release(removed.release);
        } else if let Some(removed) = world.items.deregister(id, &mut world.events) {
            self.apply_release(removed.release);
        } else if let Some(index) = self.world.sites.iter().position(|s| s.id() == id) {
            self.world.sites.remove(index);
            self.cancel_posting_of(id);
        } else if let Some(index) = self.world.nodes.iter().position(|n| n.id() == id) {
            self.world.nodes.remove(index);
        } else if let Some(index) = self.world.storages.iter().position(|s| s.id() == id) {
            self.world.storages.remove(index);
        } else {
            warn!(resource = %id, "Destroy ignored: unknown resource");
            return Err(WorldError::ResourceNotFound(id));
        }
        info!(resource = %id, "Resource destroyed");
        Ok(())
    }

    fn cancel_posting_of(&mut self, owner: ResourceId) {
        let Some(posting) = self.world.board.find_by_owner(owner).map(|p| p.id()) else {
            return;
        };
        for worker in self.world.board.cancel(posting) {
            if let Err(err) = self.cancel_task(worker) {
                warn!(agent = %worker, error = %err, "Posting worker has no driver");
            }
        }
    }

    /// Apply the consequences of a released reservation to its former
    /// owner, if that owner is still alive.
    fn apply_release(&mut self, release: Option<OwnerRelease<AgentId>>) {
        let Some(eviction) = release.and_then(|r| r.eviction) else {
            return;
        };
        if !eviction.penalize {
            return;
        }
        let penalty = self.world.bed_config.eviction_penalty;
        match self.agents.get_mut(eviction.consumer) {
            Some(unit) => apply_morale_penalty(unit, penalty, "evicted", &mut self.world.events),
            None => debug!(agent = %eviction.consumer, "Eviction penalty skipped: agent gone"),
        }
    }

    /// Check every registry's owner bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns the first [`WorldError`] found.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        self.world.beds.check_invariants()?;
        self.world.workstations.check_invariants()?;
        self.world.items.check_invariants()
    }

    pub(crate) fn housed(&self, agent: AgentId) -> bool {
        self.world.beds.resource_of(agent).is_some()
    }

    pub(crate) fn apply_homeless_penalties(&mut self, tick: u64) -> usize {
        let policy = self.world.bed_config.homeless_policy();
        let homeless = policy.penalized(&self.world.beds, tick);
        for &agent in &homeless {
            if let Some(unit) = self.agents.get_mut(agent) {
                apply_morale_penalty(unit, policy.penalty, "homeless", &mut self.world.events);
            }
        }
        homeless.len()
    }
}

/// Split borrow of one agent and its driver, creating the driver if the
/// agent has none yet.
pub(crate) fn unit_and_driver<'a>(
    agents: &'a mut AgentRoster,
    drivers: &'a mut BTreeMap<AgentId, TaskDriver>,
    agent: AgentId,
) -> Result<(&'a mut UnitState, &'a mut TaskDriver), AgentError> {
    let unit = agents.get_mut(agent).ok_or(AgentError::AgentNotFound(agent))?;
    let driver = drivers.entry(agent).or_insert_with(|| TaskDriver::new(agent));
    Ok((unit, driver))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_agents::Unit;
    use colony_types::{Notification, TaskState};

    use super::*;
    use crate::dispatch::Behavior;

    /// Never picks anything; only advances tasks already assigned.
    struct Passive;

    impl Behavior for Passive {
        fn next_task(&mut self, _unit: &dyn Unit, _world: &WorldState) -> Option<Task> {
            None
        }
    }

    fn colony() -> Colony {
        Colony::new(&SimulationConfig::default()).unwrap()
    }

    fn step(colony: &mut Colony, agent: AgentId) -> Option<TaskState> {
        let (unit, driver) = unit_and_driver(&mut colony.agents, &mut colony.drivers, agent).ok()?;
        driver.tick(unit, &mut colony.world, &mut Passive)
    }

    #[test]
    fn spawn_matches_free_bed() {
        let mut colony = colony();
        let bed = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        assert_eq!(colony.world().beds.resource_of(ada), Some(bed));
        assert!(colony.spawn_agent("Ada", Position::ORIGIN).is_err());
        assert!(colony.check_invariants().is_ok());
    }

    #[test]
    fn removing_owner_passes_bed_on() {
        let mut colony = colony();
        let bed = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let bob = colony.spawn_agent("Bob", Position::ORIGIN).unwrap();
        assert_eq!(colony.world().beds.resource_of(bob), None);

        colony.remove_agent(ada).unwrap();
        assert_eq!(colony.world().beds.resource_of(bob), Some(bed));
        assert!(colony.remove_agent(ada).is_err());
        assert!(colony.check_invariants().is_ok());
    }

    #[test]
    fn removing_sleeper_ends_occupancy() {
        let mut colony = colony();
        let bed = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        colony.assign_task(ada, Task::sleep(bed, Position::ORIGIN)).unwrap();
        assert_eq!(step(&mut colony, ada), Some(TaskState::InProgress));
        assert!(colony.world().beds.get(bed).unwrap().is_sleeping(ada));

        colony.remove_agent(ada).unwrap();
        let bed = colony.world().beds.get(bed).unwrap();
        assert!(!bed.reservation().is_occupied());
        assert_eq!(bed.reservation().owner(), None);
    }

    #[test]
    fn kill_drops_inventory() {
        let mut colony = colony();
        let ada = colony.spawn_agent("Ada", Position::new(3.0, 3.0)).unwrap();
        colony.agent_mut(ada).unwrap().inventory.add(ItemKind::Wood, 4).unwrap();

        let death = colony.kill_agent(ada, DeathCause::Starvation).unwrap();
        assert_eq!(death.dropped_inventory.get(&ItemKind::Wood), Some(&4));
        assert_eq!(colony.world().items.len(), 1);
        assert!(colony.agent(ada).is_none());
        assert!(colony.driver(ada).is_none());
    }

    #[test]
    fn destroying_site_cancels_workers() {
        let mut colony = colony();
        let at = Position::new(6.0, 0.0);
        let (site, posting) = colony.add_site(ConstructionSite::new(at, 50.0));
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        colony.assign_task(ada, Task::construct(site, posting, at)).unwrap();
        assert_eq!(step(&mut colony, ada), Some(TaskState::InProgress));
        assert_eq!(colony.world().board.get(posting).unwrap().worker_count(), 1);

        colony.destroy_resource(site).unwrap();
        assert!(colony.task_of(ada).is_none());
        assert_eq!(colony.driver(ada).unwrap().stats().cancelled, 1);
        assert_eq!(colony.world().board.get(posting).unwrap().worker_count(), 0);
        assert!(colony.destroy_resource(site).is_err());
    }

    #[test]
    fn destroying_bed_under_sleeper_penalizes() {
        let mut colony = colony();
        let bed = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        colony.assign_task(ada, Task::sleep(bed, Position::ORIGIN)).unwrap();
        step(&mut colony, ada);
        let before = colony.agent(ada).unwrap().morale;

        colony.destroy_resource(bed).unwrap();
        assert!(colony.agent(ada).unwrap().morale < before);
        assert!(colony.world().events.iter().any(
            |n| matches!(n, Notification::MoralePenalty { cause, .. } if cause == "evicted")
        ));
        // The sleep task notices on its next step.
        assert_eq!(step(&mut colony, ada), Some(TaskState::Failed));
    }

    #[test]
    fn reassigning_sleeper_charges_eviction() {
        let mut colony = colony();
        let first = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let second = colony.add_bed(Position::new(2.0, 0.0));
        assert_eq!(colony.world().beds.resource_of(ada), Some(first));
        colony.assign_task(ada, Task::sleep(first, Position::ORIGIN)).unwrap();
        step(&mut colony, ada);
        assert!(colony.world().beds.get(first).unwrap().is_sleeping(ada));
        let before = colony.agent(ada).unwrap().morale;

        assert!(colony.assign_bed(ada, second).unwrap());
        assert_eq!(colony.world().beds.resource_of(ada), Some(second));
        assert!(colony.agent(ada).unwrap().morale < before);
        assert!(colony.world().events.iter().any(
            |n| matches!(n, Notification::MoralePenalty { agent, cause, .. } if *agent == ada && cause == "evicted")
        ));
        assert_eq!(step(&mut colony, ada), Some(TaskState::Failed));
        assert!(colony.check_invariants().is_ok());
    }

    #[test]
    fn vacated_bed_goes_to_homeless_unit() {
        let mut colony = colony();
        let first = colony.add_bed(Position::ORIGIN);
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let second = colony.add_bed(Position::new(2.0, 0.0));
        let bo = colony.spawn_agent("Bo", Position::ORIGIN).unwrap();
        assert_eq!(colony.world().beds.resource_of(bo), Some(second));
        let world = colony.world_mut();
        world.beds.release_consumer(bo, &mut world.events);
        assert_eq!(colony.world().beds.unmatched_consumers(), vec![bo]);

        assert!(colony.assign_bed(ada, second).unwrap());
        assert_eq!(colony.world().beds.resource_of(ada), Some(second));
        assert_eq!(colony.world().beds.resource_of(bo), Some(first));
        // Ada was awake, so moving costs nothing.
        assert!(!colony.world().events.iter().any(|n| matches!(n, Notification::MoralePenalty { .. })));

        assert!(!colony.assign_bed(bo, second).unwrap());
        assert_eq!(colony.world().beds.resource_of(bo), Some(first));
        assert!(matches!(
            colony.assign_bed(AgentId::new(), first),
            Err(AgentError::AgentNotFound(_))
        ));
        assert!(colony.check_invariants().is_ok());
    }

    #[test]
    fn planned_bed_is_built_by_construction() {
        let mut colony = colony();
        let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
        let (bed, posting) = colony.plan_bed(Position::new(1.0, 0.0), 2.0);
        assert_eq!(colony.world().beds.resource_of(ada), None);

        let site = colony.world().board.get(posting).unwrap().owner();
        colony
            .assign_task(ada, Task::construct(site, posting, Position::new(1.0, 0.0)))
            .unwrap();
        for _ in 0..10 {
            if step(&mut colony, ada).is_none_or(TaskState::is_terminal) {
                break;
            }
        }
        assert_eq!(colony.world().beds.resource_of(ada), Some(bed));
    }
}
