//! Work the queued job at a workstation.
//!
//! The worker slot is acquired on start and released on every terminal
//! path, completion included: the slot is scoped to the task's lifetime.
//! An external force-stop fails the task with
//! [`FailureReason::Interrupted`] instead of passing for completion.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{AgentId, FailureReason, Position, ResourceId, TaskState};
use colony_world::Reservable;

use super::{TaskStep, WorkTimer, approach};
use crate::world::WorldState;

/// Workstation task state.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkstationJob {
    station: ResourceId,
    at: Position,
    timer: WorkTimer,
    started: bool,
}

impl WorkstationJob {
    /// Work at `station`.
    pub const fn new(station: ResourceId, at: Position) -> Self {
        Self {
            station,
            at,
            timer: WorkTimer::new(),
            started: false,
        }
    }

    /// Whether the working phase has begun.
    pub const fn has_started(&self) -> bool {
        self.started
    }
}

impl TaskStep for WorkstationJob {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let station = world
            .workstations
            .get_mut(self.station)
            .ok_or(FailureReason::TargetMissing)?;
        self.at = station.position();
        if !station.try_acquire_worker(unit.id()) {
            return Err(FailureReason::ReservationRejected);
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let range = world.tasks.workstation_range;
        let interval = world.tasks.workstation_interval;
        let station = world
            .workstations
            .get_mut(self.station)
            .ok_or(FailureReason::TargetMissing)?;
        if !approach(unit, station.position(), range) {
            return Ok(());
        }
        unit.stop();

        if !self.started {
            if station.begin_work() {
                self.started = true;
                debug!(station = %self.station, agent = %unit.id(), "Work started");
            }
            return Ok(());
        }
        if self.timer.tick(interval) && station.apply_work(unit.work_speed()) {
            debug!(station = %self.station, agent = %unit.id(), "Workstation job finished");
        }
        Ok(())
    }

    fn is_complete(&self, _unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        let station = world
            .workstations
            .get(self.station)
            .ok_or(FailureReason::TargetMissing)?;
        if self.started && station.was_interrupted() {
            return Err(FailureReason::Interrupted);
        }
        Ok(!station.accepts_work() || (self.started && !station.is_working()))
    }

    fn cleanup(
        &mut self,
        agent: AgentId,
        _unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
        _outcome: TaskState,
    ) {
        if let Some(station) = world.workstations.get_mut(self.station) {
            station.release_worker(agent);
        }
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.station)
    }
}

#[cfg(test)]
mod tests {
    use colony_world::Workstation;

    use super::super::Task;
    use super::super::test_support::{run, unit_at, world};
    use super::*;

    fn add_station(world: &mut WorldState, work: f32, at: Position) -> ResourceId {
        let mut station = Workstation::new(at);
        station.queue_job(work);
        let id = station.id();
        world.workstations.register(station, &mut world.events);
        id
    }

    fn worker_of(world: &WorldState, id: ResourceId) -> Option<AgentId> {
        world.workstations.get(id).and_then(|w| w.reservation().occupant())
    }

    #[test]
    fn completes_job_and_releases_slot() {
        let mut world = world();
        let id = add_station(&mut world, 3.0, Position::new(2.0, 0.0));
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::workstation(id, Position::new(2.0, 0.0));
        assert_eq!(run(&mut task, &mut unit, &mut world, 20), TaskState::Completed);
        assert_eq!(worker_of(&world, id), None);
        assert_eq!(world.workstations.get(id).map(Workstation::jobs_completed), Some(1));
    }

    #[test]
    fn occupied_station_fails_immediately() {
        let mut world = world();
        let id = add_station(&mut world, 3.0, Position::ORIGIN);
        let mut first = unit_at(0.0, 0.0);
        let mut second = unit_at(0.0, 0.0);
        let mut a = Task::workstation(id, Position::ORIGIN);
        let mut b = Task::workstation(id, Position::ORIGIN);
        assert_eq!(a.start(&mut first, &mut world), TaskState::InProgress);
        assert_eq!(b.start(&mut second, &mut world), TaskState::Failed);
        assert_eq!(b.failure(), Some(FailureReason::ReservationRejected));
        // The loser's cleanup must not free the winner's slot.
        assert_eq!(worker_of(&world, id), Some(first.id));
    }

    #[test]
    fn force_stop_fails_with_interrupted() {
        let mut world = world();
        let id = add_station(&mut world, 50.0, Position::ORIGIN);
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::workstation(id, Position::ORIGIN);
        assert_eq!(task.step(&mut unit, &mut world), TaskState::InProgress);
        assert!(world.workstations.get(id).is_some_and(Workstation::is_working));

        if let Some(station) = world.workstations.get_mut(id) {
            station.force_stop();
        }
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Failed);
        assert_eq!(task.failure(), Some(FailureReason::Interrupted));
        assert_eq!(worker_of(&world, id), None);
    }

    #[test]
    fn cancel_releases_slot() {
        let mut world = world();
        let id = add_station(&mut world, 50.0, Position::new(4.0, 0.0));
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::workstation(id, Position::new(4.0, 0.0));
        task.step(&mut unit, &mut world);
        assert_eq!(worker_of(&world, id), Some(unit.id));
        assert!(task.cancel(Some(&mut unit), &mut world));
        assert_eq!(worker_of(&world, id), None);
        assert!(world.workstations.get(id).is_some_and(Reservable::is_available));
    }
}
