//! Work on a posted construction job.
//!
//! The posting on the board carries the worker seat; the site carries the
//! build progress. Work is rate-limited to `construct_interval` ticks and
//! only applied within `construct_range`.

use tracing::debug;

use colony_agents::Unit;
use colony_types::{
    AgentId, FailureReason, Notification, Position, PostedTaskId, ResourceId, TaskState,
};

use super::{TaskStep, WorkTimer, approach};
use crate::world::WorldState;

/// Construction task state.
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    site: ResourceId,
    posting: PostedTaskId,
    at: Position,
    timer: WorkTimer,
}

impl Construct {
    /// Build `site` as a worker of `posting`.
    pub const fn new(site: ResourceId, posting: PostedTaskId, at: Position) -> Self {
        Self {
            site,
            posting,
            at,
            timer: WorkTimer::new(),
        }
    }

    /// The posting whose seat this task holds.
    pub const fn posting(&self) -> PostedTaskId {
        self.posting
    }
}

impl TaskStep for Construct {
    fn start(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        if world.site(self.site).is_none() {
            return Err(FailureReason::TargetMissing);
        }
        if !world.board.try_assign(self.posting, unit.id()) {
            return Err(FailureReason::PostingRejected);
        }
        Ok(())
    }

    fn execute(&mut self, unit: &mut dyn Unit, world: &mut WorldState) -> Result<(), FailureReason> {
        let Some(site) = world.site(self.site) else {
            // A vanished site means the job is over; is_complete reports it.
            return Ok(());
        };
        if site.is_complete() {
            return Ok(());
        }
        let at = site.position();
        if !approach(unit, at, world.tasks.construct_range) {
            return Ok(());
        }
        unit.stop();
        if !self.timer.tick(world.tasks.construct_interval) {
            return Ok(());
        }

        let amount = unit.work_speed();
        let finished = world.site_mut(self.site).is_some_and(|s| s.apply_work(amount));
        if world.board.advance(self.posting, amount) {
            world.events.push(Notification::PostedTaskCompleted {
                posted: self.posting,
            });
        }
        if finished {
            let unlocks = world.site(self.site).and_then(|s| s.unlocks());
            debug!(site = %self.site, agent = %unit.id(), unlocks = ?unlocks, "Construction finished");
            // The site is authoritative for completion.
            if world.board.complete(self.posting) {
                world.events.push(Notification::PostedTaskCompleted {
                    posted: self.posting,
                });
            }
            if let Some(facility) = unlocks {
                world.complete_facility(facility);
            }
        }
        Ok(())
    }

    fn is_complete(&self, _unit: &dyn Unit, world: &WorldState) -> Result<bool, FailureReason> {
        Ok(world.site(self.site).is_none_or(|s| s.is_complete()))
    }

    fn cleanup(
        &mut self,
        agent: AgentId,
        _unit: Option<&mut dyn Unit>,
        world: &mut WorldState,
        _outcome: TaskState,
    ) {
        world.board.release(self.posting, agent);
    }

    fn target(&self) -> Position {
        self.at
    }

    fn target_resource(&self) -> Option<ResourceId> {
        Some(self.site)
    }
}

#[cfg(test)]
mod tests {
    use colony_types::{PostingState, TaskData, TaskKind, TaskPriority};
    use colony_world::{Bed, ConstructionSite, Reservable};

    use super::super::Task;
    use super::super::test_support::{run, unit_at, world};
    use super::*;

    fn post_site(world: &mut WorldState, site: ConstructionSite, max_workers: u32) -> (ResourceId, PostedTaskId) {
        let id = site.id();
        let data = TaskData {
            kind: TaskKind::Construct,
            priority: TaskPriority::Normal,
            target: site.position(),
            target_resource: Some(id),
            max_workers,
            required_work: site.required_work(),
        };
        world.sites.push(site);
        (id, world.board.post(data, id))
    }

    #[test]
    fn builds_site_and_completes_posting() {
        let mut world = world();
        world.tasks.construct_interval = 1;
        let (site, posting) = post_site(&mut world, ConstructionSite::new(Position::new(3.0, 0.0), 3.0), 1);
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::construct(site, posting, Position::new(3.0, 0.0));

        assert_eq!(run(&mut task, &mut unit, &mut world, 20), TaskState::Completed);
        assert!(world.site(site).is_some_and(ConstructionSite::is_complete));
        assert_eq!(
            world.board.get(posting).map(|p| p.state()),
            Some(PostingState::Completed)
        );
        // The seat was released on completion.
        assert_eq!(world.board.get(posting).map(|p| p.worker_count()), Some(0));
    }

    #[test]
    fn full_posting_rejects_worker() {
        let mut world = world();
        let (site, posting) = post_site(&mut world, ConstructionSite::new(Position::ORIGIN, 10.0), 1);
        let mut first = unit_at(0.0, 0.0);
        let mut second = unit_at(0.0, 0.0);
        let mut a = Task::construct(site, posting, Position::ORIGIN);
        let mut b = Task::construct(site, posting, Position::ORIGIN);

        assert_eq!(a.start(&mut first, &mut world), TaskState::InProgress);
        assert_eq!(b.start(&mut second, &mut world), TaskState::Failed);
        assert_eq!(b.failure(), Some(FailureReason::PostingRejected));

        assert!(a.cancel(Some(&mut first), &mut world));
        assert_eq!(world.board.get(posting).map(|p| p.state()), Some(PostingState::Available));
    }

    #[test]
    fn work_is_rate_limited() {
        let mut world = world();
        world.tasks.construct_interval = 3;
        let (site, posting) = post_site(&mut world, ConstructionSite::new(Position::ORIGIN, 100.0), 1);
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::construct(site, posting, Position::ORIGIN);
        for _ in 0..6 {
            task.step(&mut unit, &mut world);
        }
        let progress = world.site(site).map_or(0.0, ConstructionSite::progress);
        assert!((progress - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn finishing_site_builds_bed_and_houses_unit() {
        let mut world = world();
        world.tasks.construct_interval = 1;
        let bed = Bed::unbuilt(Position::new(1.0, 1.0), 10);
        let bed_id = bed.id();
        world.beds.register(bed, &mut world.events);
        let mut unit = unit_at(0.0, 0.0);
        world.beds.add_consumer(unit.id, &mut world.events);
        assert_eq!(world.beds.resource_of(unit.id), None);

        let site = ConstructionSite::for_facility(Position::ORIGIN, 1.0, bed_id);
        let (site, posting) = post_site(&mut world, site, 1);
        let mut task = Task::construct(site, posting, Position::ORIGIN);
        assert_eq!(run(&mut task, &mut unit, &mut world, 5), TaskState::Completed);
        assert_eq!(world.beds.resource_of(unit.id), Some(bed_id));
    }

    #[test]
    fn vanished_site_ends_the_job() {
        let mut world = world();
        let (site, posting) = post_site(&mut world, ConstructionSite::new(Position::ORIGIN, 10.0), 2);
        let mut unit = unit_at(0.0, 0.0);
        let mut task = Task::construct(site, posting, Position::ORIGIN);
        task.start(&mut unit, &mut world);
        world.sites.clear();
        assert_eq!(task.step(&mut unit, &mut world), TaskState::Completed);
        assert_eq!(world.board.get(posting).map(|p| p.worker_count()), Some(0));
    }
}
