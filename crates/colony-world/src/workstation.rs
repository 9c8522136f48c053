//! Workstations: open resources with a single worker slot and queued work.
//!
//! The worker slot is the reservation's occupancy. A workstation accepts
//! work while it has a queued job that is not finished. Working is an
//! explicit phase: [`Workstation::begin_work`] sets the working flag,
//! [`Workstation::apply_work`] clears it when the job finishes, and
//! [`Workstation::force_stop`] clears it while setting the `interrupted`
//! flag, so an external stop is never mistaken for a finished job.

use serde::{Deserialize, Serialize};

use colony_types::{AgentId, Position, ResourceId, ResourceKind};

use crate::provider::Reservable;
use crate::reservation::{OccupancyGate, ReservationHolder};

/// A crafting or processing station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workstation {
    id: ResourceId,
    position: Position,
    built: bool,
    work_required: f32,
    work_done: f32,
    working: bool,
    interrupted: bool,
    jobs_completed: u32,
    reservation: ReservationHolder<AgentId>,
}

impl Workstation {
    /// Create a built workstation with no queued work.
    pub fn new(position: Position) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            built: true,
            work_required: 0.0,
            work_done: 0.0,
            working: false,
            interrupted: false,
            jobs_completed: 0,
            reservation: ReservationHolder::new(OccupancyGate::Open),
        }
    }

    /// Create a workstation that still needs construction.
    pub fn unbuilt(position: Position) -> Self {
        Self {
            built: false,
            ..Self::new(position)
        }
    }

    /// Queue `work` more units of work.
    pub fn queue_job(&mut self, work: f32) {
        if work > 0.0 {
            self.work_required += work;
        }
    }

    /// Whether more work can be applied.
    pub fn accepts_work(&self) -> bool {
        self.built && self.work_done < self.work_required
    }

    /// Whether a worker is actively working.
    pub const fn is_working(&self) -> bool {
        self.working
    }

    /// Whether the last working phase was stopped externally.
    pub const fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Work still outstanding.
    pub fn remaining_work(&self) -> f32 {
        (self.work_required - self.work_done).max(0.0)
    }

    /// Number of queued jobs that reached their required work.
    pub const fn jobs_completed(&self) -> u32 {
        self.jobs_completed
    }

    /// Take the worker slot. Fails if the slot is taken, the station is
    /// not built, or there is nothing to work on.
    pub fn try_acquire_worker(&mut self, worker: AgentId) -> bool {
        if !self.accepts_work() {
            return false;
        }
        if !self.reservation.start_occupancy(worker, self.built) {
            return false;
        }
        self.interrupted = false;
        true
    }

    /// Give the worker slot back. Returns `false` if `worker` did not hold
    /// it. Any working phase ends.
    pub fn release_worker(&mut self, worker: AgentId) -> bool {
        if !self.reservation.is_occupied_by(worker) {
            return false;
        }
        self.working = false;
        self.reservation.end_occupancy(false, false);
        true
    }

    /// Whether `worker` holds the worker slot.
    pub fn is_worked_by(&self, worker: AgentId) -> bool {
        self.reservation.is_occupied_by(worker)
    }

    /// Enter the working phase. Requires an occupied slot and queued work.
    pub fn begin_work(&mut self) -> bool {
        if !self.reservation.is_occupied() || !self.accepts_work() {
            return false;
        }
        self.working = true;
        self.interrupted = false;
        true
    }

    /// Apply `amount` units of work. Returns `true` when this finishes the
    /// queued work, which also ends the working phase.
    pub fn apply_work(&mut self, amount: f32) -> bool {
        if !self.working {
            return false;
        }
        self.work_done += amount.max(0.0);
        if self.work_done >= self.work_required {
            self.work_done = self.work_required;
            self.working = false;
            self.jobs_completed = self.jobs_completed.saturating_add(1);
            return true;
        }
        false
    }

    /// Stop the working phase from outside (power loss, player order).
    pub const fn force_stop(&mut self) {
        if self.working {
            self.working = false;
            self.interrupted = true;
        }
    }
}

impl Reservable for Workstation {
    const KIND: ResourceKind = ResourceKind::Workstation;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn reservation(&self) -> &ReservationHolder<AgentId> {
        &self.reservation
    }

    fn reservation_mut(&mut self) -> &mut ReservationHolder<AgentId> {
        &mut self.reservation
    }

    fn is_usable(&self) -> bool {
        self.built
    }

    fn complete_construction(&mut self) -> bool {
        let changed = !self.built;
        self.built = true;
        changed
    }

    fn is_available(&self) -> bool {
        self.accepts_work() && !self.reservation.is_occupied() && self.reservation.owner().is_none()
    }
}
