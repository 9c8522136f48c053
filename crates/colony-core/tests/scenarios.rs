//! End-to-end scenarios for reservations, task lifecycles, and the tick
//! cycle.
//!
//! Each test drives a [`Colony`] through its public API only: lifecycle
//! calls, task assignment, and [`run_tick`].

#![allow(clippy::unwrap_used)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use colony_agents::Unit;
use colony_core::task::TaskVariant;
use colony_core::{Behavior, Colony, SimulationConfig, Task, WorldState, run_tick};
use colony_types::{
    AgentId, FailureReason, ItemKind, Notification, PostingState, Position, ResourceId, TaskKind,
};
use colony_world::{ConstructionSite, Reservable};

/// Only advances tasks that were assigned explicitly.
struct Passive;

impl Behavior for Passive {
    fn next_task(&mut self, _unit: &dyn Unit, _world: &WorldState) -> Option<Task> {
        None
    }
}

fn colony_with(config: &SimulationConfig) -> Colony {
    Colony::new(config).unwrap()
}

fn failures(notifications: &[Notification], agent: AgentId) -> Vec<FailureReason> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::TaskFailed {
                agent: a, reason, ..
            } if *a == agent => Some(*reason),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Beds
// ---------------------------------------------------------------------------

#[test]
fn bed_auto_match_then_homeless_penalty() {
    let mut config = SimulationConfig::default();
    config.beds.homeless_interval_ticks = 5;
    config.beds.homeless_penalty = 3;
    let mut colony = colony_with(&config);

    let bed = colony.add_bed(Position::new(2.0, 0.0));
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    assert_eq!(colony.world().beds.resource_of(ada), Some(bed));

    colony.destroy_resource(bed).unwrap();
    assert_eq!(colony.world().beds.resource_of(ada), None);
    assert_eq!(colony.world().beds.unmatched_consumers(), vec![ada]);

    let morale = colony.agent(ada).unwrap().morale;
    let mut penalized_at = None;
    for _ in 0..5 {
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        let homeless = summary.notifications.iter().any(|n| {
            matches!(n, Notification::MoralePenalty { agent, cause, .. } if *agent == ada && cause == "homeless")
        });
        if homeless {
            penalized_at = Some(summary.tick);
        }
    }
    assert_eq!(penalized_at, Some(5));
    assert!(colony.agent(ada).unwrap().morale < morale);
}

#[test]
fn new_bed_goes_to_first_homeless_unit() {
    let mut colony = colony_with(&SimulationConfig::default());
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    let bob = colony.spawn_agent("Bob", Position::ORIGIN).unwrap();
    let first = colony.add_bed(Position::ORIGIN);
    assert_eq!(colony.world().beds.resource_of(ada), Some(first));
    assert_eq!(colony.world().beds.resource_of(bob), None);

    let second = colony.add_bed(Position::new(1.0, 0.0));
    assert_eq!(colony.world().beds.resource_of(bob), Some(second));
    assert!(colony.check_invariants().is_ok());
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[test]
fn removed_agent_releases_pickup_reservation() {
    let mut colony = colony_with(&SimulationConfig::default());
    let at = Position::new(10.0, 0.0);
    let item = colony.drop_item(ItemKind::Stone, 2, at).unwrap();
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    let bob = colony.spawn_agent("Bob", Position::new(9.0, 0.0)).unwrap();

    colony.assign_task(ada, Task::pickup(item, at)).unwrap();
    run_tick(&mut colony, &mut Passive).unwrap();
    let owner = |c: &Colony| c.world().items.get(item).and_then(|i| i.reservation().owner());
    assert_eq!(owner(&colony), Some(ada));

    // Bob cannot take it while Ada holds it.
    colony.assign_task(bob, Task::pickup(item, at)).unwrap();
    let summary = run_tick(&mut colony, &mut Passive).unwrap();
    assert_eq!(failures(&summary.notifications, bob), vec![FailureReason::ReservationRejected]);

    colony.remove_agent(ada).unwrap();
    assert_eq!(owner(&colony), None);

    colony.assign_task(bob, Task::pickup(item, at)).unwrap();
    for _ in 0..5 {
        run_tick(&mut colony, &mut Passive).unwrap();
    }
    assert_eq!(colony.agent(bob).unwrap().carried(ItemKind::Stone), 2);
    assert!(!colony.world().items.contains(item));
}

// ---------------------------------------------------------------------------
// Workstations
// ---------------------------------------------------------------------------

#[test]
fn destroyed_workstation_fails_task_and_frees_slot() {
    let mut colony = colony_with(&SimulationConfig::default());
    let at = Position::new(1.0, 0.0);
    let station = colony.add_workstation(at, 100.0);
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    colony.assign_task(ada, Task::workstation(station, at)).unwrap();

    run_tick(&mut colony, &mut Passive).unwrap();
    run_tick(&mut colony, &mut Passive).unwrap();
    let ws = colony.world().workstations.get(station).unwrap();
    assert!(ws.is_worked_by(ada));
    assert!(ws.is_working());

    colony.destroy_resource(station).unwrap();
    let summary = run_tick(&mut colony, &mut Passive).unwrap();
    assert_eq!(failures(&summary.notifications, ada), vec![FailureReason::TargetMissing]);
    assert!(colony.task_of(ada).is_none());
    assert!(!colony.world().workstations.contains(station));
    assert!(
        colony
            .world()
            .workstations
            .iter()
            .all(|w| w.reservation().occupant().is_none())
    );
}

#[test]
fn force_stop_is_not_completion() {
    let mut colony = colony_with(&SimulationConfig::default());
    let station = colony.add_workstation(Position::ORIGIN, 100.0);
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    colony.assign_task(ada, Task::workstation(station, Position::ORIGIN)).unwrap();
    run_tick(&mut colony, &mut Passive).unwrap();

    colony.world_mut().workstations.get_mut(station).unwrap().force_stop();
    let summary = run_tick(&mut colony, &mut Passive).unwrap();
    assert_eq!(failures(&summary.notifications, ada), vec![FailureReason::Interrupted]);
    assert_eq!(summary.tasks_completed, 0);

    let ws = colony.world().workstations.get(station).unwrap();
    assert!(!ws.is_worked_by(ada));
    assert_eq!(ws.jobs_completed(), 0);
}

#[test]
fn finished_job_releases_slot() {
    let mut colony = colony_with(&SimulationConfig::default());
    let station = colony.add_workstation(Position::ORIGIN, 3.0);
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    colony.assign_task(ada, Task::workstation(station, Position::ORIGIN)).unwrap();

    let mut completed = 0_u32;
    for _ in 0..10 {
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        completed = completed.saturating_add(summary.tasks_completed);
    }
    assert_eq!(completed, 1);
    let ws = colony.world().workstations.get(station).unwrap();
    assert_eq!(ws.jobs_completed(), 1);
    assert!(ws.reservation().occupant().is_none());
}

// ---------------------------------------------------------------------------
// Posted task board
// ---------------------------------------------------------------------------

#[test]
fn construction_respects_worker_cap() {
    let mut config = SimulationConfig::default();
    config.tasks.construct_max_workers = 2;
    let mut colony = colony_with(&config);
    let at = Position::new(1.0, 0.0);
    let (site, posting) = colony.add_site(ConstructionSite::new(at, 200.0));
    let ids: Vec<AgentId> = ["Ada", "Bob", "Cy"]
        .iter()
        .map(|name| colony.spawn_agent(name, Position::ORIGIN).unwrap())
        .collect();
    for &id in &ids {
        colony.assign_task(id, Task::construct(site, posting, at)).unwrap();
    }

    let summary = run_tick(&mut colony, &mut Passive).unwrap();
    let state = colony.world().board.get(posting).map(|p| (p.state(), p.worker_count()));
    assert_eq!(state, Some((PostingState::Full, 2)));
    let rejected: Vec<FailureReason> = ids
        .iter()
        .flat_map(|&id| failures(&summary.notifications, id))
        .collect();
    assert_eq!(rejected, vec![FailureReason::PostingRejected]);

    // A worker leaving reopens the seat.
    let first = ids.first().copied().unwrap();
    colony.cancel_task(first).unwrap();
    let state = colony.world().board.get(posting).map(|p| (p.state(), p.worker_count()));
    assert_eq!(state, Some((PostingState::InProgress, 1)));
}

#[test]
fn completed_construction_closes_posting() {
    let mut colony = colony_with(&SimulationConfig::default());
    let at = Position::ORIGIN;
    let (site, posting) = colony.add_site(ConstructionSite::new(at, 2.0));
    let ada = colony.spawn_agent("Ada", at).unwrap();
    colony.assign_task(ada, Task::construct(site, posting, at)).unwrap();

    let mut closed = 0_u32;
    let mut announced = false;
    for _ in 0..10 {
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        closed = closed.saturating_add(summary.postings_closed);
        announced |= summary
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::PostedTaskCompleted { posted } if *posted == posting));
    }
    assert_eq!(closed, 1);
    assert!(announced);
    assert!(colony.world().board.get(posting).is_none());
    assert!(colony.world().site(site).is_some_and(ConstructionSite::is_complete));
}

// ---------------------------------------------------------------------------
// Release on every terminal path, under random interleavings
// ---------------------------------------------------------------------------

/// Every owner or occupant of an item, workstation, or bed slot must be a
/// live agent whose active task targets that resource. Bed ownership is
/// long-lived and only has to point at a live agent.
fn assert_no_orphaned_reservations(colony: &Colony) {
    let holds = |agent: AgentId, resource: ResourceId| {
        colony
            .task_of(agent)
            .is_some_and(|t| t.target_resource() == Some(resource))
    };
    for item in colony.world().items.iter() {
        if let Some(owner) = item.reservation().owner() {
            assert!(holds(owner, item.id()), "item {} held by idle {owner}", item.id());
        }
    }
    for station in colony.world().workstations.iter() {
        if let Some(worker) = station.reservation().occupant() {
            assert!(holds(worker, station.id()), "station {} worked by idle {worker}", station.id());
        }
    }
    for bed in colony.world().beds.iter() {
        if let Some(owner) = bed.reservation().owner() {
            assert!(colony.agent(owner).is_some(), "bed {} owned by dead {owner}", bed.id());
        }
        if let Some(sleeper) = bed.reservation().occupant() {
            let sleeping = colony
                .task_of(sleeper)
                .is_some_and(|t| matches!(t.variant(), TaskVariant::Sleep(s) if s.is_sleeping()));
            assert!(sleeping, "bed {} occupied by {sleeper} without a sleep task", bed.id());
        }
    }
}

#[test]
fn random_interleavings_never_orphan_reservations() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut colony = colony_with(&SimulationConfig::default());
    let mut names = 0_u32;
    let mut spawn = |colony: &mut Colony, rng: &mut StdRng| {
        names = names.saturating_add(1);
        let at = Position::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
        colony.spawn_agent(&format!("Unit{names}"), at).ok()
    };
    for _ in 0..6 {
        spawn(&mut colony, &mut rng);
    }

    for step in 0..400_u32 {
        let agents: Vec<AgentId> = colony.agents().ids().to_vec();
        let at = Position::new(rng.random_range(-6.0..6.0), rng.random_range(-6.0..6.0));
        match rng.random_range(0..10) {
            0 => {
                colony.add_bed(at);
            }
            1 => {
                colony.add_workstation(at, rng.random_range(1.0..8.0));
            }
            2 => {
                colony.drop_item(ItemKind::Wood, rng.random_range(1..4), at);
            }
            3 => {
                if let Some(&agent) = agents.get(rng.random_range(0..agents.len().max(1))) {
                    let task = random_task(&colony, agent, &mut rng);
                    if let Some(task) = task {
                        colony.assign_task(agent, task).unwrap();
                    }
                }
            }
            4 => {
                if let Some(&agent) = agents.get(rng.random_range(0..agents.len().max(1))) {
                    colony.cancel_task(agent).unwrap();
                }
            }
            5 => {
                if let Some(&agent) = agents.get(rng.random_range(0..agents.len().max(1))) {
                    colony.remove_agent(agent).unwrap();
                }
                spawn(&mut colony, &mut rng);
            }
            6 => {
                if let Some(id) = random_resource(&colony, &mut rng) {
                    colony.destroy_resource(id).unwrap();
                }
            }
            _ => {
                run_tick(&mut colony, &mut Passive).unwrap();
            }
        }
        assert!(colony.check_invariants().is_ok(), "invariants broken at step {step}");
        assert_no_orphaned_reservations(&colony);
    }
}

fn random_task(colony: &Colony, agent: AgentId, rng: &mut StdRng) -> Option<Task> {
    let world = colony.world();
    match rng.random_range(0..3) {
        0 => {
            let items: Vec<_> = world.items.iter().collect();
            let item = items.get(rng.random_range(0..items.len().max(1)))?;
            Some(Task::pickup(item.id(), item.position()))
        }
        1 => {
            let stations: Vec<_> = world.workstations.iter().collect();
            let station = stations.get(rng.random_range(0..stations.len().max(1)))?;
            Some(Task::workstation(station.id(), station.position()))
        }
        _ => {
            let bed = world.beds.resource_of(agent).and_then(|id| world.beds.get(id))?;
            Some(Task::sleep(bed.id(), bed.position()))
        }
    }
}

fn random_resource(colony: &Colony, rng: &mut StdRng) -> Option<ResourceId> {
    let world = colony.world();
    let mut ids: Vec<ResourceId> = world.beds.iter().map(Reservable::id).collect();
    ids.extend(world.workstations.iter().map(Reservable::id));
    ids.extend(world.items.iter().map(Reservable::id));
    ids.get(rng.random_range(0..ids.len().max(1))).copied()
}

#[test]
fn task_kinds_are_reported_in_notifications() {
    let mut colony = colony_with(&SimulationConfig::default());
    let ada = colony.spawn_agent("Ada", Position::ORIGIN).unwrap();
    colony.assign_task(ada, Task::move_to(Position::new(2.0, 0.0))).unwrap();
    let mut kinds = Vec::new();
    for _ in 0..6 {
        let summary = run_tick(&mut colony, &mut Passive).unwrap();
        kinds.extend(summary.notifications.iter().filter_map(|n| match n {
            Notification::TaskCompleted { kind, .. } => Some(*kind),
            _ => None,
        }));
    }
    assert_eq!(kinds, vec![TaskKind::Move]);
}
