//! Starting colony layout.
//!
//! At startup the spawner scatters beds, workstations, construction sites,
//! harvest nodes, and storages around the origin, then adds the starting
//! units. Beds go in before units so the bed registry can house them on
//! arrival. Placement is seeded, so the same seed gives the same layout.

use colony_core::Colony;
use colony_core::config::SpawnConfig;
use colony_types::{AgentId, ItemKind, Position};
use colony_world::ResourceNode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of unit names. Picked without replacement; once it runs
/// out, names repeat with a numeric suffix.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze", "Iris", "Juniper",
    "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine", "Quill", "Reed", "Sage", "Thorn",
    "Umber", "Vale", "Wren", "Yarrow",
];

// -----------------------------------------------------------------------
// Spawning result
// -----------------------------------------------------------------------

/// What the spawner put into the colony.
#[derive(Debug, Default)]
pub struct SpawnReport {
    /// Units in join order.
    pub agents: Vec<AgentId>,
    /// Built beds.
    pub beds: u32,
    /// Workstations with a queued job.
    pub workstations: u32,
    /// Construction sites, each posted on the board.
    pub sites: u32,
    /// Trees and bushes.
    pub nodes: u32,
    /// Storages.
    pub storages: u32,
}

/// Populate `colony` with the layout described by `spawn`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the scatter radius is not a finite,
/// non-negative number, or [`EngineError::Agent`] if a unit cannot join.
pub fn populate(colony: &mut Colony, spawn: &SpawnConfig, seed: u64) -> Result<SpawnReport, EngineError> {
    if !spawn.radius.is_finite() || spawn.radius < 0.0 {
        return Err(EngineError::Spawner {
            message: format!("spawn radius must be finite and non-negative, got {}", spawn.radius),
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let radius = spawn.radius;
    let mut report = SpawnReport::default();

    for _ in 0..spawn.beds {
        colony.add_bed(scatter(&mut rng, radius));
        report.beds = report.beds.saturating_add(1);
    }
    for _ in 0..spawn.workstations {
        colony.add_workstation(scatter(&mut rng, radius), spawn.workstation_job_work);
        report.workstations = report.workstations.saturating_add(1);
    }
    for _ in 0..spawn.construction_sites {
        colony.plan_bed(scatter(&mut rng, radius), spawn.construction_work);
        report.sites = report.sites.saturating_add(1);
    }
    for _ in 0..spawn.trees {
        let node = ResourceNode::new(ItemKind::Wood, spawn.node_yield, scatter(&mut rng, radius));
        colony.add_node(node);
        report.nodes = report.nodes.saturating_add(1);
    }
    for _ in 0..spawn.bushes {
        let node = ResourceNode::new(ItemKind::Berries, spawn.node_yield, scatter(&mut rng, radius));
        colony.add_node(node);
        report.nodes = report.nodes.saturating_add(1);
    }
    for _ in 0..spawn.storages {
        colony.add_storage(scatter(&mut rng, radius), spawn.storage_capacity);
        report.storages = report.storages.saturating_add(1);
    }

    let mut pool: Vec<&str> = NAME_POOL.to_vec();
    for round in 0..spawn.agents {
        let name = pick_name(&mut rng, &mut pool, round);
        let id = colony.spawn_agent(&name, scatter(&mut rng, radius))?;
        report.agents.push(id);
    }

    info!(
        agents = report.agents.len(),
        beds = report.beds,
        workstations = report.workstations,
        sites = report.sites,
        nodes = report.nodes,
        storages = report.storages,
        "Starting layout spawned"
    );
    Ok(report)
}

/// A uniformly random point in the square of half-width `radius`.
fn scatter(rng: &mut StdRng, radius: f32) -> Position {
    if radius <= 0.0 {
        return Position::ORIGIN;
    }
    Position::new(rng.random_range(-radius..=radius), rng.random_range(-radius..=radius))
}

/// Take a random name out of `pool`. When the pool is empty, fall back to
/// a numbered name, which is unique because `round` is.
fn pick_name(rng: &mut StdRng, pool: &mut Vec<&str>, round: u32) -> String {
    if pool.is_empty() {
        return format!("Settler {round}");
    }
    let idx = rng.random_range(0..pool.len());
    if idx < pool.len() {
        return pool.swap_remove(idx).to_owned();
    }
    format!("Settler {round}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_core::SimulationConfig;
    use colony_world::Reservable;

    use super::*;

    fn colony() -> Colony {
        Colony::new(&SimulationConfig::default()).unwrap()
    }

    #[test]
    fn default_layout_is_populated() {
        let spawn = SpawnConfig::default();
        let mut colony = colony();
        let report = populate(&mut colony, &spawn, 42).unwrap();

        assert_eq!(report.agents.len(), 6);
        assert_eq!(colony.agents().len(), 6);
        assert_eq!(report.beds, 4);
        // Unbuilt beds from the construction sites are registered too.
        assert_eq!(colony.world().beds.len(), 6);
        assert_eq!(colony.world().board.len(), 2);
        assert_eq!(report.nodes, 7);
        assert!(colony.check_invariants().is_ok());
    }

    #[test]
    fn built_beds_house_first_arrivals() {
        let spawn = SpawnConfig::default();
        let mut colony = colony();
        let report = populate(&mut colony, &spawn, 1).unwrap();
        let housed = report
            .agents
            .iter()
            .filter(|&&id| colony.world().beds.resource_of(id).is_some())
            .count();
        assert_eq!(housed, 4);
        assert_eq!(colony.world().beds.unmatched_consumers().len(), 2);
    }

    #[test]
    fn same_seed_same_layout() {
        let spawn = SpawnConfig::default();
        let mut a = colony();
        let mut b = colony();
        populate(&mut a, &spawn, 9).unwrap();
        populate(&mut b, &spawn, 9).unwrap();

        let positions = |c: &Colony| -> Vec<Position> { c.world().beds.iter().map(Reservable::position).collect() };
        assert_eq!(positions(&a), positions(&b));
        let names = |c: &Colony| -> Vec<String> { c.agents().iter().map(|u| u.name.clone()).collect() };
        assert_eq!(names(&a), names(&b));
    }

    #[test]
    fn names_stay_unique_past_the_pool() {
        let spawn = SpawnConfig {
            agents: 30,
            ..SpawnConfig::default()
        };
        let mut colony = colony();
        let report = populate(&mut colony, &spawn, 3).unwrap();
        assert_eq!(report.agents.len(), 30);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let spawn = SpawnConfig {
            radius: -1.0,
            ..SpawnConfig::default()
        };
        let mut colony = colony();
        let result = populate(&mut colony, &spawn, 3);
        assert!(matches!(result, Err(EngineError::Spawner { .. })));
    }
}
