//! Resource-side state shared by every task: registries, sites, nodes,
//! stockpiles, the posted board, and the notification queue.
//!
//! Fields are public so a task can borrow two collections at once (a
//! harvest node and the item registry, say). Lifecycle operations that
//! must keep several collections in step live on
//! [`Colony`](crate::colony::Colony).

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use colony_agents::Unit;
use colony_types::{ItemKind, Notification, Position, ResourceId};
use colony_world::{
    BedRegistry, ConstructionSite, DroppableItem, NotificationQueue, ResourceNode,
    ResourceRegistry, Storage, Workstation,
};

use crate::board::PostedTaskBoard;
use crate::config::{BedConfig, TaskConfig};

/// Everything tasks act on besides the agent itself.
#[derive(Debug)]
pub struct WorldState {
    /// Beds, auto-matched to units.
    pub beds: BedRegistry,
    /// Workstations; the worker slot is reserved per task.
    pub workstations: ResourceRegistry<Workstation>,
    /// Loose items; ownership is the pickup reservation.
    pub items: ResourceRegistry<DroppableItem>,
    /// Buildings under construction, in placement order.
    pub sites: Vec<ConstructionSite>,
    /// Harvestable nodes, in placement order.
    pub nodes: Vec<ResourceNode>,
    /// Stockpiles, in placement order.
    pub storages: Vec<Storage>,
    /// Shared multi-worker jobs.
    pub board: PostedTaskBoard,
    /// Notifications raised since the last drain.
    pub events: NotificationQueue,
    /// Task policy constants.
    pub tasks: TaskConfig,
    /// Bed and sleep settings.
    pub bed_config: BedConfig,
    rng: StdRng,
}

impl WorldState {
    /// Create an empty world.
    pub fn new(tasks: TaskConfig, bed_config: BedConfig, seed: u64) -> Self {
        Self {
            beds: BedRegistry::new(bed_config.auto_assign),
            workstations: ResourceRegistry::new(false),
            items: ResourceRegistry::new(false),
            sites: Vec::new(),
            nodes: Vec::new(),
            storages: Vec::new(),
            board: PostedTaskBoard::new(),
            events: NotificationQueue::new(),
            tasks,
            bed_config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The world's seeded random source.
    pub const fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Look up a construction site.
    pub fn site(&self, id: ResourceId) -> Option<&ConstructionSite> {
        self.sites.iter().find(|s| s.id() == id)
    }

    /// Look up a construction site mutably.
    pub fn site_mut(&mut self, id: ResourceId) -> Option<&mut ConstructionSite> {
        self.sites.iter_mut().find(|s| s.id() == id)
    }

    /// Look up a harvest node.
    pub fn node(&self, id: ResourceId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Look up a harvest node mutably.
    pub fn node_mut(&mut self, id: ResourceId) -> Option<&mut ResourceNode> {
        self.nodes.iter_mut().find(|n| n.id() == id)
    }

    /// Look up a storage.
    pub fn storage(&self, id: ResourceId) -> Option<&Storage> {
        self.storages.iter().find(|s| s.id() == id)
    }

    /// Look up a storage mutably.
    pub fn storage_mut(&mut self, id: ResourceId) -> Option<&mut Storage> {
        self.storages.iter_mut().find(|s| s.id() == id)
    }

    /// Whether any collection holds a resource with this ID.
    pub fn contains(&self, id: ResourceId) -> bool {
        self.beds.contains(id)
            || self.workstations.contains(id)
            || self.items.contains(id)
            || self.site(id).is_some()
            || self.node(id).is_some()
            || self.storage(id).is_some()
    }

    /// Put a stack of items on the ground. Empty stacks are not created.
    pub fn drop_item(
        &mut self,
        kind: ItemKind,
        quantity: u32,
        position: Position,
    ) -> Option<ResourceId> {
        if quantity == 0 {
            return None;
        }
        let item = DroppableItem::new(kind, quantity, position);
        let id = colony_world::Reservable::id(&item);
        self.items.register(item, &mut self.events);
        debug!(resource = %id, item = %kind, quantity, "Item dropped");
        Some(id)
    }

    /// Mark a bed or workstation as built. Beds are offered to unhoused
    /// units straight away.
    pub fn complete_facility(&mut self, id: ResourceId) -> bool {
        self.beds.complete_construction(id, &mut self.events)
            || self.workstations.complete_construction(id, &mut self.events)
    }

    /// Nearest storage with room left.
    pub fn nearest_open_storage(&self, position: Position) -> Option<&Storage> {
        nearest(self.storages.iter().filter(|s| !s.is_full()), position, Storage::position)
    }

    /// Nearest node with yield left.
    pub fn nearest_node(&self, position: Position) -> Option<&ResourceNode> {
        nearest(
            self.nodes.iter().filter(|n| !n.is_depleted()),
            position,
            ResourceNode::position,
        )
    }
}

/// Remove `amount` morale from `unit` and announce it.
pub fn apply_morale_penalty(
    unit: &mut dyn Unit,
    amount: u32,
    cause: &str,
    events: &mut NotificationQueue,
) {
    if amount == 0 {
        return;
    }
    let delta = 0_i32.saturating_sub(i32::try_from(amount).unwrap_or(i32::MAX));
    unit.adjust_morale(delta);
    info!(agent = %unit.id(), amount, cause, morale = unit.morale(), "Morale penalty");
    events.push(Notification::MoralePenalty {
        agent: unit.id(),
        amount,
        cause: cause.to_owned(),
    });
}

/// Minimum-distance element; the first one wins ties.
fn nearest<'a, T, I, F>(candidates: I, position: Position, pos_of: F) -> Option<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> Position,
{
    let mut best: Option<(&T, f32)> = None;
    for candidate in candidates {
        let distance = position.distance(pos_of(candidate));
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(c, _)| c)
}
