//! Construction sites: buildings in progress.
//!
//! A site accumulates build work until it reaches its required amount.
//! Multi-worker access is arbitrated by the posted task board, not by a
//! reservation on the site itself. A finished site may unlock a facility
//! (bed or workstation) that was registered unbuilt.

use serde::{Deserialize, Serialize};

use colony_types::{Position, ResourceId};

/// A building under construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSite {
    id: ResourceId,
    position: Position,
    required_work: f32,
    progress: f32,
    unlocks: Option<ResourceId>,
}

impl ConstructionSite {
    /// Create a site needing `required_work` units of work.
    pub fn new(position: Position, required_work: f32) -> Self {
        Self {
            id: ResourceId::new(),
            position,
            required_work: required_work.max(0.0),
            progress: 0.0,
            unlocks: None,
        }
    }

    /// Create a site that finishes the construction of `facility` when done.
    pub fn for_facility(position: Position, required_work: f32, facility: ResourceId) -> Self {
        Self {
            unlocks: Some(facility),
            ..Self::new(position, required_work)
        }
    }

    /// Stable identifier.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Where the site is.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Total work required.
    pub const fn required_work(&self) -> f32 {
        self.required_work
    }

    /// Work applied so far.
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// The facility this site finishes, if any.
    pub const fn unlocks(&self) -> Option<ResourceId> {
        self.unlocks
    }

    /// Whether the building is finished.
    pub fn is_complete(&self) -> bool {
        self.progress >= self.required_work
    }

    /// Apply build work. Returns `true` if this call finished the building.
    pub fn apply_work(&mut self, amount: f32) -> bool {
        if self.is_complete() {
            return false;
        }
        self.progress = (self.progress + amount.max(0.0)).min(self.required_work);
        self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_exactly_once() {
        let mut site = ConstructionSite::new(Position::ORIGIN, 5.0);
        assert!(!site.apply_work(3.0));
        assert!(site.apply_work(3.0));
        assert!(site.is_complete());
        assert!(!site.apply_work(1.0));
        assert!((site.progress() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn facility_link_is_kept() {
        let facility = ResourceId::new();
        let site = ConstructionSite::for_facility(Position::ORIGIN, 1.0, facility);
        assert_eq!(site.unlocks(), Some(facility));
    }
}
