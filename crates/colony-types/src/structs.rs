//! Core value structs: positions and posted-task definitions.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{TaskKind, TaskPriority};
use crate::ids::ResourceId;

/// A point on the colony's ground plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// East-west coordinate.
    pub x: f32,
    /// North-south coordinate.
    pub y: f32,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.hypot(dy)
    }

    /// Move up to `step` units towards `target`, never overshooting.
    pub fn step_towards(self, target: Self, step: f32) -> Self {
        let remaining = self.distance(target);
        if remaining <= step || remaining <= f32::EPSILON {
            return target;
        }
        let t = step / remaining;
        Self {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Return this position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Immutable definition of a shared job posted to the task board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TaskData {
    /// What kind of work the job asks for.
    pub kind: TaskKind,
    /// Urgency used when agents choose between postings.
    pub priority: TaskPriority,
    /// Where the work happens.
    pub target: Position,
    /// The resource the work is applied to, if any.
    pub target_resource: Option<ResourceId>,
    /// Maximum number of agents that may work the job at once.
    pub max_workers: u32,
    /// Total work units required to complete the job.
    pub required_work: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn step_towards_does_not_overshoot() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        assert_eq!(a.step_towards(b, 5.0), b);

        let halfway = a.step_towards(Position::new(10.0, 0.0), 2.5);
        assert!((halfway.x - 2.5).abs() < 1e-6);
        assert!(halfway.y.abs() < 1e-6);
    }
}
