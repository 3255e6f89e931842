//! Laser rays travelling through a propagation pass.

use crate::math::Vec3;
use crate::scene::{Color, IgnoreSet, LaserSource, ObjectId};

/// One straight stretch of beam between two interactions.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction of travel
    pub direction: Vec3,
    pub color: Color,
    /// Interactions this lineage has undergone
    pub depth: u32,
    /// Objects skipped by this ray's intersection query
    pub ignore: IgnoreSet,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, color: Color, depth: u32) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            color,
            depth,
            ignore: IgnoreSet::new(),
        }
    }

    /// White, depth-zero ray leaving the source.
    pub fn seed(source: &LaserSource) -> Self {
        Self::new(source.position, source.direction, Color::WHITE, 0)
    }

    /// Continues this lineage from `origin` along `direction` one interaction deeper.
    pub fn child(&self, origin: Vec3, direction: Vec3, color: Color) -> Self {
        Self::new(origin, direction, color, self.depth + 1)
    }

    pub fn ignoring(mut self, id: ObjectId) -> Self {
        self.ignore.insert(id);
        self
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
