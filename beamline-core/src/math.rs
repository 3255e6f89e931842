//! Math types for Beamline

pub use glam::{Quat, Vec3};

/// Tolerance used for unit-length and direction comparisons.
pub const EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Pose at `position` whose forward axis (-Z) points along `direction`.
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_arc(-Vec3::Z, direction.normalize()),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * (-Vec3::Z)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Transforms a point from local to world space.
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// Transforms a point from world to local space.
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    pub fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    pub fn inverse_transform_direction(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Mirror reflection of `direction` about the plane with unit `normal`.
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// True when `v` has unit length within [`EPSILON`].
pub fn is_unit(v: Vec3) -> bool {
    v.is_finite() && (v.length() - 1.0).abs() <= EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_facing_points_forward() {
        let pose = Pose::facing(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(pose.forward().distance(Vec3::X) < EPSILON);
    }

    #[test]
    fn test_point_round_trip() {
        let pose = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let p = Vec3::new(0.5, -0.25, 4.0);
        let back = pose.inverse_transform_point(pose.transform_point(p));
        assert!(back.distance(p) < EPSILON);
    }

    #[test]
    fn test_reflect_involution() {
        let d = Vec3::new(0.3, -0.5, -0.8).normalize();
        let n = Vec3::new(1.0, 1.0, 0.0).normalize();
        let once = reflect(d, n);
        let twice = reflect(once, -n);
        assert!(twice.distance(d) < EPSILON);
        assert!(is_unit(once));
    }
}
