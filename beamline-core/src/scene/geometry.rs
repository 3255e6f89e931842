//! Analytic reference geometry.
//!
//! [`PrimitiveScene`] is a flat list of posed cuboids, quads and triangles.
//! Every primitive carries the [`ObjectId`] of the object it belongs to,
//! stamped when the scene is built, so a hit never has to walk a scene graph
//! to find its owner.

use crate::math::{Pose, Quat, Vec3};
use crate::scene::query::{IgnoreSet, IntersectionQuery, RayHit};
use crate::scene::snapshot::{InteractableKind, ObjectId, SceneSnapshot};

/// Hits closer than this to the ray origin are discarded.
const MIN_HIT_DISTANCE: f32 = 1e-4;

/// Scale of the pick outline drawn around mirrors.
const OUTLINE_SCALE: f32 = 1.05;

/// Local-space shape of a primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box in local space centred on the origin.
    Cuboid { half_extents: Vec3 },
    /// Rectangle in the local XY plane facing local +Z.
    Quad { half_width: f32, half_height: f32 },
    /// Triangle with local-space vertices. Its normal follows the winding order.
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub owner: ObjectId,
    pub pose: Pose,
    pub shape: Shape,
    /// Decorative or picking-only geometry
    pub pass_through: bool,
}

impl Primitive {
    pub fn new(owner: ObjectId, pose: Pose, shape: Shape) -> Self {
        Self {
            owner,
            pose,
            shape,
            pass_through: false,
        }
    }

    pub fn pass_through(mut self) -> Self {
        self.pass_through = true;
        self
    }

    /// Every intersection of the ray with this primitive, in no particular order.
    fn intersect(&self, origin: Vec3, direction: Vec3, out: &mut Vec<RayHit>) {
        let o = self.pose.inverse_transform_point(origin);
        let d = self.pose.inverse_transform_direction(direction);

        match self.shape {
            Shape::Cuboid { half_extents } => self.intersect_cuboid(o, d, half_extents, out),
            Shape::Quad {
                half_width,
                half_height,
            } => {
                if d.z.abs() < 1e-8 {
                    return;
                }
                let t = -o.z / d.z;
                let p = o + d * t;
                if p.x.abs() <= half_width && p.y.abs() <= half_height {
                    out.push(self.hit(t, origin, direction, Vec3::Z, 0));
                }
            }
            Shape::Triangle { a, b, c } => {
                // Möller–Trumbore
                let e1 = b - a;
                let e2 = c - a;
                let p = d.cross(e2);
                let det = e1.dot(p);
                if det.abs() < 1e-8 {
                    return;
                }
                let inv_det = 1.0 / det;
                let s = o - a;
                let u = s.dot(p) * inv_det;
                if !(0.0..=1.0).contains(&u) {
                    return;
                }
                let q = s.cross(e1);
                let v = d.dot(q) * inv_det;
                if v < 0.0 || u + v > 1.0 {
                    return;
                }
                let t = e2.dot(q) * inv_det;
                let normal = e1.cross(e2).normalize_or_zero();
                out.push(self.hit(t, origin, direction, normal, 0));
            }
        }
    }

    // Slab test reporting both the entry and the exit face.
    fn intersect_cuboid(&self, o: Vec3, d: Vec3, half: Vec3, out: &mut Vec<RayHit>) {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_face = (0usize, 0.0f32);
        let mut far_face = (0usize, 0.0f32);

        for axis in 0..3 {
            if d[axis].abs() < 1e-8 {
                if o[axis].abs() > half[axis] {
                    return;
                }
                continue;
            }
            let inv = 1.0 / d[axis];
            let mut t0 = (-half[axis] - o[axis]) * inv;
            let mut t1 = (half[axis] - o[axis]) * inv;
            // Entering through the face opposite the travel direction
            let entry_sign = -d[axis].signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_near {
                t_near = t0;
                near_face = (axis, entry_sign);
            }
            if t1 < t_far {
                t_far = t1;
                far_face = (axis, -entry_sign);
            }
            if t_near > t_far {
                return;
            }
        }

        let origin = self.pose.transform_point(o);
        let direction = self.pose.transform_direction(d);
        for (t, (axis, sign)) in [(t_near, near_face), (t_far, far_face)] {
            if !t.is_finite() {
                continue;
            }
            let mut normal = Vec3::ZERO;
            normal[axis] = sign;
            let face = axis as u32 * 2 + u32::from(sign > 0.0);
            out.push(self.hit(t, origin, direction, normal, face));
        }
    }

    fn hit(&self, t: f32, origin: Vec3, direction: Vec3, local_normal: Vec3, face: u32) -> RayHit {
        let mut hit = RayHit::new(
            t,
            origin + direction * t,
            self.pose.transform_direction(local_normal).normalize_or_zero(),
            self.owner,
        )
        .with_face(face);
        hit.pass_through = self.pass_through;
        hit
    }
}

/// Intersection query over a list of primitives.
///
/// # Example
///
/// ```
/// use beamline_core::math::{Pose, Vec3};
/// use beamline_core::scene::{
///     IgnoreSet, IntersectionQuery, ObjectId, Primitive, PrimitiveScene, Shape,
/// };
///
/// let mut scene = PrimitiveScene::new();
/// scene.add(Primitive::new(
///     ObjectId(7),
///     Pose::from_position(Vec3::new(0.0, 0.0, -5.0)),
///     Shape::Cuboid { half_extents: Vec3::splat(0.5) },
/// ));
///
/// let hit = scene.nearest(Vec3::ZERO, -Vec3::Z, 50.0, &IgnoreSet::new()).unwrap();
/// assert_eq!(hit.owner, ObjectId(7));
/// assert!((hit.distance - 4.5).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrimitiveScene {
    primitives: Vec<Primitive>,
}

impl PrimitiveScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds default geometry for every sensor and interactable in `snapshot`.
    ///
    /// - Sensors, prisms and obstacles become cuboids
    /// - Mirrors become a quad aligned with the reflective face, plus a
    ///   pass-through outline cube used for picking
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Self {
        let mut scene = Self::new();

        for sensor in &snapshot.sensors {
            scene.add(Primitive::new(
                sensor.id,
                sensor.pose,
                Shape::Cuboid {
                    half_extents: Vec3::splat(sensor.half_extent),
                },
            ));
        }

        for object in &snapshot.interactables {
            match object.kind {
                InteractableKind::Mirror {
                    reflective_face_normal,
                    half_size,
                    ..
                } => {
                    let face_rotation = Quat::from_rotation_arc(Vec3::Z, reflective_face_normal);
                    let face_pose = Pose::new(
                        object.pose.position,
                        object.pose.rotation * face_rotation,
                    );
                    scene.add(Primitive::new(
                        object.id,
                        face_pose,
                        Shape::Quad {
                            half_width: half_size,
                            half_height: half_size,
                        },
                    ));
                    scene.add(
                        Primitive::new(
                            object.id,
                            object.pose,
                            Shape::Cuboid {
                                half_extents: Vec3::splat(half_size * OUTLINE_SCALE),
                            },
                        )
                        .pass_through(),
                    );
                }
                InteractableKind::DispersionPrism { half_extent, .. } => {
                    scene.add(Primitive::new(
                        object.id,
                        object.pose,
                        Shape::Cuboid {
                            half_extents: Vec3::splat(half_extent),
                        },
                    ));
                }
                InteractableKind::Obstacle { extent } => {
                    scene.add(Primitive::new(
                        object.id,
                        object.pose,
                        Shape::Cuboid {
                            half_extents: extent,
                        },
                    ));
                }
            }
        }

        scene
    }

    /// Adds the floor, left wall and back wall of a cubic room of edge `size`
    /// centred on the origin, all owned by `owner`.
    pub fn with_room(mut self, owner: ObjectId, size: f32) -> Self {
        let half = size / 2.0;
        let thickness = 1.0;
        let walls = [
            (
                Vec3::new(0.0, -half - thickness / 2.0, 0.0),
                Vec3::new(half + thickness, thickness / 2.0, half + thickness),
            ),
            (
                Vec3::new(-half - thickness / 2.0, thickness / 2.0, 0.0),
                Vec3::new(thickness / 2.0, half + thickness / 2.0, half + thickness / 2.0),
            ),
            (
                Vec3::new(0.0, thickness / 2.0, -half - thickness / 2.0),
                Vec3::new(half + thickness, half + thickness / 2.0, thickness / 2.0),
            ),
        ];
        for (position, half_extents) in walls {
            self.add(Primitive::new(
                owner,
                Pose::from_position(position),
                Shape::Cuboid { half_extents },
            ));
        }
        self
    }

    pub fn add(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }
}

impl IntersectionQuery for PrimitiveScene {
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: &IgnoreSet,
    ) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for primitive in &self.primitives {
            if primitive.pass_through || ignore.contains(primitive.owner) {
                continue;
            }
            primitive.intersect(origin, direction, &mut hits);
        }
        hits.retain(|hit| hit.distance > MIN_HIT_DISTANCE && hit.distance <= max_distance);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EPSILON;
    use crate::scene::{Color, Interactable, Sensor};

    fn unit_cube(owner: u64, position: Vec3) -> Primitive {
        Primitive::new(
            ObjectId(owner),
            Pose::from_position(position),
            Shape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
        )
    }

    #[test]
    fn test_cuboid_entry_and_exit() {
        let mut scene = PrimitiveScene::new();
        scene.add(unit_cube(1, Vec3::new(0.0, 0.0, -5.0)));

        let hits = scene.cast(Vec3::ZERO, -Vec3::Z, 50.0, &IgnoreSet::new());
        assert_eq!(hits.len(), 2);
        assert!((hits[0].distance - 4.5).abs() < EPSILON);
        assert!(hits[0].normal.distance(Vec3::Z) < EPSILON);
        assert!((hits[1].distance - 5.5).abs() < EPSILON);
        assert!(hits[1].normal.distance(-Vec3::Z) < EPSILON);
    }

    #[test]
    fn test_rotated_cuboid_normal_is_world_space() {
        let mut scene = PrimitiveScene::new();
        scene.add(Primitive::new(
            ObjectId(1),
            Pose::new(
                Vec3::new(5.0, 0.0, 0.0),
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ),
            Shape::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.25),
            },
        ));
        let hit = scene
            .nearest(Vec3::ZERO, Vec3::X, 50.0, &IgnoreSet::new())
            .unwrap();
        // Local Z maps onto world X, so the thin axis faces the ray
        assert!((hit.distance - 4.75).abs() < EPSILON);
        assert!(hit.normal.distance(-Vec3::X) < EPSILON);
    }

    #[test]
    fn test_quad_reports_geometric_normal_from_both_sides() {
        let mut scene = PrimitiveScene::new();
        scene.add(Primitive::new(
            ObjectId(1),
            Pose::identity(),
            Shape::Quad {
                half_width: 1.0,
                half_height: 1.0,
            },
        ));
        let front = scene
            .nearest(Vec3::new(0.0, 0.0, 3.0), -Vec3::Z, 50.0, &IgnoreSet::new())
            .unwrap();
        let back = scene
            .nearest(Vec3::new(0.0, 0.0, -3.0), Vec3::Z, 50.0, &IgnoreSet::new())
            .unwrap();
        assert!(front.normal.distance(Vec3::Z) < EPSILON);
        assert!(back.normal.distance(Vec3::Z) < EPSILON);

        let outside = scene.nearest(Vec3::new(2.0, 0.0, 3.0), -Vec3::Z, 50.0, &IgnoreSet::new());
        assert!(outside.is_none());
    }

    #[test]
    fn test_triangle_hit() {
        let mut scene = PrimitiveScene::new();
        scene.add(Primitive::new(
            ObjectId(3),
            Pose::from_position(Vec3::new(0.0, 0.0, -2.0)),
            Shape::Triangle {
                a: Vec3::new(-1.0, -1.0, 0.0),
                b: Vec3::new(1.0, -1.0, 0.0),
                c: Vec3::new(0.0, 1.0, 0.0),
            },
        ));
        let hit = scene
            .nearest(Vec3::ZERO, -Vec3::Z, 50.0, &IgnoreSet::new())
            .unwrap();
        assert_eq!(hit.owner, ObjectId(3));
        assert!((hit.distance - 2.0).abs() < EPSILON);
        assert!(hit.normal.distance(Vec3::Z) < EPSILON);

        let miss = scene.nearest(Vec3::new(0.9, 0.9, 0.0), -Vec3::Z, 50.0, &IgnoreSet::new());
        assert!(miss.is_none());
    }

    #[test]
    fn test_pass_through_and_ignored_owners_are_skipped() {
        let mut scene = PrimitiveScene::new();
        scene.add(unit_cube(1, Vec3::new(0.0, 0.0, -2.0)).pass_through());
        scene.add(unit_cube(2, Vec3::new(0.0, 0.0, -4.0)));
        scene.add(unit_cube(3, Vec3::new(0.0, 0.0, -6.0)));

        let hits = scene.cast(Vec3::ZERO, -Vec3::Z, 50.0, &IgnoreSet::single(ObjectId(2)));
        assert!(hits.iter().all(|h| h.owner == ObjectId(3)));
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_hits_beyond_range_are_dropped() {
        let mut scene = PrimitiveScene::new();
        scene.add(unit_cube(1, Vec3::new(0.0, 0.0, -80.0)));
        assert!(scene.cast(Vec3::ZERO, -Vec3::Z, 50.0, &IgnoreSet::new()).is_empty());
    }

    #[test]
    fn test_from_snapshot_builds_mirror_face_and_outline() {
        let snapshot = SceneSnapshot::new()
            .with_sensor(Sensor::new(ObjectId(1), Vec3::ZERO, Vec3::Z, Color::WHITE))
            .with_interactable(Interactable::new(
                ObjectId(2),
                Pose::from_position(Vec3::new(3.0, 0.0, 0.0)),
                InteractableKind::mirror(Vec3::X),
            ));
        let scene = PrimitiveScene::from_snapshot(&snapshot);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.iter().filter(|p| p.pass_through).count(), 1);

        // The outline is larger than the face but must never be reported
        let hit = scene
            .nearest(Vec3::new(10.0, 0.0, 0.0), -Vec3::X, 50.0, &IgnoreSet::new())
            .unwrap();
        assert_eq!(hit.owner, ObjectId(2));
        assert!(hit.point.distance(Vec3::new(3.0, 0.0, 0.0)) < EPSILON);
        assert!(hit.normal.distance(Vec3::X) < EPSILON);
    }

    #[test]
    fn test_room_walls_share_owner() {
        let scene = PrimitiveScene::new().with_room(ObjectId(0), 10.0);
        assert_eq!(scene.len(), 3);
        let floor = scene
            .nearest(Vec3::ZERO, -Vec3::Y, 50.0, &IgnoreSet::new())
            .unwrap();
        assert_eq!(floor.owner, ObjectId(0));
        assert!((floor.distance - 5.0).abs() < EPSILON);
    }
}
