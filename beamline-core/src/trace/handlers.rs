//! Per-category beam behavior.
//!
//! Each handler is a pure function from the incoming ray, its hit and the
//! struck object to an [`Interaction`]: the segments to draw, the child rays
//! to enqueue and an optional sensor update. Handlers never touch pass state.

use crate::config::{SplitPolicy, TraceConfig};
use crate::math::{Quat, Vec3, is_unit, reflect as reflect_direction};
use crate::scene::{
    Color, Interactable, InteractableKind, ObjectId, RayHit, SceneObject, SceneSnapshot, Sensor,
};
use crate::trace::{Ray, Segment};

/// Minimum agreement between the struck face and a single-sided mirror's
/// reflective face for the hit to count as a reflection. Edges and the
/// back of a single-sided mirror absorb.
const REFLECTIVE_FACE_MATCH: f32 = 0.9;

/// A beam reached a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorUpdate {
    pub sensor: ObjectId,
    /// Color and incidence both satisfied the sensor
    pub matched: bool,
    pub color: Color,
}

/// Outcome of one ray's interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    pub segments: Vec<Segment>,
    pub children: Vec<Ray>,
    pub sensor_update: Option<SensorUpdate>,
}

impl Interaction {
    fn terminal(segment: Segment) -> Self {
        Self {
            segments: vec![segment],
            ..Default::default()
        }
    }
}

/// Routes a hit to the handler for its owner's category.
///
/// Owners missing from the snapshot, such as room walls that only exist as
/// geometry, absorb the beam.
pub fn dispatch(
    ray: &Ray,
    hit: &RayHit,
    scene: &SceneSnapshot,
    config: &TraceConfig,
) -> Interaction {
    match scene.find(hit.owner) {
        Some(SceneObject::Sensor(sensor)) => evaluate_sensor(ray, hit, sensor, config),
        Some(SceneObject::Interactable(object)) => match object.kind {
            InteractableKind::Mirror { .. } => reflect(ray, hit, object, config),
            InteractableKind::DispersionPrism { .. } => disperse(ray, hit, object, config),
            InteractableKind::Obstacle { .. } => absorb(ray, hit),
        },
        None => {
            log::trace!("Hit unregistered owner {}, absorbing", hit.owner);
            absorb(ray, hit)
        }
    }
}

/// Beam found nothing and leaves the scene.
pub fn escape(ray: &Ray, config: &TraceConfig) -> Interaction {
    Interaction::terminal(Segment::new(
        ray.origin,
        ray.at(config.max_range),
        ray.color,
    ))
}

/// Stops the beam at the hit point.
pub fn absorb(ray: &Ray, hit: &RayHit) -> Interaction {
    Interaction::terminal(Segment::new(ray.origin, hit.point, ray.color))
}

/// Bounces the beam off a mirror.
///
/// A double-sided mirror flips the normal when struck from behind. A
/// single-sided mirror only reflects on its reflective face and absorbs
/// anywhere else. Hits without a usable normal absorb.
pub fn reflect(
    ray: &Ray,
    hit: &RayHit,
    mirror: &Interactable,
    config: &TraceConfig,
) -> Interaction {
    let InteractableKind::Mirror { double_sided, .. } = mirror.kind else {
        return absorb(ray, hit);
    };

    if !hit.has_usable_normal() {
        log::warn!(
            "Degenerate normal on mirror {}, treating as obstacle",
            mirror.id
        );
        return absorb(ray, hit);
    }

    let d = ray.direction;
    let mut n = hit.normal.normalize();
    let incidence = d.dot(n);

    if double_sided {
        if incidence > 0.0 {
            n = -n;
        }
    } else {
        let face = reflective_face(mirror).unwrap_or(Vec3::ZERO).normalize_or_zero();
        if incidence >= 0.0 || n.dot(face) < REFLECTIVE_FACE_MATCH {
            log::trace!("Beam struck the back of single-sided mirror {}", mirror.id);
            return absorb(ray, hit);
        }
    }

    let reflected = reflect_direction(d, n).normalize_or_zero();
    if !is_unit(reflected) {
        return absorb(ray, hit);
    }

    let origin = hit.point + n * config.surface_offset;
    let mut child = ray.child(origin, reflected, ray.color);
    if !double_sided {
        child = child.ignoring(mirror.id);
    }

    Interaction {
        segments: vec![Segment::new(ray.origin, hit.point, ray.color)],
        children: vec![child],
        sensor_update: None,
    }
}

/// Splits white light into the prism's two colors. Any other color dead-ends.
pub fn disperse(
    ray: &Ray,
    hit: &RayHit,
    prism: &Interactable,
    config: &TraceConfig,
) -> Interaction {
    let InteractableKind::DispersionPrism {
        split_colors: (first_color, second_color),
        split_local_directions: (first_local, second_local),
        ..
    } = prism.kind
    else {
        return absorb(ray, hit);
    };

    if !ray.color.is_white() {
        return absorb(ray, hit);
    }

    let (split_point, first_dir, second_dir) = match config.split_policy {
        SplitPolicy::LocalDirections => (
            prism.pose.position,
            prism.pose.transform_direction(first_local),
            prism.pose.transform_direction(second_local),
        ),
        SplitPolicy::WorldUpRotation => (
            hit.point + ray.direction * config.pass_through_distance,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4) * ray.direction,
            Quat::from_rotation_y(-std::f32::consts::FRAC_PI_4) * ray.direction,
        ),
    };

    let children = [(first_dir, first_color), (second_dir, second_color)]
        .into_iter()
        .filter(|(dir, _)| dir.length_squared() > 1e-8)
        .map(|(dir, color)| ray.child(split_point, dir, color).ignoring(prism.id))
        .collect();

    Interaction {
        segments: vec![
            Segment::new(ray.origin, hit.point, ray.color),
            Segment::new(hit.point, split_point, ray.color),
        ],
        children,
        sensor_update: None,
    }
}

/// Checks color and incidence against the sensor. The sensor absorbs the beam.
pub fn evaluate_sensor(
    ray: &Ray,
    hit: &RayHit,
    sensor: &Sensor,
    config: &TraceConfig,
) -> Interaction {
    let alignment = sensor.facing.dot(-ray.direction);
    let matched = alignment > config.alignment_threshold && ray.color == sensor.required_color;

    Interaction {
        segments: vec![Segment::new(ray.origin, hit.point, ray.color)],
        children: Vec::new(),
        sensor_update: Some(SensorUpdate {
            sensor: sensor.id,
            matched,
            color: ray.color,
        }),
    }
}

/// World-space direction of a mirror's reflective face.
pub fn reflective_face(mirror: &Interactable) -> Option<Vec3> {
    match mirror.kind {
        InteractableKind::Mirror {
            reflective_face_normal,
            ..
        } => Some(mirror.pose.transform_direction(reflective_face_normal)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{EPSILON, Pose};

    const MIRROR: ObjectId = ObjectId(10);

    fn mirror(normal: Vec3, double_sided: bool) -> Interactable {
        let kind = if double_sided {
            InteractableKind::double_mirror(normal)
        } else {
            InteractableKind::mirror(normal)
        };
        Interactable::new(MIRROR, Pose::identity(), kind)
    }

    fn hit_at(point: Vec3, normal: Vec3, owner: ObjectId) -> RayHit {
        RayHit::new(1.0, point, normal, owner)
    }

    fn white_ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction, Color::WHITE, 0)
    }

    #[test]
    fn test_single_sided_reflection() {
        let n = Vec3::new(1.0, 0.0, 1.0).normalize();
        let ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let out = reflect(
            &ray,
            &hit_at(Vec3::ZERO, n, MIRROR),
            &mirror(n, false),
            &TraceConfig::default(),
        );

        assert_eq!(out.segments.len(), 1);
        assert_eq!(out.children.len(), 1);
        let child = &out.children[0];
        assert!(child.direction.distance(Vec3::X) < EPSILON);
        assert!(is_unit(child.direction));
        assert_eq!(child.depth, 1);
        assert_eq!(child.color, Color::WHITE);
        assert!(child.ignore.contains(MIRROR));
        assert!(child.origin.distance(n * 0.01) < EPSILON);
    }

    #[test]
    fn test_single_sided_back_face_absorbs() {
        let ray = white_ray(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let out = reflect(
            &ray,
            &hit_at(Vec3::ZERO, Vec3::Z, MIRROR),
            &mirror(Vec3::Z, false),
            &TraceConfig::default(),
        );
        assert!(out.children.is_empty());
        assert_eq!(out.segments[0].end, Vec3::ZERO);
    }

    #[test]
    fn test_single_sided_structural_face_absorbs() {
        // Struck a side of the mirror body rather than the reflective face
        let ray = white_ray(Vec3::new(5.0, 0.0, 0.0), -Vec3::X);
        let out = reflect(
            &ray,
            &hit_at(Vec3::ZERO, Vec3::X, MIRROR),
            &mirror(Vec3::Z, false),
            &TraceConfig::default(),
        );
        assert!(out.children.is_empty());
    }

    #[test]
    fn test_double_sided_flips_normal_from_behind() {
        let n = Vec3::new(1.0, 0.0, 1.0).normalize();
        let ray = white_ray(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let out = reflect(
            &ray,
            &hit_at(Vec3::ZERO, n, MIRROR),
            &mirror(n, true),
            &TraceConfig::default(),
        );

        let child = &out.children[0];
        assert!(child.direction.distance(-Vec3::X) < EPSILON);
        // Offset lands on the side the beam came from, and the mirror is not ignored
        assert!(child.origin.z < 0.0);
        assert!(child.ignore.is_empty());
    }

    #[test]
    fn test_reflection_involution() {
        let config = TraceConfig::default();
        let n = Vec3::new(0.2, 1.0, -0.4).normalize();
        let d = Vec3::new(0.5, -0.7, 0.1).normalize();
        let ray = white_ray(Vec3::ZERO, d);

        let first = reflect(&ray, &hit_at(Vec3::ONE, n, MIRROR), &mirror(n, true), &config);
        let bounced = &first.children[0];
        let second = reflect(bounced, &hit_at(Vec3::ONE, -n, MIRROR), &mirror(-n, true), &config);

        assert!(second.children[0].direction.distance(d) < EPSILON);
        assert_eq!(second.children[0].depth, 2);
    }

    #[test]
    fn test_degenerate_normal_absorbs() {
        let ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        for normal in [Vec3::ZERO, Vec3::splat(f32::NAN)] {
            let out = reflect(
                &ray,
                &hit_at(Vec3::ZERO, normal, MIRROR),
                &mirror(Vec3::Z, true),
                &TraceConfig::default(),
            );
            assert!(out.children.is_empty());
            assert_eq!(out.segments.len(), 1);
        }
    }

    #[test]
    fn test_obstacle_never_has_children() {
        let ray = white_ray(Vec3::ZERO, Vec3::X);
        let out = absorb(&ray, &hit_at(Vec3::new(3.0, 0.0, 0.0), -Vec3::X, ObjectId(1)));
        assert!(out.children.is_empty());
        assert!(out.sensor_update.is_none());
        assert_eq!(
            out.segments,
            vec![Segment::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Color::WHITE)]
        );
    }

    fn prism_at(position: Vec3, rotation: Quat) -> Interactable {
        Interactable::new(ObjectId(20), Pose::new(position, rotation), InteractableKind::prism())
    }

    #[test]
    fn test_white_splits_from_prism_center() {
        let prism = prism_at(Vec3::ZERO, Quat::IDENTITY);
        let ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hit = hit_at(Vec3::new(0.0, 0.0, 0.5), Vec3::Z, prism.id);
        let out = disperse(&ray, &hit, &prism, &TraceConfig::default());

        assert_eq!(out.segments.len(), 2);
        assert_eq!(out.segments[1].end, Vec3::ZERO);
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.children[0].color, Color::RED);
        assert_eq!(out.children[1].color, Color::BLUE);
        for child in &out.children {
            assert_eq!(child.origin, Vec3::ZERO);
            assert_eq!(child.depth, 1);
            assert!(is_unit(child.direction));
            assert!(child.ignore.contains(prism.id));
        }
    }

    #[test]
    fn test_split_directions_follow_prism_rotation() {
        let prism = prism_at(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        let ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let out = disperse(
            &ray,
            &hit_at(Vec3::new(0.0, 0.0, 0.5), Vec3::Z, prism.id),
            &prism,
            &TraceConfig::default(),
        );
        // Turned around, the prism now emits towards +Z
        assert!(out.children.iter().all(|c| c.direction.z > 0.5));
    }

    #[test]
    fn test_world_up_split_policy() {
        let config = TraceConfig::new().split_policy(SplitPolicy::WorldUpRotation);
        // Rotation must not matter under this policy
        let prism = prism_at(Vec3::ZERO, Quat::from_rotation_y(1.0));
        let ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hit = hit_at(Vec3::new(0.0, 0.0, 0.5), Vec3::Z, prism.id);
        let out = disperse(&ray, &hit, &prism, &config);

        let exit = Vec3::new(0.0, 0.0, -0.5);
        assert!(out.segments[1].end.distance(exit) < EPSILON);
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!(out.children[0].direction.distance(Vec3::new(-half, 0.0, -half)) < EPSILON);
        assert!(out.children[1].direction.distance(Vec3::new(half, 0.0, -half)) < EPSILON);
        assert!(out.children.iter().all(|c| c.origin.distance(exit) < EPSILON));
    }

    #[test]
    fn test_colored_beam_does_not_split() {
        let prism = prism_at(Vec3::ZERO, Quat::IDENTITY);
        for color in [Color::RED, Color::BLUE, Color::new(1.0, 1.0, 0.999)] {
            let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, color, 3);
            let out = disperse(
                &ray,
                &hit_at(Vec3::new(0.0, 0.0, 0.5), Vec3::Z, prism.id),
                &prism,
                &TraceConfig::default(),
            );
            assert!(out.children.is_empty());
            assert_eq!(out.segments.len(), 1);
        }
    }

    fn sensor(facing: Vec3, required: Color) -> Sensor {
        Sensor::new(ObjectId(30), Vec3::ZERO, facing, required)
    }

    #[test]
    fn test_sensor_requires_alignment_and_color() {
        let config = TraceConfig::default();
        let hit = hit_at(Vec3::ZERO, Vec3::Z, ObjectId(30));
        let head_on = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);

        let out = evaluate_sensor(&head_on, &hit, &sensor(Vec3::Z, Color::WHITE), &config);
        assert!(out.sensor_update.unwrap().matched);
        assert!(out.children.is_empty());

        let wrong_color = evaluate_sensor(&head_on, &hit, &sensor(Vec3::Z, Color::RED), &config);
        assert!(!wrong_color.sensor_update.unwrap().matched);
    }

    #[test]
    fn test_sensor_rejects_poor_alignment() {
        let config = TraceConfig::default();
        let hit = hit_at(Vec3::ZERO, Vec3::Z, ObjectId(30));
        let sensor = sensor(Vec3::Z, Color::WHITE);
        let arriving_at = |degrees: f32| {
            let angle = degrees.to_radians();
            white_ray(Vec3::ZERO, -Vec3::new(angle.sin(), 0.0, angle.cos()))
        };

        let accepted = evaluate_sensor(&arriving_at(55.0), &hit, &sensor, &config);
        assert!(accepted.sensor_update.unwrap().matched);
        for degrees in [62.0, 75.0, 90.0, 135.0, 180.0] {
            let ray = arriving_at(degrees);
            assert!(sensor.facing.dot(-ray.direction) < 0.5);
            let out = evaluate_sensor(&ray, &hit, &sensor, &config);
            assert!(!out.sensor_update.unwrap().matched, "accepted at {degrees}°");
        }
    }

    #[test]
    fn test_dispatch_unknown_owner_absorbs() {
        let ray = white_ray(Vec3::ZERO, Vec3::X);
        let out = dispatch(
            &ray,
            &hit_at(Vec3::X, -Vec3::X, ObjectId(99)),
            &SceneSnapshot::new(),
            &TraceConfig::default(),
        );
        assert!(out.children.is_empty());
        assert!(out.sensor_update.is_none());
    }

    #[test]
    fn test_escape_uses_max_range() {
        let ray = white_ray(Vec3::ZERO, Vec3::X);
        let out = escape(&ray, &TraceConfig::default());
        assert!((out.segments[0].length() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_reflective_face_is_world_space() {
        let mirror = Interactable::new(
            MIRROR,
            Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            InteractableKind::mirror(Vec3::Z),
        );
        assert!(reflective_face(&mirror).unwrap().distance(Vec3::X) < EPSILON);
    }

    #[test]
    fn test_rotated_single_sided_mirror_uses_world_face() {
        // Local +Z face turned to world +X
        let mirror = Interactable::new(
            MIRROR,
            Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            InteractableKind::mirror(Vec3::Z),
        );
        let config = TraceConfig::default();
        let ray = white_ray(Vec3::new(5.0, 0.0, 0.0), -Vec3::X);

        let front = reflect(&ray, &hit_at(Vec3::ZERO, Vec3::X, MIRROR), &mirror, &config);
        assert_eq!(front.children.len(), 1);
        assert!(front.children[0].direction.distance(Vec3::X) < EPSILON);

        // Striking the face that points along world +Z absorbs
        let edge_ray = white_ray(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let edge = reflect(&edge_ray, &hit_at(Vec3::ZERO, Vec3::Z, MIRROR), &mirror, &config);
        assert!(edge.children.is_empty());
    }
}
