//! Intersection query interface used by the propagator.
//!
//! The propagator never looks at meshes. It asks an [`IntersectionQuery`] for
//! the surfaces a ray crosses and resolves each hit through its owner id.
//! [`PrimitiveScene`](crate::scene::PrimitiveScene) is the bundled analytic
//! implementation; a game engine can plug in its own raycaster instead.

use crate::math::Vec3;
use crate::scene::ObjectId;

/// A single ray/surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point
    pub distance: f32,

    /// World-space hit point
    pub point: Vec3,

    /// Geometric surface normal in world space (normalized)
    ///
    /// Not flipped towards the ray: a hit on the back of a face reports the
    /// same normal as a hit on its front.
    pub normal: Vec3,

    /// Logical object that owns the struck primitive
    pub owner: ObjectId,

    /// Face index within the owning primitive, when the query knows it
    pub face: Option<u32>,

    /// Struck primitive is decorative only
    ///
    /// Conforming queries never return these. The propagator skips them anyway.
    pub pass_through: bool,
}

impl RayHit {
    pub fn new(distance: f32, point: Vec3, normal: Vec3, owner: ObjectId) -> Self {
        Self {
            distance,
            point,
            normal,
            owner,
            face: None,
            pass_through: false,
        }
    }

    pub fn with_face(mut self, face: u32) -> Self {
        self.face = Some(face);
        self
    }

    /// True when the normal can be used to bounce a ray.
    pub fn has_usable_normal(&self) -> bool {
        self.normal.is_finite() && self.normal.length_squared() > 1e-8
    }
}

/// Object ids a ray must not hit on its next query.
///
/// Holds at most a handful of ids, so a vector beats a hash set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    ids: Vec<ObjectId>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: ObjectId) -> Self {
        Self { ids: vec![id] }
    }

    pub fn insert(&mut self, id: ObjectId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<ObjectId> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Casts rays against the scene geometry.
///
/// # Contract
///
/// - Return every hit with `distance` in `(0, max_distance]`, sorted nearest first
/// - Resolve grouped geometry to the owning object's [`ObjectId`]
/// - Never return hits owned by an id in `ignore`
/// - Never return pass-through primitives
///
/// # Example
///
/// ```
/// use beamline_core::math::Vec3;
/// use beamline_core::scene::{IgnoreSet, IntersectionQuery, ObjectId, RayHit};
///
/// /// Infinite floor plane at y = 0 owned by a single object.
/// struct Floor;
///
/// impl IntersectionQuery for Floor {
///     fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32, ignore: &IgnoreSet)
///         -> Vec<RayHit> {
///         let owner = ObjectId(0);
///         if ignore.contains(owner) || direction.y >= 0.0 {
///             return Vec::new();
///         }
///         let t = -origin.y / direction.y;
///         if t <= 0.0 || t > max_distance {
///             return Vec::new();
///         }
///         vec![RayHit::new(t, origin + direction * t, Vec3::Y, owner)]
///     }
/// }
///
/// let hits = Floor.cast(Vec3::new(0.0, 2.0, 0.0), -Vec3::Y, 10.0, &IgnoreSet::new());
/// assert_eq!(hits.len(), 1);
/// ```
pub trait IntersectionQuery: Send + Sync {
    /// All hits along the ray, nearest first.
    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: &IgnoreSet,
    ) -> Vec<RayHit>;

    /// Nearest hit that is neither pass-through nor ignored.
    ///
    /// The default filters the output of [`cast`](Self::cast) again so that
    /// loosely conforming queries still behave.
    fn nearest(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: &IgnoreSet,
    ) -> Option<RayHit> {
        self.cast(origin, direction, max_distance, ignore)
            .into_iter()
            .filter(|hit| !hit.pass_through && !ignore.contains(hit.owner))
            .filter(|hit| hit.distance > 0.0 && hit.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
