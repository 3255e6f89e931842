//! Immutable per-pass view of a puzzle scene.
//!
//! A [`SceneSnapshot`] is everything the propagator reads: the laser source,
//! the sensors and the interactable objects. Nothing outside the snapshot and
//! the intersection query is consulted during a pass.

use crate::error::{BeamlineError, Result};
use crate::math::{EPSILON, Pose, Quat, Vec3, is_unit};
use crate::scene::Color;
use std::collections::HashSet;

/// Identity of a sensor or interactable, stamped on every geometry primitive
/// the object owns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// Where the laser is emitted from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSource {
    pub position: Vec3,
    /// Emission direction (unit length)
    pub direction: Vec3,
}

impl LaserSource {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Emits along the pose's forward (-Z) axis.
    pub fn from_pose(pose: Pose) -> Self {
        Self::new(pose.position, pose.forward())
    }
}

/// Target that must receive a beam of `required_color` roughly head-on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensor {
    pub id: ObjectId,
    pub pose: Pose,
    /// World-space direction the receiving face looks towards (unit length)
    pub facing: Vec3,
    pub required_color: Color,
    /// Half edge length of the sensor cube used by the reference geometry
    pub half_extent: f32,
}

impl Sensor {
    pub fn new(id: ObjectId, position: Vec3, facing: Vec3, required_color: Color) -> Self {
        Self {
            id,
            pose: Pose::from_position(position),
            facing: facing.normalize_or_zero(),
            required_color,
            half_extent: 0.5,
        }
    }
}

/// Category-specific behavior of an interactable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractableKind {
    /// Reflects incoming beams.
    Mirror {
        /// Local-space normal of the reflective face
        reflective_face_normal: Vec3,
        /// Reflects from both sides of the face
        double_sided: bool,
        /// Half width and height of the reflective face
        half_size: f32,
    },
    /// Splits canonical white light into two colored beams.
    DispersionPrism {
        split_colors: (Color, Color),
        /// Local-space emission directions, rotated into world space per pass
        split_local_directions: (Vec3, Vec3),
        half_extent: f32,
    },
    /// Absorbs every beam.
    Obstacle { extent: Vec3 },
}

impl InteractableKind {
    /// Single-sided mirror reflecting along local `normal`.
    pub fn mirror(normal: Vec3) -> Self {
        Self::Mirror {
            reflective_face_normal: normal.normalize_or_zero(),
            double_sided: false,
            half_size: 0.5,
        }
    }

    pub fn double_mirror(normal: Vec3) -> Self {
        Self::Mirror {
            reflective_face_normal: normal.normalize_or_zero(),
            double_sided: true,
            half_size: 0.5,
        }
    }

    /// Prism emitting red and blue 45° to either side of its local forward (-Z) axis.
    pub fn prism() -> Self {
        let forward = -Vec3::Z;
        Self::DispersionPrism {
            split_colors: (Color::RED, Color::BLUE),
            split_local_directions: (
                Quat::from_rotation_y(std::f32::consts::FRAC_PI_4) * forward,
                Quat::from_rotation_y(-std::f32::consts::FRAC_PI_4) * forward,
            ),
            half_extent: 0.5,
        }
    }

    /// Unit cube obstacle.
    pub fn obstacle() -> Self {
        Self::Obstacle {
            extent: Vec3::splat(0.5),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mirror {
                double_sided: true, ..
            } => "double mirror",
            Self::Mirror { .. } => "mirror",
            Self::DispersionPrism { .. } => "prism",
            Self::Obstacle { .. } => "obstacle",
        }
    }
}

/// A mirror, prism or obstacle placed in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interactable {
    pub id: ObjectId,
    pub pose: Pose,
    pub kind: InteractableKind,
}

impl Interactable {
    pub fn new(id: ObjectId, pose: Pose, kind: InteractableKind) -> Self {
        Self { id, pose, kind }
    }
}

/// What a hit's owner id resolves to.
#[derive(Debug, Clone, Copy)]
pub enum SceneObject<'a> {
    Sensor(&'a Sensor),
    Interactable(&'a Interactable),
}

/// Immutable scene handed to the propagator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    pub source: Option<LaserSource>,
    pub sensors: Vec<Sensor>,
    pub interactables: Vec<Interactable>,
}

impl SceneSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: LaserSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactables.push(interactable);
        self
    }

    /// Resolves a hit owner to its object. Scenes are small, so a linear scan is fine.
    pub fn find(&self, id: ObjectId) -> Option<SceneObject<'_>> {
        if let Some(sensor) = self.sensors.iter().find(|s| s.id == id) {
            return Some(SceneObject::Sensor(sensor));
        }
        self.interactables
            .iter()
            .find(|i| i.id == id)
            .map(SceneObject::Interactable)
    }

    /// Checks ids are unique, directions are unit length and poses and colors are sane.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .sensors
            .iter()
            .map(|s| s.id)
            .chain(self.interactables.iter().map(|i| i.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(BeamlineError::DuplicateId(id));
            }
        }

        if let Some(source) = &self.source {
            if !source.position.is_finite() || !is_unit(source.direction) {
                return Err(BeamlineError::InvalidScene(
                    "Laser source needs a finite position and a unit direction".into(),
                ));
            }
        }

        for sensor in &self.sensors {
            if !sensor.pose.is_finite() || !is_unit(sensor.facing) {
                return Err(BeamlineError::InvalidScene(format!(
                    "Sensor {} needs a finite pose and a unit facing direction",
                    sensor.id
                )));
            }
            sensor.required_color.validate().map_err(|e| {
                BeamlineError::InvalidScene(format!("Sensor {}: {}", sensor.id, e))
            })?;
        }

        for object in &self.interactables {
            if !object.pose.is_finite() {
                return Err(BeamlineError::InvalidScene(format!(
                    "{} {} has a non-finite pose",
                    object.kind.name(),
                    object.id
                )));
            }
            match object.kind {
                InteractableKind::Mirror {
                    reflective_face_normal,
                    ..
                } => {
                    if !is_unit(reflective_face_normal) {
                        return Err(BeamlineError::InvalidScene(format!(
                            "Mirror {} needs a unit reflective face normal",
                            object.id
                        )));
                    }
                }
                InteractableKind::DispersionPrism {
                    split_colors: (a, b),
                    split_local_directions: (da, db),
                    ..
                } => {
                    if !is_unit(da) || !is_unit(db) {
                        return Err(BeamlineError::InvalidScene(format!(
                            "Prism {} needs unit split directions",
                            object.id
                        )));
                    }
                    for color in [a, b] {
                        color.validate().map_err(|e| {
                            BeamlineError::InvalidScene(format!("Prism {}: {}", object.id, e))
                        })?;
                    }
                }
                InteractableKind::Obstacle { extent } => {
                    if !extent.is_finite() || extent.min_element() <= EPSILON {
                        return Err(BeamlineError::InvalidScene(format!(
                            "Obstacle {} needs a positive extent",
                            object.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
