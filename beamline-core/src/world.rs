use crate::config::StageDesc;
use crate::error::{BeamlineError, Result};
use crate::events::BeamlineEvent;
use crate::math::{Pose, Quat, Vec3};
use crate::scene::{
    Interactable, InteractableKind, ObjectId, PrimitiveScene, SceneSnapshot, Sensor,
};
use crate::trace::{Propagator, TraceResult};
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Owner id stamped on room wall geometry. Never assigned to an object.
pub const ROOM_ID: ObjectId = ObjectId(0);

/// Local axis used by [`BeamlineWorld::rotate_object`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Player mirror placement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorDesc {
    pub pose: Pose,
    /// Local normal of the reflective face
    pub reflective_face_normal: Vec3,
    pub double_sided: bool,
}

impl MirrorDesc {
    pub fn new(pose: Pose, reflective_face_normal: Vec3) -> Self {
        Self {
            pose,
            reflective_face_normal: reflective_face_normal.normalize_or_zero(),
            double_sided: false,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedObject {
    interactable: Interactable,
    /// Placed by the stage rather than the player
    fixed: bool,
}

/// Stateful puzzle scene that the game loop edits and traces.
///
/// `BeamlineWorld` owns the current stage, the objects the player has placed
/// and the laser toggle. Each [`update`](Self::update) builds a fresh
/// [`SceneSnapshot`], runs one propagation pass and diffs the outcome against
/// the previous pass to emit [`BeamlineEvent`]s.
///
/// # Example
///
/// ```no_run
/// # use beamline_core::*;
/// # use beamline_core::math::{Pose, Vec3};
/// let mut world = BeamlineWorld::new(StageDesc::default())?;
/// let mirror = world.add_mirror(MirrorDesc::new(
///     Pose::from_position(Vec3::new(0.0, -7.0, 0.0)),
///     Vec3::new(1.0, 0.0, 1.0),
/// ))?;
/// world.set_laser_active(true);
/// let _result = world.update();
/// for event in world.poll_events() {
///     if let BeamlineEvent::StageCleared { stage_id } = event {
///         println!("Stage {} cleared with mirror {}", stage_id, mirror);
///     }
/// }
/// # Ok::<(), BeamlineError>(())
/// ```
pub struct BeamlineWorld {
    stage: StageDesc,
    propagator: Propagator,
    sensors: Vec<Sensor>,
    objects: Vec<PlacedObject>,
    next_object_id: u64,
    laser_active: bool,
    last_result: Option<TraceResult>,
    event_sender: Sender<BeamlineEvent>,
    event_receiver: Receiver<BeamlineEvent>,
}

impl BeamlineWorld {
    pub fn new(stage: StageDesc) -> Result<Self> {
        stage.validate()?;
        let (event_sender, event_receiver) = unbounded();
        let mut world = Self {
            propagator: Propagator::new(stage.trace.clone()),
            stage: StageDesc::default(),
            sensors: Vec::new(),
            objects: Vec::new(),
            next_object_id: ROOM_ID.0 + 1,
            laser_active: false,
            last_result: None,
            event_sender,
            event_receiver,
        };
        world.load_stage(stage)?;
        Ok(world)
    }

    /// Replaces the stage, discarding every placed object and restarting id allocation.
    ///
    /// The stage contents are checked as a scene before anything is replaced,
    /// so a rejected stage leaves the world as it was. The laser toggle is kept.
    pub fn load_stage(&mut self, stage: StageDesc) -> Result<()> {
        stage.validate()?;

        let mut ids = (ROOM_ID.0 + 1..).map(ObjectId);
        let sensors: Vec<Sensor> = stage
            .sensors
            .iter()
            .zip(ids.by_ref())
            .map(|(desc, id)| Sensor::new(id, desc.position, desc.facing, desc.required_color))
            .collect();
        let objects: Vec<PlacedObject> = stage
            .fixed_elements
            .iter()
            .zip(ids.by_ref())
            .map(|(element, id)| PlacedObject {
                interactable: Interactable::new(id, element.pose, element.kind),
                fixed: true,
            })
            .collect();

        SceneSnapshot {
            source: stage.source,
            sensors: sensors.clone(),
            interactables: objects.iter().map(|o| o.interactable).collect(),
        }
        .validate()?;

        log::info!(
            "Loaded stage {} ({} sensor(s), {} fixed element(s), {} mirror(s) allowed)",
            stage.id,
            sensors.len(),
            objects.len(),
            stage.max_mirrors
        );

        self.next_object_id = (ROOM_ID.0 + 1) + (sensors.len() + objects.len()) as u64;
        self.sensors = sensors;
        self.objects = objects;
        self.last_result = None;
        self.propagator = Propagator::new(stage.trace.clone());
        let stage_id = stage.id;
        self.stage = stage;
        self.emit(BeamlineEvent::StageLoaded { stage_id });
        Ok(())
    }

    pub fn stage(&self) -> &StageDesc {
        &self.stage
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Number of player-placed objects counting against the mirror budget.
    pub fn placed_count(&self) -> usize {
        self.objects.iter().filter(|o| !o.fixed).count()
    }

    pub fn remaining_budget(&self) -> usize {
        self.stage.max_mirrors.saturating_sub(self.placed_count())
    }

    /// Places a mirror for the player, snapping it to the room grid.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::MirrorBudgetExceeded`] when the stage's budget
    /// is used up.
    pub fn add_mirror(&mut self, desc: MirrorDesc) -> Result<ObjectId> {
        let kind = if desc.double_sided {
            InteractableKind::double_mirror(desc.reflective_face_normal)
        } else {
            InteractableKind::mirror(desc.reflective_face_normal)
        };
        self.place(kind, desc.pose)
    }

    /// Places a dispersion prism. Prisms draw on the same budget as mirrors.
    pub fn add_prism(&mut self, pose: Pose) -> Result<ObjectId> {
        self.place(InteractableKind::prism(), pose)
    }

    fn place(&mut self, kind: InteractableKind, pose: Pose) -> Result<ObjectId> {
        if self.remaining_budget() == 0 {
            return Err(BeamlineError::MirrorBudgetExceeded {
                max: self.stage.max_mirrors,
            });
        }
        let normal_ok = match kind {
            InteractableKind::Mirror {
                reflective_face_normal,
                ..
            } => reflective_face_normal.is_finite() && reflective_face_normal != Vec3::ZERO,
            _ => true,
        };
        if !normal_ok || !pose.is_finite() {
            return Err(BeamlineError::InvalidScene(format!(
                "Cannot place {} with a degenerate pose or normal",
                kind.name()
            )));
        }

        let id = self.allocate_id();
        let pose = Pose::new(self.snap_position(pose.position), pose.rotation);
        self.objects.push(PlacedObject {
            interactable: Interactable::new(id, pose, kind),
            fixed: false,
        });
        log::debug!("Placed {} {} at {:?}", kind.name(), id, pose.position);
        self.emit(BeamlineEvent::ObjectPlaced { object_id: id });
        Ok(id)
    }

    /// Moves a placed object, snapping to the room grid.
    pub fn move_object(&mut self, id: ObjectId, position: Vec3) -> Result<()> {
        let snapped = self.snap_position(position);
        let object = self.editable_mut(id)?;
        object.pose.position = snapped;
        Ok(())
    }

    /// Rotates a placed object by `angle` radians about one of its local axes.
    pub fn rotate_object(&mut self, id: ObjectId, axis: RotationAxis, angle: f32) -> Result<()> {
        let object = self.editable_mut(id)?;
        let rotation = object.pose.rotation * Quat::from_axis_angle(axis.unit(), angle);
        object.pose.rotation = rotation.normalize();
        Ok(())
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        self.editable_mut(id)?;
        self.objects.retain(|o| o.interactable.id != id);
        self.emit(BeamlineEvent::ObjectRemoved { object_id: id });
        Ok(())
    }

    pub fn object(&self, id: ObjectId) -> Option<&Interactable> {
        self.objects
            .iter()
            .find(|o| o.interactable.id == id)
            .map(|o| &o.interactable)
    }

    pub fn set_laser_active(&mut self, active: bool) {
        if self.laser_active != active {
            self.laser_active = active;
            self.emit(BeamlineEvent::LaserToggled { active });
        }
    }

    pub fn is_laser_active(&self) -> bool {
        self.laser_active
    }

    /// Snaps to the centre of the unit cell containing `position` and clamps
    /// inside the room.
    ///
    /// Cells are laid out from the room's minimum corner, so an odd room size
    /// puts cell centres on whole numbers and an even one on half units.
    pub fn snap_position(&self, position: Vec3) -> Vec3 {
        let half = self.stage.room_size / 2.0;
        let limit = Vec3::splat(half - 0.5);
        let corner = Vec3::splat(half);
        ((position + corner).floor() - corner + Vec3::splat(0.5)).clamp(-limit, limit)
    }

    /// Immutable view of the current scene for a propagation pass.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            source: self.stage.source,
            sensors: self.sensors.clone(),
            interactables: self.objects.iter().map(|o| o.interactable).collect(),
        }
    }

    /// Reference geometry for the current scene, including the room walls
    /// when the stage makes them solid.
    pub fn geometry(&self) -> PrimitiveScene {
        let geometry = PrimitiveScene::from_snapshot(&self.snapshot());
        if self.stage.solid_walls {
            geometry.with_room(ROOM_ID, self.stage.room_size)
        } else {
            geometry
        }
    }

    /// Runs one propagation pass and emits events for anything that changed.
    pub fn update(&mut self) -> TraceResult {
        let snapshot = self.snapshot();
        let geometry = self.geometry();
        let result = self
            .propagator
            .propagate(&snapshot, &geometry, self.laser_active);

        self.emit_transitions(&result);
        self.last_result = Some(result.clone());
        result
    }

    pub fn last_result(&self) -> Option<&TraceResult> {
        self.last_result.as_ref()
    }

    /// Drains every event emitted since the last poll.
    pub fn poll_events(&self) -> Vec<BeamlineEvent> {
        self.event_receiver.try_iter().collect()
    }

    /// Receiver for consuming events on another thread.
    pub fn event_receiver(&self) -> Receiver<BeamlineEvent> {
        self.event_receiver.clone()
    }

    fn emit_transitions(&self, result: &TraceResult) {
        let previous = self.last_result.as_ref();

        for (&sensor_id, state) in &result.sensor_states {
            let was_hit = previous.is_some_and(|p| p.is_sensor_hit(sensor_id));
            match (was_hit, state.is_hit) {
                (false, true) => {
                    if let Some(color) = state.last_color {
                        self.emit(BeamlineEvent::SensorActivated { sensor_id, color });
                    }
                }
                (true, false) => self.emit(BeamlineEvent::SensorDeactivated { sensor_id }),
                _ => {}
            }
        }

        let was_cleared = previous.is_some_and(|p| p.success);
        if result.success && !was_cleared {
            log::info!("Stage {} cleared", self.stage.id);
            self.emit(BeamlineEvent::StageCleared {
                stage_id: self.stage.id,
            });
        }
    }

    fn editable_mut(&mut self, id: ObjectId) -> Result<&mut Interactable> {
        let object = self
            .objects
            .iter_mut()
            .find(|o| o.interactable.id == id)
            .ok_or(BeamlineError::UnknownObject(id))?;
        if object.fixed {
            return Err(BeamlineError::ObjectLocked(id));
        }
        Ok(&mut object.interactable)
    }

    fn allocate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    fn emit(&self, event: BeamlineEvent) {
        // The world holds a receiver, so the channel cannot be disconnected
        let _ = self.event_sender.send(event);
    }
}
