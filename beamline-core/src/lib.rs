pub mod config;
pub mod error;
pub mod events;
pub mod math;
pub mod scene;
pub mod trace;
pub mod world;

pub use config::{FixedElement, SensorDesc, SensorResolution, SplitPolicy, StageDesc, TraceConfig};
pub use error::BeamlineError;
pub use events::BeamlineEvent;
pub use scene::{
    Color, IntersectionQuery, Interactable, InteractableKind, LaserSource, ObjectId,
    PrimitiveScene, RayHit, SceneSnapshot, Sensor,
};
pub use trace::{Propagator, Segment, SensorState, TraceResult, WinRule, propagate};
pub use world::{BeamlineWorld, MirrorDesc, ROOM_ID, RotationAxis};
