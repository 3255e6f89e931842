//! Scene description and intersection queries.
//!
//! The scene system consists of four parts:
//!
//! 1. **SceneSnapshot** - Immutable view of the source, sensors and interactables
//! 2. **IntersectionQuery** - Trait answering "what does this ray hit?"
//! 3. **PrimitiveScene** - Bundled analytic implementation of the query
//! 4. **Color** - Beam colors and the canonical presets
//!
//! # Workflow
//!
//! 1. Build a `SceneSnapshot` describing the puzzle state
//! 2. Build geometry for it, either `PrimitiveScene::from_snapshot()` or your
//!    engine's own raycaster implementing `IntersectionQuery`
//! 3. Hand both to [`crate::trace::propagate`]
//!
//! # Example
//!
//! ```
//! use beamline_core::math::Vec3;
//! use beamline_core::scene::{Color, LaserSource, ObjectId, PrimitiveScene, SceneSnapshot, Sensor};
//!
//! let snapshot = SceneSnapshot::new()
//!     .with_source(LaserSource::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z))
//!     .with_sensor(Sensor::new(ObjectId(1), Vec3::new(0.0, 0.0, -5.0), Vec3::Z, Color::WHITE));
//! let geometry = PrimitiveScene::from_snapshot(&snapshot);
//!
//! let result = beamline_core::trace::propagate(&snapshot, &geometry, true);
//! assert!(result.success);
//! ```

pub mod color;
pub mod geometry;
pub mod query;
pub mod snapshot;

pub use color::Color;
pub use geometry::{Primitive, PrimitiveScene, Shape};
pub use query::{IgnoreSet, IntersectionQuery, RayHit};
pub use snapshot::{
    Interactable, InteractableKind, LaserSource, ObjectId, SceneObject, SceneSnapshot, Sensor,
};
