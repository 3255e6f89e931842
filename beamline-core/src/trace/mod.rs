//! Ray propagation and sensor matching.
//!
//! A pass seeds one white ray at the source and processes rays breadth-first:
//! cast, classify the nearest hit, run the category handler, enqueue children.
//! When the worklist drains, the win rule is evaluated over the sensor states.

pub mod handlers;
pub mod propagator;
pub mod ray;
pub mod result;
pub mod win;

pub use handlers::{Interaction, SensorUpdate};
pub use propagator::{Propagator, propagate};
pub use ray::Ray;
pub use result::{Segment, SensorState, TraceResult, TraceStats};
pub use win::{WinRule, evaluate};
