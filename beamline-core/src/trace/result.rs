//! Output of a propagation pass.

use crate::math::Vec3;
use crate::scene::{Color, ObjectId};
use std::collections::BTreeMap;

/// A drawable stretch of beam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Color,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3, color: Color) -> Self {
        Self { start, end, color }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Per-sensor state for a single pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorState {
    /// Sensor is satisfied in this pass
    pub is_hit: bool,
    /// Color of the last beam that reached the sensor, used for UI hints
    pub last_color: Option<Color>,
    /// Distinct colors that reached the sensor, in arrival order
    pub colors_seen: Vec<Color>,
}

impl SensorState {
    pub(crate) fn record(&mut self, color: Color) {
        self.last_color = Some(color);
        if !self.colors_seen.contains(&color) {
            self.colors_seen.push(color);
        }
    }

    pub fn has_seen(&self, color: Color) -> bool {
        self.colors_seen.contains(&color)
    }
}

/// Counters describing how much work a pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Rays popped from the worklist and cast
    pub rays_processed: usize,
    /// Deepest lineage that was cast
    pub max_depth_reached: u32,
    /// Rays discarded for exceeding the depth bound
    pub rays_dropped: usize,
    /// The work cap stopped the pass before the worklist drained
    pub truncated: bool,
}

/// Everything a renderer and the game loop need from one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceResult {
    /// Beam segments in breadth-first emission order
    pub segments: Vec<Segment>,
    /// State of every sensor in the snapshot, keyed by id
    pub sensor_states: BTreeMap<ObjectId, SensorState>,
    /// Win verdict for this pass
    pub success: bool,
    pub stats: TraceStats,
}

impl TraceResult {
    /// Result with no beam and every listed sensor cleared.
    pub fn reset<I: IntoIterator<Item = ObjectId>>(sensor_ids: I) -> Self {
        Self {
            sensor_states: sensor_ids
                .into_iter()
                .map(|id| (id, SensorState::default()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn sensor(&self, id: ObjectId) -> Option<&SensorState> {
        self.sensor_states.get(&id)
    }

    pub fn is_sensor_hit(&self, id: ObjectId) -> bool {
        self.sensor(id).is_some_and(|state| state.is_hit)
    }

    /// Total drawn beam length.
    pub fn beam_length(&self) -> f32 {
        self.segments.iter().map(Segment::length).sum()
    }
}
