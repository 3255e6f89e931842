use crate::config::TraceConfig;
use crate::error::{BeamlineError, Result};
use crate::math::{Pose, Vec3, is_unit};
use crate::scene::{Color, InteractableKind, LaserSource};

/// Sensor placement within a stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorDesc {
    pub position: Vec3,
    pub facing: Vec3,
    pub required_color: Color,
}

impl SensorDesc {
    pub fn new(position: Vec3, facing: Vec3, required_color: Color) -> Self {
        Self {
            position,
            facing: facing.normalize_or_zero(),
            required_color,
        }
    }
}

/// Object the stage places that the player cannot move, rotate or delete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedElement {
    pub pose: Pose,
    pub kind: InteractableKind,
}

impl FixedElement {
    pub fn new(pose: Pose, kind: InteractableKind) -> Self {
        Self { pose, kind }
    }

    pub fn obstacle(position: Vec3) -> Self {
        Self::new(Pose::from_position(position), InteractableKind::obstacle())
    }
}

/// Configuration descriptor for a puzzle stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageDesc {
    pub id: u32,
    /// Message shown when the stage loads
    pub message: String,
    pub source: Option<LaserSource>,
    pub sensors: Vec<SensorDesc>,
    pub fixed_elements: Vec<FixedElement>,
    /// How many mirrors and prisms the player may place
    pub max_mirrors: usize,
    /// Edge length of the cubic room; placements are clamped inside it
    pub room_size: f32,
    /// Whether the floor and walls stop beams instead of letting them escape
    pub solid_walls: bool,
    /// Settings used for every propagation pass in this stage
    pub trace: TraceConfig,
}

impl Default for StageDesc {
    fn default() -> Self {
        Self {
            id: 0,
            message: String::new(),
            source: None,
            sensors: Vec::new(),
            fixed_elements: Vec::new(),
            max_mirrors: 10,
            room_size: 15.0,
            solid_walls: false,
            trace: TraceConfig::default(),
        }
    }
}

impl StageDesc {
    pub fn validate(&self) -> Result<()> {
        if !(self.room_size.is_finite() && self.room_size >= 1.0) {
            return Err(BeamlineError::Configuration(format!(
                "room_size must be at least 1, got {}",
                self.room_size
            )));
        }
        if let Some(source) = &self.source {
            if !is_unit(source.direction) {
                return Err(BeamlineError::Configuration(
                    "Source direction must be unit length".into(),
                ));
            }
        }
        for (index, sensor) in self.sensors.iter().enumerate() {
            if !is_unit(sensor.facing) {
                return Err(BeamlineError::Configuration(format!(
                    "Sensor {} facing must be unit length",
                    index
                )));
            }
        }
        self.trace.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_is_valid() {
        assert!(StageDesc::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_sensor_rejected() {
        let stage = StageDesc {
            sensors: vec![SensorDesc::new(Vec3::ZERO, Vec3::ZERO, Color::WHITE)],
            ..Default::default()
        };
        assert!(matches!(
            stage.validate(),
            Err(BeamlineError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_trace_config_propagates() {
        let stage = StageDesc {
            trace: TraceConfig::new().max_rays(0),
            ..Default::default()
        };
        assert!(stage.validate().is_err());
    }
}
