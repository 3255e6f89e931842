//! Event types for Beamline

use crate::scene::{Color, ObjectId};

#[derive(Debug, Clone, PartialEq)]
pub enum BeamlineEvent {
    LaserToggled {
        active: bool,
    },
    StageLoaded {
        stage_id: u32,
    },
    ObjectPlaced {
        object_id: ObjectId,
    },
    ObjectRemoved {
        object_id: ObjectId,
    },
    SensorActivated {
        sensor_id: ObjectId,
        color: Color,
    },
    SensorDeactivated {
        sensor_id: ObjectId,
    },
    StageCleared {
        stage_id: u32,
    },
}

impl BeamlineEvent {
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::ObjectPlaced { object_id } | Self::ObjectRemoved { object_id } => {
                Some(*object_id)
            }
            _ => None,
        }
    }

    pub fn sensor_id(&self) -> Option<ObjectId> {
        match self {
            Self::SensorActivated { sensor_id, .. } | Self::SensorDeactivated { sensor_id } => {
                Some(*sensor_id)
            }
            _ => None,
        }
    }

    pub fn is_sensor_event(&self) -> bool {
        matches!(
            self,
            Self::SensorActivated { .. } | Self::SensorDeactivated { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let placed = BeamlineEvent::ObjectPlaced {
            object_id: ObjectId(3),
        };
        assert_eq!(placed.object_id(), Some(ObjectId(3)));
        assert_eq!(placed.sensor_id(), None);
        assert!(!placed.is_sensor_event());

        let activated = BeamlineEvent::SensorActivated {
            sensor_id: ObjectId(1),
            color: Color::RED,
        };
        assert_eq!(activated.sensor_id(), Some(ObjectId(1)));
        assert!(activated.is_sensor_event());
        assert!(BeamlineEvent::SensorDeactivated {
            sensor_id: ObjectId(1)
        }
        .is_sensor_event());
    }
}
