use beamline_core::math::{Pose, Vec3};
use beamline_core::{
    Color, FixedElement, LaserSource, MirrorDesc, SensorDesc, StageDesc, TraceConfig, WinRule,
};

/// Height of a unit cube resting on the floor of the default room.
pub const FLOOR_Y: f32 = -7.0;

pub fn all() -> Vec<StageDesc> {
    vec![first_light(), dispersion(), four_walls()]
}

pub fn by_id(id: u32) -> Option<StageDesc> {
    all().into_iter().find(|stage| stage.id == id)
}

fn at(x: f32, z: f32) -> Vec3 {
    Vec3::new(x, FLOOR_Y, z)
}

fn first_light() -> StageDesc {
    StageDesc {
        id: 1,
        message: "Stage 1: First light".into(),
        source: Some(LaserSource::new(at(-7.0, 7.0), -Vec3::Z)),
        sensors: vec![SensorDesc::new(at(7.0, -7.0), -Vec3::X, Color::WHITE)],
        max_mirrors: 10,
        ..Default::default()
    }
}

fn dispersion() -> StageDesc {
    StageDesc {
        id: 2,
        message: "Stage 2: Dispersion".into(),
        source: Some(LaserSource::new(at(0.0, 7.0), -Vec3::Z)),
        sensors: vec![SensorDesc::new(at(0.0, -7.0), Vec3::Z, Color::WHITE)],
        // One prism and two mirrors
        max_mirrors: 3,
        trace: TraceConfig::new().win_rule(WinRule::WhiteOrRedAndBlue),
        ..Default::default()
    }
}

fn four_walls() -> StageDesc {
    StageDesc {
        id: 3,
        message: "Stage 3: Four walls".into(),
        source: Some(LaserSource::new(at(-7.0, -7.0), Vec3::Z)),
        sensors: vec![SensorDesc::new(at(7.0, 7.0), -Vec3::Z, Color::WHITE)],
        fixed_elements: vec![FixedElement::obstacle(at(0.0, 0.0))],
        max_mirrors: 5,
        solid_walls: true,
        ..Default::default()
    }
}

/// A player action replayed by the demo.
#[derive(Debug, Clone, Copy)]
pub enum Move {
    Mirror(MirrorDesc),
    Prism(Pose),
    /// Moves the most recently placed object
    MoveLast(Vec3),
}

fn mirror(position: Vec3, normal: Vec3) -> Move {
    Move::Mirror(MirrorDesc::new(Pose::from_position(position), normal))
}

/// Known solution for a stage, in the order a player would make the moves.
pub fn solution(stage_id: u32) -> Vec<Move> {
    match stage_id {
        1 => vec![mirror(at(-7.0, -7.0), Vec3::new(1.0, 0.0, 1.0))],
        2 => vec![
            Move::Prism(Pose::from_position(at(0.0, 5.0))),
            mirror(at(-6.0, -1.0), Vec3::X),
            mirror(at(6.0, -1.0), -Vec3::X),
        ],
        3 => vec![
            // Straight across the middle runs into the obstacle
            mirror(at(-7.0, 0.0), Vec3::new(1.0, 0.0, -1.0)),
            Move::MoveLast(at(-7.0, -3.0)),
            mirror(at(7.0, -3.0), Vec3::new(-1.0, 0.0, 1.0)),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_valid() {
        for stage in all() {
            assert!(stage.validate().is_ok(), "stage {} invalid", stage.id);
            let placements = solution(stage.id)
                .iter()
                .filter(|step| !matches!(step, Move::MoveLast(_)))
                .count();
            assert!(placements <= stage.max_mirrors);
        }
    }
}
