//! Win conditions evaluated once per completed pass.

use crate::scene::Color;
use crate::trace::SensorState;

/// Acceptance rule for a pass. The two rules describe different games and
/// are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WinRule {
    /// At least one sensor exists and every sensor is satisfied by this pass.
    #[default]
    AllSensorsHit,
    /// Some sensor received pure white, or received both red and blue,
    /// regardless of its required color or incidence.
    WhiteOrRedAndBlue,
}

/// Applies `rule` to the sensor states of one pass.
pub fn evaluate<'a, I>(sensors: I, rule: WinRule) -> bool
where
    I: IntoIterator<Item = &'a SensorState>,
{
    let mut sensors = sensors.into_iter().peekable();
    match rule {
        WinRule::AllSensorsHit => sensors.peek().is_some() && sensors.all(|s| s.is_hit),
        WinRule::WhiteOrRedAndBlue => sensors.any(|s| {
            s.has_seen(Color::WHITE) || (s.has_seen(Color::RED) && s.has_seen(Color::BLUE))
        }),
    }
}
