use crate::error::{BeamlineError, Result};
use crate::trace::WinRule;

/// How a white beam is split by a dispersion prism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitPolicy {
    /// Children leave the prism's center along its own split directions,
    /// rotated with the prism.
    #[default]
    LocalDirections,
    /// Children leave a fixed distance past the entry point, rotated ±45°
    /// about world up from the incoming direction. Ignores prism rotation.
    WorldUpRotation,
}

/// How several beams reaching the same sensor in one pass are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorResolution {
    /// The last beam evaluated decides, so a later mismatch clears an earlier match.
    #[default]
    LastRayWins,
    /// Any matching beam keeps the sensor satisfied for the rest of the pass.
    AnyMatch,
}

/// Tunables for a propagation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceConfig {
    /// Deepest interaction count a beam lineage may reach
    pub max_depth: u32,
    /// Total rays processed per pass before expansion stops
    pub max_rays: usize,
    /// Length of the segment drawn for a beam that hits nothing
    pub max_range: f32,
    /// Offset along the normal applied to reflected ray origins
    pub surface_offset: f32,
    /// Minimum `facing · -direction` for a sensor to accept a beam
    pub alignment_threshold: f32,
    /// Distance travelled inside a prism before splitting ([`SplitPolicy::WorldUpRotation`] only)
    pub pass_through_distance: f32,
    pub split_policy: SplitPolicy,
    pub sensor_resolution: SensorResolution,
    pub win_rule: WinRule,
}

impl Default for TraceConfig {
    fn default() -> Self {
        let max_depth = 20;
        Self {
            max_depth,
            max_rays: 10 * max_depth as usize,
            max_range: 50.0,
            surface_offset: 0.01,
            alignment_threshold: 0.5,
            pass_through_distance: 1.0,
            split_policy: SplitPolicy::default(),
            sensor_resolution: SensorResolution::default(),
            win_rule: WinRule::default(),
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the depth bound. The work cap follows at ten times the depth.
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self.max_rays = 10 * depth as usize;
        self
    }

    pub fn max_rays(mut self, max: usize) -> Self {
        self.max_rays = max;
        self
    }

    pub fn max_range(mut self, range: f32) -> Self {
        self.max_range = range;
        self
    }

    pub fn surface_offset(mut self, offset: f32) -> Self {
        self.surface_offset = offset;
        self
    }

    pub fn alignment_threshold(mut self, threshold: f32) -> Self {
        self.alignment_threshold = threshold;
        self
    }

    pub fn pass_through_distance(mut self, distance: f32) -> Self {
        self.pass_through_distance = distance;
        self
    }

    pub fn split_policy(mut self, policy: SplitPolicy) -> Self {
        self.split_policy = policy;
        self
    }

    pub fn sensor_resolution(mut self, resolution: SensorResolution) -> Self {
        self.sensor_resolution = resolution;
        self
    }

    pub fn win_rule(mut self, rule: WinRule) -> Self {
        self.win_rule = rule;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rays == 0 {
            return Err(BeamlineError::Configuration(
                "max_rays must be at least 1".into(),
            ));
        }
        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(BeamlineError::Configuration(format!(
                "max_range must be positive, got {}",
                self.max_range
            )));
        }
        if !(self.surface_offset.is_finite() && self.surface_offset >= 0.0) {
            return Err(BeamlineError::Configuration(format!(
                "surface_offset must be non-negative, got {}",
                self.surface_offset
            )));
        }
        if !(-1.0..1.0).contains(&self.alignment_threshold) {
            return Err(BeamlineError::Configuration(format!(
                "alignment_threshold must be in [-1, 1), got {}",
                self.alignment_threshold
            )));
        }
        if !(self.pass_through_distance.is_finite() && self.pass_through_distance >= 0.0) {
            return Err(BeamlineError::Configuration(format!(
                "pass_through_distance must be non-negative, got {}",
                self.pass_through_distance
            )));
        }
        Ok(())
    }
}
