//! Breadth-first beam propagation.

use crate::config::{SensorResolution, TraceConfig};
use crate::math::is_unit;
use crate::scene::{IntersectionQuery, ObjectId, SceneSnapshot};
use crate::trace::handlers::{self, SensorUpdate};
use crate::trace::{Ray, SensorState, TraceResult, win};
use std::collections::{BTreeMap, VecDeque};

/// Runs propagation passes with a fixed configuration.
///
/// A pass is a pure function of the snapshot, the query and the active flag.
/// Nothing is carried over from earlier passes, so the same inputs always
/// produce the same [`TraceResult`].
#[derive(Debug, Clone, Default)]
pub struct Propagator {
    config: TraceConfig,
}

impl Propagator {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Traces the laser through `scene` and evaluates the win condition.
    ///
    /// With `active == false` or no source the result is a reset: no
    /// segments, every sensor cleared, no success.
    ///
    /// Lineages deeper than `max_depth` are dropped and the pass stops
    /// expanding after `max_rays` casts, so every pass terminates.
    pub fn propagate<Q>(&self, scene: &SceneSnapshot, query: &Q, active: bool) -> TraceResult
    where
        Q: IntersectionQuery + ?Sized,
    {
        let mut result = TraceResult::reset(scene.sensors.iter().map(|s| s.id));

        let source = match scene.source {
            Some(source) if active => source,
            _ => {
                log::trace!("Laser inactive or no source, returning reset trace");
                return result;
            }
        };
        if !source.position.is_finite() || !is_unit(source.direction) {
            log::warn!(
                "Laser source at {:?} has no usable direction, returning reset trace",
                source.position
            );
            return result;
        }

        let config = &self.config;
        let stats = &mut result.stats;
        let mut queue = VecDeque::new();
        queue.push_back(Ray::seed(&source));

        while let Some(ray) = queue.pop_front() {
            if ray.depth > config.max_depth {
                stats.rays_dropped += 1;
                continue;
            }
            if stats.rays_processed >= config.max_rays {
                stats.truncated = true;
                log::debug!(
                    "Work cap of {} rays reached, {} ray(s) left unexpanded",
                    config.max_rays,
                    queue.len() + 1
                );
                break;
            }
            stats.rays_processed += 1;
            stats.max_depth_reached = stats.max_depth_reached.max(ray.depth);

            let interaction =
                match query.nearest(ray.origin, ray.direction, config.max_range, &ray.ignore) {
                    Some(hit) => handlers::dispatch(&ray, &hit, scene, config),
                    None => handlers::escape(&ray, config),
                };

            result.segments.extend(interaction.segments);
            if let Some(update) = interaction.sensor_update {
                apply_sensor_update(&mut result.sensor_states, update, config.sensor_resolution);
            }
            for child in interaction.children {
                if child.depth > config.max_depth {
                    log::trace!("Dropping ray at depth {}", child.depth);
                    stats.rays_dropped += 1;
                    continue;
                }
                queue.push_back(child);
            }
        }

        result.success = win::evaluate(result.sensor_states.values(), config.win_rule);

        log::debug!(
            "Pass complete: {} rays, {} segments, {} dropped, success = {}",
            result.stats.rays_processed,
            result.segments.len(),
            result.stats.rays_dropped,
            result.success
        );

        result
    }
}

fn apply_sensor_update(
    states: &mut BTreeMap<ObjectId, SensorState>,
    update: SensorUpdate,
    resolution: SensorResolution,
) {
    let state = states.entry(update.sensor).or_default();
    state.record(update.color);
    state.is_hit = match resolution {
        SensorResolution::LastRayWins => update.matched,
        SensorResolution::AnyMatch => state.is_hit || update.matched,
    };
}

/// Runs a single pass with the default [`TraceConfig`].
pub fn propagate<Q>(scene: &SceneSnapshot, query: &Q, active: bool) -> TraceResult
where
    Q: IntersectionQuery + ?Sized,
{
    Propagator::default().propagate(scene, query, active)
}
