use crate::stages::{self, Move};
use anyhow::{Context, Result, bail};
use beamline_core::{BeamlineEvent, BeamlineWorld, ObjectId, StageDesc, TraceResult};

pub fn run(selection: Option<u32>) -> Result<()> {
    let selected: Vec<StageDesc> = match selection {
        Some(id) => vec![stages::by_id(id).with_context(|| format!("No stage with id {}", id))?],
        None => stages::all(),
    };

    let mut remaining = selected.into_iter();
    let Some(first) = remaining.next() else {
        bail!("No stages to run");
    };

    let mut world = BeamlineWorld::new(first)?;
    world.set_laser_active(true);
    play_stage(&mut world)?;

    for stage in remaining {
        world.load_stage(stage)?;
        play_stage(&mut world)?;
    }

    log::info!("All selected stages cleared");
    Ok(())
}

fn play_stage(world: &mut BeamlineWorld) -> Result<()> {
    let stage_id = world.stage().id;
    log::info!("=== {} ===", world.stage().message);

    let before = world.update();
    report(&before);
    drain_events(world);

    let mut last_placed: Option<ObjectId> = None;
    for step in stages::solution(stage_id) {
        match step {
            Move::Mirror(desc) => last_placed = Some(world.add_mirror(desc)?),
            Move::Prism(pose) => last_placed = Some(world.add_prism(pose)?),
            Move::MoveLast(position) => {
                let id = last_placed.context("Nothing placed yet to move")?;
                world.move_object(id, position)?;
            }
        }
        let result = world.update();
        log::info!("After {:?}:", step);
        report(&result);
        drain_events(world);
    }

    let cleared = world.last_result().is_some_and(|r| r.success);
    if !cleared {
        bail!("Stage {} was not cleared by its solution", stage_id);
    }
    log::info!(
        "Stage {} cleared using {} of {} placements",
        stage_id,
        world.placed_count(),
        world.stage().max_mirrors
    );
    Ok(())
}

fn report(result: &TraceResult) {
    log::info!(
        "  {} segment(s), beam length {:.2}, {} ray(s) cast{}",
        result.segments.len(),
        result.beam_length(),
        result.stats.rays_processed,
        if result.stats.truncated { ", truncated" } else { "" }
    );
    for (id, state) in &result.sensor_states {
        let seen: Vec<String> = state.colors_seen.iter().map(|c| c.to_string()).collect();
        log::info!(
            "  sensor {}: hit = {}, seen [{}]",
            id,
            state.is_hit,
            seen.join(", ")
        );
    }
}

fn drain_events(world: &BeamlineWorld) {
    for event in world.poll_events() {
        match event {
            BeamlineEvent::StageCleared { stage_id } => {
                log::info!("  * Stage {} cleared", stage_id)
            }
            BeamlineEvent::SensorActivated { sensor_id, color } => {
                log::info!("  * Sensor {} activated by {}", sensor_id, color)
            }
            other => log::debug!("  * {:?}", other),
        }
    }
}
