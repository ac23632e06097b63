use std::sync::Arc;

use glam::Vec2;

use crate::ecs::components::{Animation, Behavior, Extent, FrameCache, Pet};
use crate::error::AssetError;
use crate::sprite::{FrameSet, FrameSource};

/// Slack for summed tick durations that land a hair short of a frame boundary.
const TIME_EPSILON: f64 = 1e-9;

/// Seconds per frame, or `None` when the state holds its first frame.
pub fn frame_interval(base_fps: u32, multiplier: f32) -> Option<f64> {
    let rate = base_fps as f64 * multiplier as f64;
    (rate > 0.0).then(|| 1.0 / rate)
}

/// Resolve the frame set for the current state, scaling it on first use.
fn resolve(pet: &Pet, behavior: &Behavior, cache: &mut FrameCache, frames: &dyn FrameSource) -> Result<Arc<FrameSet>, AssetError> {
    let state = &behavior.state;
    if let Some(set) = cache.0.get(&state.name) {
        return Ok(Arc::clone(set));
    }
    let raw = frames.load(&state.asset)?;
    let set = Arc::new(FrameSet::scale(raw, pet.size, &state.asset)?);
    log::debug!(
        "{}/{}: loaded {} ({} frames, {}x{})",
        pet.table.species(),
        pet.table.color(),
        state.name,
        set.len(),
        set.width(),
        set.height()
    );
    cache.0.insert(state.name.clone(), Arc::clone(&set));
    Ok(set)
}

/// Reset the frame pipeline after a state change. The agent takes the new
/// frame set's first-frame size. A state whose frames cannot be loaded keeps
/// the previous size and draws nothing until the next change.
pub fn enter_state(
    pet: &Pet,
    behavior: &Behavior,
    anim: &mut Animation,
    extent: &mut Extent,
    cache: &mut FrameCache,
    frames: &dyn FrameSource,
) {
    anim.cursor = 0;
    anim.elapsed = 0.0;
    anim.advanced = 0;
    anim.interval = frame_interval(pet.base_fps, behavior.state.animation_speed);

    match resolve(pet, behavior, cache, frames) {
        Ok(set) => {
            extent.0 = Vec2::new(set.width() as f32, set.height() as f32);
            anim.frames = Some(set);
        }
        Err(e) => {
            log::warn!(
                "{}/{}: no frames for {}: {e}",
                pet.table.species(),
                pet.table.color(),
                behavior.state.name
            );
            anim.frames = None;
        }
    }
}

/// Advance the frame cursor by `dt` seconds of simulated time. The cursor
/// moves once for every whole interval elapsed since the state was entered.
pub fn advance(anim: &mut Animation, dt: f64) {
    let (Some(set), Some(interval)) = (&anim.frames, anim.interval) else {
        return;
    };
    let count = set.len();
    if count == 0 {
        return;
    }

    anim.elapsed += dt;
    let due = ((anim.elapsed + TIME_EPSILON) / interval).floor() as u64;
    if due > anim.advanced {
        let steps = due - anim.advanced;
        anim.cursor = ((anim.cursor as u64 + steps) % count as u64) as usize;
        anim.advanced = due;
    }
}
