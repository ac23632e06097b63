pub mod animation;
pub mod behavior;
pub mod input;
pub mod physics;

use crate::ecs::components::{
    Animation, Behavior, Bounds, Drag, Extent, FrameCache, Pet, Position, SecondaryClick, Velocity,
};
use crate::error::TickError;
use crate::input::{Buttons, InputSnapshot};
use crate::render::RenderFrame;
use crate::rng::RandomSource;
use crate::settings::Tuning;
use crate::sprite::FrameSource;

/// Everything one tick shares across agents.
pub struct TickContext<'a> {
    pub input: &'a InputSnapshot,
    /// Button state at the previous tick, for edge detection.
    pub previous: Buttons,
    /// Simulated seconds this tick covers.
    pub dt: f64,
    pub rng: &'a mut dyn RandomSource,
    pub frames: &'a dyn FrameSource,
    pub tuning: &'a Tuning,
}

/// What one agent produced this tick.
#[derive(Debug)]
pub struct AgentTick {
    pub frame: RenderFrame,
    /// Secondary click completed on this agent.
    pub inbox_requested: bool,
    pub state_changed: bool,
}

type AgentQuery<'a> = (
    &'a Pet,
    &'a mut Position,
    &'a mut Extent,
    &'a mut Velocity,
    &'a mut Drag,
    &'a mut SecondaryClick,
    &'a mut Behavior,
    &'a mut Animation,
    &'a mut FrameCache,
    &'a Bounds,
);

/// Run one agent through input, physics, state and animation, in that
/// order, and snapshot the result.
pub fn tick_agent(world: &mut hecs::World, entity: hecs::Entity, ctx: &mut TickContext<'_>) -> Result<AgentTick, TickError> {
    let (pet, pos, extent, vel, drag, latch, behavior, anim, cache, bounds) = world
        .query_one_mut::<AgentQuery<'_>>(entity)
        .map_err(|_| TickError::MissingComponents { entity })?;

    let pointer = ctx.input.pointer;
    let inside = bounds.contains(pos.0, extent.0, pointer);

    // 1. Secondary click hook
    let inbox_requested = input::secondary_click(latch, ctx.previous, ctx.input, inside);

    // 2. Drag capture / release
    let held = input::drag(drag, pos, vel, extent.0, bounds, ctx.input, ctx.previous, ctx.tuning);

    // 3. Throw
    let airborne = !held && physics::throw(pos, vel, extent.0, bounds, ctx.tuning);

    // 4. State machine, paused while held or airborne
    let state_changed = if held || airborne {
        false
    } else {
        behavior::update(behavior, pos, extent.0, bounds, &pet.table, pointer, &mut *ctx.rng, ctx.tuning)?
    };
    if state_changed {
        animation::enter_state(pet, behavior, anim, extent, cache, ctx.frames);
    }

    // 5. Animation
    animation::advance(anim, ctx.dt);

    pos.0 = bounds.clamp(pos.0, extent.0);

    Ok(AgentTick {
        frame: RenderFrame::from_components(entity, pos, extent, anim, behavior),
        inbox_requested,
        state_changed,
    })
}
