use std::sync::Arc;

use glam::Vec2;

use crate::catalog::{StateDescriptor, StateTable, BOUNDARY_ANCHORED, CLIMB_CHAIN, WITH_BALL};
use crate::ecs::components::{Behavior, Bounds, Facing, Position};
use crate::ecs::systems::physics;
use crate::error::TickError;
use crate::rng::RandomSource;
use crate::settings::Tuning;

/// States only ever reached by explicit chaining, never drawn at random.
pub const CREATION_EXCLUDED: [&str; 6] = [
    WITH_BALL,
    CLIMB_CHAIN[0],
    CLIMB_CHAIN[1],
    CLIMB_CHAIN[2],
    CLIMB_CHAIN[3],
    CLIMB_CHAIN[4],
];

/// Once a climber is placed, the first chain state joins the random pool.
const CLIMBER_EXCLUDED: [&str; 5] = [WITH_BALL, CLIMB_CHAIN[1], CLIMB_CHAIN[2], CLIMB_CHAIN[3], CLIMB_CHAIN[4]];

/// Exclusions for selections after creation.
pub fn roaming_excluded(table: &StateTable) -> &'static [&'static str] {
    if table.is_climber() {
        &CLIMBER_EXCLUDED
    } else {
        &CREATION_EXCLUDED
    }
}

/// Uniform choice among states not in `exclude`. If that leaves nothing,
/// choose among every state instead.
pub fn choose_random_state(
    table: &StateTable,
    exclude: &[&str],
    rng: &mut dyn RandomSource,
) -> Arc<StateDescriptor> {
    let mut candidates: Vec<&Arc<StateDescriptor>> = table
        .states()
        .filter(|s| !exclude.contains(&s.name.as_str()))
        .collect();
    if candidates.is_empty() {
        candidates = table.states().collect();
    }
    let i = rng.pick(candidates.len()).min(candidates.len().saturating_sub(1));
    Arc::clone(candidates[i])
}

pub fn random_facing(rng: &mut dyn RandomSource) -> Facing {
    if rng.coin() {
        Facing::Right
    } else {
        Facing::Left
    }
}

/// Advance the state machine one tick. Only called while the agent is
/// neither held nor airborne. Returns true when the state changed, so the
/// caller can swap frame sets.
#[allow(clippy::too_many_arguments)]
pub fn update(
    behavior: &mut Behavior,
    pos: &mut Position,
    extent: Vec2,
    bounds: &Bounds,
    table: &StateTable,
    pointer: Vec2,
    rng: &mut dyn RandomSource,
    tuning: &Tuning,
) -> Result<bool, TickError> {
    if let Some(step) = behavior.climb_step {
        return climb(behavior, step, pos, extent, bounds, table, rng, tuning);
    }

    let changed = if let Some(calm) = proximity_override(behavior, pos.0, extent, table, pointer, tuning) {
        log::debug!(
            "{}/{}: {} -> {} (pointer)",
            table.species(),
            table.color(),
            behavior.state.name,
            calm.name
        );
        behavior.state = Arc::new(calm.with_hold(tuning.reactive_hold));
        behavior.counter = 0;
        behavior.immunity = true;
        true
    } else {
        behavior.counter += 1;
        pos.0.x += behavior.state.movement_speed * behavior.facing.sign();
        if behavior.counter >= behavior.state.hold {
            roam(behavior, table, rng);
            true
        } else {
            false
        }
    };

    physics::partition(pos, behavior, extent, bounds, tuning);
    Ok(changed)
}

/// The calming state to force, if the pointer is close enough and the agent
/// is not already immune.
fn proximity_override<'t>(
    behavior: &Behavior,
    origin: Vec2,
    extent: Vec2,
    table: &'t StateTable,
    pointer: Vec2,
    tuning: &Tuning,
) -> Option<&'t Arc<StateDescriptor>> {
    if behavior.immunity {
        return None;
    }
    let calm = table.get(&tuning.reactive_state)?;
    let radius = table.lie_radius().unwrap_or(extent.y);
    (origin.distance(pointer) < radius).then_some(calm)
}

/// Cycle complete: draw the next state and direction.
fn roam(behavior: &mut Behavior, table: &StateTable, rng: &mut dyn RandomSource) {
    let next = choose_random_state(table, roaming_excluded(table), rng);
    log::debug!(
        "{}/{}: {} -> {}",
        table.species(),
        table.color(),
        behavior.state.name,
        next.name
    );
    behavior.climb_step = (table.is_climber() && next.name == CLIMB_CHAIN[0]).then_some(0);
    behavior.facing = random_facing(rng);
    behavior.immunity = false;
    behavior.state = next;
    behavior.counter = 0;
}

/// One tick of the climb chain. The next chain state is resolved before
/// anything moves, so a missing state leaves the agent untouched.
#[allow(clippy::too_many_arguments)]
fn climb(
    behavior: &mut Behavior,
    step: usize,
    pos: &mut Position,
    extent: Vec2,
    bounds: &Bounds,
    table: &StateTable,
    rng: &mut dyn RandomSource,
    tuning: &Tuning,
) -> Result<bool, TickError> {
    let done = behavior.counter + 1 >= behavior.state.hold;
    let next = step + 1;
    let chained = match CLIMB_CHAIN.get(next) {
        Some(name) if done => Some(table.require(name)?),
        _ => None,
    };

    let speed = behavior.state.movement_speed.max(1.0);
    let rest_y = bounds.rest_y(extent.y);
    match step {
        0 => pos.0.y = (pos.0.y - speed).max(0.0),
        s if s == CLIMB_CHAIN.len() - 1 => pos.0.y = (pos.0.y + speed).min(rest_y),
        _ => {}
    }
    if behavior.state.name == BOUNDARY_ANCHORED {
        physics::partition(pos, behavior, extent, bounds, tuning);
    }

    behavior.counter += 1;
    if !done {
        return Ok(false);
    }

    match chained {
        Some(state) => {
            log::debug!(
                "{}/{}: {} -> {} (climb {next})",
                table.species(),
                table.color(),
                behavior.state.name,
                state.name
            );
            behavior.state = state;
            behavior.counter = 0;
            behavior.climb_step = Some(next);
        }
        None => {
            pos.0.y = rest_y;
            roam(behavior, table, rng);
        }
    }
    Ok(true)
}
