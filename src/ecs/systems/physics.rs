use glam::Vec2;

use crate::catalog::BOUNDARY_ANCHORED;
use crate::ecs::components::{Behavior, Bounds, Position, Velocity};
use crate::settings::Tuning;

fn at_rest(v: Vec2, tuning: &Tuning) -> bool {
    v.x.abs() < tuning.rest_threshold && v.y.abs() < tuning.rest_threshold
}

/// Integrate throw velocity for one tick: move, damp, bounce off the screen
/// edges. Returns true while the throw is still in flight; the state machine
/// sits the tick out in that case.
///
/// Velocity is zeroed exactly once both axes fall under the rest threshold.
pub fn throw(pos: &mut Position, vel: &mut Velocity, extent: Vec2, bounds: &Bounds, tuning: &Tuning) -> bool {
    if at_rest(vel.0, tuning) {
        vel.0 = Vec2::ZERO;
        return false;
    }

    pos.0 += vel.0;
    vel.0 *= tuning.damping;

    let max_x = bounds.max_x(extent.x);
    let max_y = bounds.max_y(extent.y);
    if pos.0.x < 0.0 {
        pos.0.x = 0.0;
        vel.0.x *= tuning.bounce;
    } else if pos.0.x > max_x {
        pos.0.x = max_x;
        vel.0.x *= tuning.bounce;
    }
    if pos.0.y < 0.0 {
        pos.0.y = 0.0;
        vel.0.y *= tuning.bounce;
    } else if pos.0.y > max_y {
        pos.0.y = max_y;
        vel.0.y *= tuning.bounce;
    }

    if at_rest(vel.0, tuning) {
        vel.0 = Vec2::ZERO;
    }
    true
}

/// Keep roaming pets in the right-hand strip of the screen. Touching either
/// edge of the strip turns the pet around, except in the wall-anchored state.
/// A pet wider than the strip is pinned to the right edge.
pub fn partition(pos: &mut Position, behavior: &mut Behavior, extent: Vec2, bounds: &Bounds, tuning: &Tuning) {
    let max_x = bounds.max_x(extent.x);
    let min_x = (bounds.screen.x - (bounds.screen.x * tuning.partition_fraction).floor()).min(max_x);
    let anchored = behavior.state.name == BOUNDARY_ANCHORED;

    if pos.0.x < min_x {
        pos.0.x = min_x;
        if !anchored {
            behavior.facing = behavior.facing.flipped();
        }
    }
    if pos.0.x > max_x {
        pos.0.x = max_x;
        if !anchored {
            behavior.facing = behavior.facing.flipped();
        }
    }
}
