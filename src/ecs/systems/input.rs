use glam::Vec2;

use crate::ecs::components::{Bounds, Drag, Position, SecondaryClick, Velocity};
use crate::input::{Buttons, InputSnapshot};
use crate::settings::Tuning;

/// Edge-detect the secondary button. Arms on a press inside the agent and
/// fires on the matching release if the pointer is still inside, so the hook
/// runs at most once per press/release cycle.
pub fn secondary_click(latch: &mut SecondaryClick, previous: Buttons, input: &InputSnapshot, inside: bool) -> bool {
    let down = input.buttons.secondary;
    let was_down = previous.secondary;
    let mut fire = false;

    if down && !was_down {
        latch.armed = inside;
    }
    if !down && was_down {
        fire = latch.armed && inside;
        latch.armed = false;
    }
    fire
}

/// Drag capture and release. A drag starts only on the press edge with the
/// pointer inside the agent. Returns true while the agent is held, in which
/// case nothing else moves it this tick.
#[allow(clippy::too_many_arguments)]
pub fn drag(
    drag: &mut Drag,
    pos: &mut Position,
    vel: &mut Velocity,
    extent: Vec2,
    bounds: &Bounds,
    input: &InputSnapshot,
    previous: Buttons,
    tuning: &Tuning,
) -> bool {
    let pointer = input.pointer;
    let pressed = input.buttons.primary && !previous.primary;

    if pressed && !drag.active && bounds.contains(pos.0, extent, pointer) {
        drag.active = true;
        drag.offset = pointer - pos.0;
        drag.last_pointer = Some(pointer);
        vel.0 = Vec2::ZERO;
    }

    if !drag.active {
        return false;
    }

    if input.buttons.primary {
        // Running throw candidate: the latest pointer delta.
        if let Some(last) = drag.last_pointer {
            vel.0 = pointer - last;
        }
        drag.last_pointer = Some(pointer);
        pos.0 = bounds.clamp(pointer - drag.offset, extent);
        return true;
    }

    drag.active = false;
    drag.last_pointer = None;
    vel.0 *= tuning.release_multiplier;
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds {
            screen: Vec2::new(1000.0, 800.0),
            floor_inset: 0.0,
        }
    }

    const EXTENT: Vec2 = Vec2::new(100.0, 50.0);

    const UP: Buttons = Buttons {
        primary: false,
        secondary: false,
    };
    const PRIMARY: Buttons = Buttons {
        primary: true,
        secondary: false,
    };
    const SECONDARY: Buttons = Buttons {
        primary: false,
        secondary: true,
    };

    #[test]
    fn grab_move_release_throws() {
        let b = bounds();
        let t = Tuning::default();
        let mut d = Drag::default();
        let mut pos = Position(Vec2::new(500.0, 500.0));
        let mut vel = Velocity(Vec2::new(3.0, 3.0));

        // Press inside: grab, throw velocity cleared.
        let press = InputSnapshot::at(Vec2::new(520.0, 510.0)).primary();
        assert!(drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &press, UP, &t));
        assert_eq!(d.offset, Vec2::new(20.0, 10.0));
        assert_eq!(vel.0, Vec2::ZERO);
        assert_eq!(pos.0, Vec2::new(500.0, 500.0));

        // Move: position tracks pointer - offset, delta recorded.
        let moved = InputSnapshot::at(Vec2::new(530.0, 506.0)).primary();
        assert!(drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &moved, PRIMARY, &t));
        assert_eq!(pos.0, Vec2::new(510.0, 496.0));
        assert_eq!(vel.0, Vec2::new(10.0, -4.0));

        // Release: 1.5x the last delta.
        let release = InputSnapshot::at(Vec2::new(530.0, 506.0));
        assert!(!drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &release, PRIMARY, &t));
        assert!(!d.active);
        assert_eq!(vel.0, Vec2::new(15.0, -6.0));
    }

    #[test]
    fn drag_clamps_to_screen() {
        let b = bounds();
        let t = Tuning::default();
        let mut d = Drag::default();
        let mut pos = Position(Vec2::new(10.0, 10.0));
        let mut vel = Velocity::default();

        let press = InputSnapshot::at(Vec2::new(15.0, 15.0)).primary();
        drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &press, UP, &t);
        let far = InputSnapshot::at(Vec2::new(-400.0, 5000.0)).primary();
        drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &far, PRIMARY, &t);
        assert_eq!(pos.0, Vec2::new(0.0, 750.0));
    }

    #[test]
    fn press_outside_does_not_grab() {
        let b = bounds();
        let t = Tuning::default();
        let mut d = Drag::default();
        let mut pos = Position(Vec2::new(100.0, 100.0));
        let mut vel = Velocity(Vec2::new(2.0, 0.0));

        let press = InputSnapshot::at(Vec2::new(5.0, 5.0)).primary();
        assert!(!drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &press, UP, &t));
        assert_eq!(vel.0, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn held_button_sliding_onto_agent_does_not_grab() {
        let b = bounds();
        let t = Tuning::default();
        let mut d = Drag::default();
        let mut pos = Position(Vec2::new(100.0, 100.0));
        let mut vel = Velocity::default();

        let held = InputSnapshot::at(Vec2::new(110.0, 110.0)).primary();
        assert!(!drag(&mut d, &mut pos, &mut vel, EXTENT, &b, &held, PRIMARY, &t));
        assert!(!d.active);
    }

    #[test]
    fn secondary_fires_once_on_release_inside() {
        let mut latch = SecondaryClick::default();
        let down = InputSnapshot::at(Vec2::ZERO).secondary();
        let up = InputSnapshot::at(Vec2::ZERO);

        assert!(!secondary_click(&mut latch, UP, &down, true));
        assert!(!secondary_click(&mut latch, SECONDARY, &down, true));
        assert!(secondary_click(&mut latch, SECONDARY, &up, true));
        assert!(!secondary_click(&mut latch, UP, &up, true));
    }

    #[test]
    fn secondary_ignores_presses_outside_or_drift_out() {
        let mut latch = SecondaryClick::default();
        let down = InputSnapshot::at(Vec2::ZERO).secondary();
        let up = InputSnapshot::at(Vec2::ZERO);

        // Pressed outside, released inside.
        secondary_click(&mut latch, UP, &down, false);
        assert!(!secondary_click(&mut latch, SECONDARY, &up, true));

        // Pressed inside, released outside.
        secondary_click(&mut latch, UP, &down, true);
        assert!(!secondary_click(&mut latch, SECONDARY, &up, false));
    }
}
