use std::collections::VecDeque;

use glam::Vec2;

/// Logical button state at one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub primary: bool,
    pub secondary: bool,
}

/// Polled pointer + buttons. No callbacks: the scheduler asks once per tick.
pub trait InputSource: Send {
    fn poll_pointer(&mut self) -> Vec2;
    fn poll_buttons(&mut self) -> Buttons;
}

/// One consistent input sample, shared read-only by every agent in a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub pointer: Vec2,
    pub buttons: Buttons,
}

impl InputSnapshot {
    pub fn poll(source: &mut dyn InputSource) -> Self {
        let pointer = source.poll_pointer();
        let buttons = source.poll_buttons();
        Self { pointer, buttons }
    }

    pub fn at(pointer: Vec2) -> Self {
        Self {
            pointer,
            buttons: Buttons::default(),
        }
    }

    pub fn primary(mut self) -> Self {
        self.buttons.primary = true;
        self
    }

    pub fn secondary(mut self) -> Self {
        self.buttons.secondary = true;
        self
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self::at(PARKED)
    }
}

/// Pointer position reported when there is no pointer: far enough away that
/// no agent is ever under it or near it.
const PARKED: Vec2 = Vec2::new(-1.0e6, -1.0e6);

/// Headless input: pointer parked off-screen, buttons up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll_pointer(&mut self) -> Vec2 {
        PARKED
    }

    fn poll_buttons(&mut self) -> Buttons {
        Buttons::default()
    }
}

/// Replays recorded snapshots, one per tick; repeats the last one when the
/// script runs out.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    pending: VecDeque<InputSnapshot>,
    current: InputSnapshot,
}

impl ScriptedInput {
    pub fn new(samples: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            pending: samples.into_iter().collect(),
            current: InputSnapshot::default(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll_pointer(&mut self) -> Vec2 {
        if let Some(next) = self.pending.pop_front() {
            self.current = next;
        }
        self.current.pointer
    }

    fn poll_buttons(&mut self) -> Buttons {
        self.current.buttons
    }
}
