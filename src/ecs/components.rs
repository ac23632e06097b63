use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use crate::catalog::{StateDescriptor, StateTable};
use crate::sprite::{FrameSet, SizeBucket};

/// Species/colour identity plus the settings the pet was created with.
#[derive(Debug, Clone)]
pub struct Pet {
    pub table: Arc<StateTable>,
    pub size: SizeBucket,
    pub base_fps: u32,
}

/// Top-left corner in screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec2);

/// Current frame size in pixels (width, height).
#[derive(Debug, Clone, Copy)]
pub struct Extent(pub Vec2);

/// Throw velocity in pixels/tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec2);

/// Pointer drag in progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct Drag {
    pub active: bool,
    /// Pointer minus agent origin at grab time.
    pub offset: Vec2,
    pub last_pointer: Option<Vec2>,
}

/// Secondary-button press/release tracking for the inbox hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryClick {
    /// Pressed inside the agent and not yet released.
    pub armed: bool,
}

/// Traversal direction. Source art faces right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Whether frames are drawn mirrored.
    pub fn mirrored(self) -> bool {
        self == Facing::Left
    }
}

/// Current behaviour state.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub state: Arc<StateDescriptor>,
    /// Ticks spent in `state`; the cycle completes at `state.hold`.
    pub counter: u32,
    /// Set while the calming state forced by pointer proximity plays out.
    pub immunity: bool,
    /// Index into the climb chain while one is running.
    pub climb_step: Option<usize>,
    pub facing: Facing,
}

/// Frame cursor and timing for the current state.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    /// `None` when the state's frames failed to load: nothing is drawn and
    /// the cursor never advances.
    pub frames: Option<Arc<FrameSet>>,
    pub cursor: usize,
    /// Simulated seconds since the state was entered.
    pub elapsed: f64,
    /// Frame advances made since the state was entered.
    pub advanced: u64,
    /// Seconds per frame; `None` holds the first frame.
    pub interval: Option<f64>,
}

/// Frame Sets already scaled for this pet, by state name.
#[derive(Debug, Default)]
pub struct FrameCache(pub HashMap<String, Arc<FrameSet>>);

/// Usable screen area.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub screen: Vec2,
    /// Space reserved at the bottom for a visible taskbar.
    pub floor_inset: f32,
}

impl Bounds {
    pub fn max_x(&self, width: f32) -> f32 {
        (self.screen.x - width).max(0.0)
    }

    pub fn max_y(&self, height: f32) -> f32 {
        (self.screen.y - height).max(0.0)
    }

    /// Y where a pet of `height` stands on the floor.
    pub fn rest_y(&self, height: f32) -> f32 {
        (self.screen.y - height - self.floor_inset).max(0.0)
    }

    /// Keep the whole bounding box on screen.
    pub fn clamp(&self, pos: Vec2, extent: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(0.0, self.max_x(extent.x)),
            pos.y.clamp(0.0, self.max_y(extent.y)),
        )
    }

    pub fn contains(&self, origin: Vec2, extent: Vec2, point: Vec2) -> bool {
        point.x >= origin.x
            && point.x <= origin.x + extent.x
            && point.y >= origin.y
            && point.y <= origin.y + extent.y
    }
}
