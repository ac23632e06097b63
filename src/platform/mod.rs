//! Screen geometry and OS input.
//!
//! On Windows the pointer, buttons, screen metrics and taskbar come from
//! Win32. Everywhere else the engine runs headless against the configured
//! fallback geometry.

#[cfg(windows)]
pub mod win32;

use glam::Vec2;

use crate::ecs::components::Bounds;
use crate::input::InputSource;
use crate::settings::ScreenSettings;

/// Which screen edge the taskbar is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarEdge {
    Left,
    Top,
    Right,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Taskbar {
    pub height: u32,
    pub autohide: bool,
    pub edge: TaskbarEdge,
}

/// Screen size plus taskbar placement, sampled when agents are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenInfo {
    pub width: u32,
    pub height: u32,
    pub taskbar: Option<Taskbar>,
}

impl ScreenInfo {
    /// Agent bounds. Only a visible taskbar docked at the bottom raises the
    /// resting line.
    pub fn bounds(&self) -> Bounds {
        let floor_inset = match self.taskbar {
            Some(Taskbar {
                height,
                autohide: false,
                edge: TaskbarEdge::Bottom,
            }) => height as f32,
            _ => 0.0,
        };
        Bounds {
            screen: Vec2::new(self.width as f32, self.height as f32),
            floor_inset,
        }
    }
}

impl From<&ScreenSettings> for ScreenInfo {
    fn from(s: &ScreenSettings) -> Self {
        Self {
            width: s.width,
            height: s.height,
            taskbar: (s.taskbar_height > 0).then_some(Taskbar {
                height: s.taskbar_height,
                autohide: s.taskbar_autohide,
                edge: TaskbarEdge::Bottom,
            }),
        }
    }
}

/// Screen queries the scheduler makes.
pub trait ScreenBounds: Send {
    fn screen(&mut self) -> ScreenInfo;

    /// A fullscreen application currently covers the desktop.
    fn fullscreen_active(&mut self) -> bool {
        false
    }
}

/// Fixed geometry from settings.
#[derive(Debug, Clone, Copy)]
pub struct FixedScreen(pub ScreenInfo);

impl ScreenBounds for FixedScreen {
    fn screen(&mut self) -> ScreenInfo {
        self.0
    }
}

/// The native pointer/screen backends, or headless fallbacks.
#[cfg(windows)]
pub fn native(_fallback: &ScreenSettings) -> (Box<dyn InputSource>, Box<dyn ScreenBounds>) {
    (Box::new(win32::Win32Input::default()), Box::new(win32::Win32Screen))
}

#[cfg(not(windows))]
pub fn native(fallback: &ScreenSettings) -> (Box<dyn InputSource>, Box<dyn ScreenBounds>) {
    log::info!("No native backend on this platform, running headless");
    (Box::new(crate::input::NoInput), Box::new(FixedScreen(ScreenInfo::from(fallback))))
}

/// ESC held, regardless of focus.
#[cfg(windows)]
pub fn escape_pressed() -> bool {
    win32::is_escape_pressed()
}

#[cfg(not(windows))]
pub fn escape_pressed() -> bool {
    false
}
