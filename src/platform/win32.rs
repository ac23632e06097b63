use glam::Vec2;
use windows::Win32::Foundation::{POINT, RECT};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::Shell::{SHAppBarMessage, APPBARDATA};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetDesktopWindow, GetForegroundWindow, GetShellWindow, GetSystemMetrics,
    GetWindowRect, SM_CXSCREEN, SM_CYSCREEN,
};

use super::{ScreenBounds, ScreenInfo, Taskbar, TaskbarEdge};
use crate::input::{Buttons, InputSource};

// SHAppBarMessage messages and results.
const ABM_GETSTATE: u32 = 0x4;
const ABM_GETTASKBARPOS: u32 = 0x5;
const ABS_AUTOHIDE: usize = 0x1;
const ABE_LEFT: u32 = 0;
const ABE_TOP: u32 = 1;
const ABE_RIGHT: u32 = 2;

/// High bit of GetAsyncKeyState: key currently down.
const HELD: i16 = 0x8000u16 as i16;

/// Global pointer and mouse buttons via GetCursorPos / GetAsyncKeyState.
#[derive(Debug, Default)]
pub struct Win32Input;

impl InputSource for Win32Input {
    fn poll_pointer(&mut self) -> Vec2 {
        let mut point = POINT::default();
        unsafe {
            let _ = GetCursorPos(&mut point);
        }
        Vec2::new(point.x as f32, point.y as f32)
    }

    /// The secondary button also checks the transition bit so a quick
    /// right-click that releases between polls is still seen once.
    fn poll_buttons(&mut self) -> Buttons {
        unsafe {
            let l = GetAsyncKeyState(0x01); // VK_LBUTTON
            let r = GetAsyncKeyState(0x02); // VK_RBUTTON
            Buttons {
                primary: l & HELD != 0,
                secondary: (r & HELD != 0) || (r & 1 != 0),
            }
        }
    }
}

/// Primary monitor metrics, taskbar placement and fullscreen detection.
#[derive(Debug, Default)]
pub struct Win32Screen;

impl ScreenBounds for Win32Screen {
    fn screen(&mut self) -> ScreenInfo {
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        ScreenInfo {
            width: width.max(1) as u32,
            height: height.max(1) as u32,
            taskbar: taskbar(),
        }
    }

    fn fullscreen_active(&mut self) -> bool {
        unsafe {
            let fg = GetForegroundWindow();
            if fg.is_invalid() || fg == GetDesktopWindow() || fg == GetShellWindow() {
                return false;
            }
            let mut rect = RECT::default();
            if GetWindowRect(fg, &mut rect).is_err() {
                return false;
            }
            let w = GetSystemMetrics(SM_CXSCREEN);
            let h = GetSystemMetrics(SM_CYSCREEN);
            rect.left <= 0 && rect.top <= 0 && rect.right >= w && rect.bottom >= h
        }
    }
}

/// Query the shell for the taskbar rectangle and autohide state.
fn taskbar() -> Option<Taskbar> {
    let mut data = APPBARDATA {
        cbSize: std::mem::size_of::<APPBARDATA>() as u32,
        ..Default::default()
    };
    let found = unsafe { SHAppBarMessage(ABM_GETTASKBARPOS, &mut data) };
    if found == 0 {
        log::debug!("No taskbar reported by the shell");
        return None;
    }
    let state = unsafe { SHAppBarMessage(ABM_GETSTATE, &mut data) };

    let rc = data.rc;
    let (edge, thickness) = match data.uEdge {
        ABE_LEFT => (TaskbarEdge::Left, rc.right - rc.left),
        ABE_TOP => (TaskbarEdge::Top, rc.bottom - rc.top),
        ABE_RIGHT => (TaskbarEdge::Right, rc.right - rc.left),
        _ => (TaskbarEdge::Bottom, rc.bottom - rc.top),
    };
    Some(Taskbar {
        height: thickness.max(0) as u32,
        autohide: state & ABS_AUTOHIDE != 0,
        edge,
    })
}

/// Check if the ESC key is currently pressed (works regardless of window focus).
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B
    unsafe { GetAsyncKeyState(0x1B) & HELD != 0 }
}
