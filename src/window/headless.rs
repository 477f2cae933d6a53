//! Platforms without a Win32-style window manager: no window is ever found,
//! and any handle handed in is treated as stale.

use super::{WindowHandle, WindowSystem};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessWindows;

impl WindowSystem for HeadlessWindows {
    fn find_main_window(&self, _pid: u32, _title: Option<&str>) -> Option<WindowHandle> {
        None
    }

    fn is_window(&self, _window: WindowHandle) -> bool {
        false
    }

    fn is_visible(&self, _window: WindowHandle) -> bool {
        false
    }

    fn is_minimized(&self, _window: WindowHandle) -> bool {
        false
    }

    fn show(&self, _window: WindowHandle) -> bool {
        false
    }

    fn restore(&self, _window: WindowHandle) -> bool {
        false
    }

    fn bring_to_foreground(&self, _window: WindowHandle) -> bool {
        false
    }

    fn focus(&self, _window: WindowHandle) -> bool {
        false
    }
}
