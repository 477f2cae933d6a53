//! Top-level window access
//!
//! Thin trait over the handful of window-manager calls the locator and the
//! activator need. Windows uses Win32, other platforms report no windows.

#[cfg(not(windows))]
pub mod headless;
#[cfg(windows)]
pub mod win32;

use serde::{Deserialize, Serialize};

#[cfg(not(windows))]
pub use headless::HeadlessWindows as SystemWindows;
#[cfg(windows)]
pub use win32::Win32Windows as SystemWindows;

/// Opaque top-level window handle belonging to some process.
/// May stop referring to a live window at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

pub trait WindowSystem {
    /// Visible top-level window with a non-empty title owned by `pid`.
    /// A window titled exactly `title` wins over the first one found.
    fn find_main_window(&self, pid: u32, title: Option<&str>) -> Option<WindowHandle>;

    /// Whether the handle still refers to a live window
    fn is_window(&self, window: WindowHandle) -> bool;

    fn is_visible(&self, window: WindowHandle) -> bool;

    fn is_minimized(&self, window: WindowHandle) -> bool;

    /// Make a hidden window visible
    fn show(&self, window: WindowHandle) -> bool;

    /// Restore a minimized window to its previous placement
    fn restore(&self, window: WindowHandle) -> bool;

    /// Raise to the foreground; the OS may refuse across sessions
    fn bring_to_foreground(&self, window: WindowHandle) -> bool;

    /// Give keyboard focus
    fn focus(&self, window: WindowHandle) -> bool;
}

impl<W: WindowSystem + ?Sized> WindowSystem for &W {
    fn find_main_window(&self, pid: u32, title: Option<&str>) -> Option<WindowHandle> {
        (**self).find_main_window(pid, title)
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        (**self).is_window(window)
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        (**self).is_visible(window)
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        (**self).is_minimized(window)
    }

    fn show(&self, window: WindowHandle) -> bool {
        (**self).show(window)
    }

    fn restore(&self, window: WindowHandle) -> bool {
        (**self).restore(window)
    }

    fn bring_to_foreground(&self, window: WindowHandle) -> bool {
        (**self).bring_to_foreground(window)
    }

    fn focus(&self, window: WindowHandle) -> bool {
        (**self).focus(window)
    }
}
