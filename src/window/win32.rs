//! Win32 window access
//!
//! Every call validates nothing beyond what Win32 itself checks; callers go
//! through [`WindowSystem::is_window`] first and tolerate any step failing.

use super::{WindowHandle, WindowSystem};
use windows::Win32::Foundation::{BOOL, FALSE, HWND, LPARAM, TRUE};
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, EnumWindows, GetWindowTextW, GetWindowThreadProcessId, IsIconic, IsWindow,
    IsWindowVisible, SetForegroundWindow, ShowWindow, SW_RESTORE, SW_SHOW,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Windows;

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0)
}

/// EnumWindows callback state
struct MainWindowSearch<'a> {
    pid: u32,
    title: Option<&'a str>,
    /// Window whose title matched exactly
    found: Option<HWND>,
    /// First titled window, used when nothing matched
    first: Option<HWND>,
}

unsafe extern "system" fn enum_main_window(handle: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam.0 as *mut MainWindowSearch);

    let mut owner = 0u32;
    GetWindowThreadProcessId(handle, Some(&mut owner as *mut u32));
    if owner != search.pid || !IsWindowVisible(handle).as_bool() {
        return TRUE;
    }

    let mut buffer = [0u16; 256];
    let len = GetWindowTextW(handle, &mut buffer);
    if len <= 0 {
        return TRUE;
    }

    match search.title {
        Some(wanted) => {
            if String::from_utf16_lossy(&buffer[..len as usize]) == wanted {
                search.found = Some(handle);
                return FALSE;
            }
            search.first.get_or_insert(handle);
            TRUE
        }
        None => {
            search.found = Some(handle);
            FALSE
        }
    }
}

impl WindowSystem for Win32Windows {
    fn find_main_window(&self, pid: u32, title: Option<&str>) -> Option<WindowHandle> {
        let mut search = MainWindowSearch {
            pid,
            title,
            found: None,
            first: None,
        };
        unsafe {
            // Stopping early makes EnumWindows report an error; ignore it
            let _ = EnumWindows(
                Some(enum_main_window),
                LPARAM(&mut search as *mut MainWindowSearch as isize),
            );
        }
        search.found.or(search.first).map(|h| WindowHandle(h.0))
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        window.0 != 0 && unsafe { IsWindow(hwnd(window)).as_bool() }
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        unsafe { IsWindowVisible(hwnd(window)).as_bool() }
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        unsafe { IsIconic(hwnd(window)).as_bool() }
    }

    fn show(&self, window: WindowHandle) -> bool {
        unsafe {
            // Return value is the previous visibility, not success
            let _ = ShowWindow(hwnd(window), SW_SHOW);
            IsWindowVisible(hwnd(window)).as_bool()
        }
    }

    fn restore(&self, window: WindowHandle) -> bool {
        unsafe {
            let _ = ShowWindow(hwnd(window), SW_RESTORE);
            !IsIconic(hwnd(window)).as_bool()
        }
    }

    fn bring_to_foreground(&self, window: WindowHandle) -> bool {
        unsafe {
            let raised = SetForegroundWindow(hwnd(window)).as_bool();
            let _ = BringWindowToTop(hwnd(window));
            raised
        }
    }

    fn focus(&self, window: WindowHandle) -> bool {
        // Fails for windows of other threads' input queues
        unsafe { SetFocus(hwnd(window)).0 != 0 }
    }
}
