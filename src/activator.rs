//! Window Activator
//!
//! Hands control to an already-running instance by un-hiding, restoring,
//! raising and focusing its window. Every step is best effort and recorded
//! in an [`ActivationReport`]; a stale handle is a normal `false` result.

use crate::window::{WindowHandle, WindowSystem};
use serde::Serialize;

/// Per-step outcome of one activation attempt.
/// `shown` / `restored` are `None` when the window did not need that step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub valid: bool,
    pub shown: Option<bool>,
    pub restored: Option<bool>,
    pub raised: bool,
    pub focused: bool,
}

impl ActivationReport {
    /// The handle was live and at least one step had a visible effect
    pub fn activated(&self) -> bool {
        self.valid
            && (self.raised
                || self.focused
                || self.shown == Some(true)
                || self.restored == Some(true))
    }
}

pub struct WindowActivator<W> {
    windows: W,
}

impl<W: WindowSystem> WindowActivator<W> {
    pub fn new(windows: W) -> Self {
        Self { windows }
    }

    pub fn activate(&self, window: WindowHandle) -> bool {
        self.activate_with_report(window).activated()
    }

    pub fn activate_with_report(&self, window: WindowHandle) -> ActivationReport {
        let mut report = ActivationReport::default();

        if !self.windows.is_window(window) {
            tracing::debug!("Window {:?} no longer exists", window);
            return report;
        }
        report.valid = true;

        if !self.windows.is_visible(window) {
            let shown = self.windows.show(window);
            tracing::debug!("Window {:?} was hidden, shown: {}", window, shown);
            report.shown = Some(shown);
        }

        if self.windows.is_minimized(window) {
            let restored = self.windows.restore(window);
            tracing::debug!("Window {:?} was minimized, restored: {}", window, restored);
            report.restored = Some(restored);
        }

        report.raised = self.windows.bring_to_foreground(window);
        report.focused = self.windows.focus(window);
        tracing::debug!(
            "Window {:?} raised: {}, focused: {}",
            window,
            report.raised,
            report.focused
        );

        if !report.raised {
            tracing::warn!("Foreground switch to {:?} was refused", window);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeWindow, FakeWindows};

    #[test]
    fn test_stale_handle() {
        let windows = FakeWindows::default();
        let activator = WindowActivator::new(&windows);
        let report = activator.activate_with_report(WindowHandle(7));
        assert!(!report.valid);
        assert!(!report.activated());
        assert!(windows.calls().is_empty());
    }

    #[test]
    fn test_visible_window_is_raised_and_focused() {
        let windows = FakeWindows::default();
        let handle = windows.add(1, FakeWindow::visible("Main"));
        let activator = WindowActivator::new(&windows);

        let report = activator.activate_with_report(handle);
        assert_eq!(report.shown, None);
        assert_eq!(report.restored, None);
        assert!(report.raised);
        assert!(report.focused);
        assert!(activator.activate(handle));
    }

    #[test]
    fn test_hidden_minimized_window_is_shown_and_restored() {
        let windows = FakeWindows::default();
        let handle = windows.add(
            1,
            FakeWindow {
                visible: false,
                minimized: true,
                ..FakeWindow::visible("Main")
            },
        );
        let activator = WindowActivator::new(&windows);

        let report = activator.activate_with_report(handle);
        assert_eq!(report.shown, Some(true));
        assert_eq!(report.restored, Some(true));
        assert_eq!(
            windows.calls(),
            vec!["show", "restore", "foreground", "focus"]
        );
        let window = windows.get(handle).unwrap();
        assert!(window.visible);
        assert!(!window.minimized);
    }

    #[test]
    fn test_foreground_refused_is_partial_success() {
        let windows = FakeWindows::default();
        let handle = windows.add(
            1,
            FakeWindow {
                minimized: true,
                allow_foreground: false,
                allow_focus: false,
                ..FakeWindow::visible("Main")
            },
        );
        let activator = WindowActivator::new(&windows);

        let report = activator.activate_with_report(handle);
        assert_eq!(report.restored, Some(true));
        assert!(!report.raised);
        assert!(!report.focused);
        assert!(report.activated());
    }

    #[test]
    fn test_nothing_took_effect() {
        let windows = FakeWindows::default();
        let handle = windows.add(
            1,
            FakeWindow {
                allow_foreground: false,
                allow_focus: false,
                ..FakeWindow::visible("Main")
            },
        );
        assert!(!WindowActivator::new(&windows).activate(handle));
    }
}
