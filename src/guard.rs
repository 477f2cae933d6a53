//! Caller-facing entry point
//!
//! `check_and_run(config) -> bool` and `dispose()` are all the host
//! transport needs. Policy decisions that belong to the caller live here:
//!
//! - When the instance status cannot be determined (the OS refused to create
//!   the lock for reasons other than a duplicate), startup is allowed. The
//!   process then runs as if no other instance existed.
//! - The busy notification is sent only when the check failed, no peer
//!   window was activated and `showMessageBox` is set.

use crate::checker::{InstanceCheckResult, InstanceChecker};
use crate::config::CheckConfig;
use crate::lock::{LockBackend, SystemLockBackend};
use crate::notify::{BusyNotifier, LogNotifier};
use crate::process::{ProcessTable, SysinfoProcessTable};
use crate::window::{SystemWindows, WindowSystem};

pub struct InstanceGuard<
    L: LockBackend = SystemLockBackend,
    P = SysinfoProcessTable,
    W = SystemWindows,
    N = LogNotifier,
> {
    checker: InstanceChecker<L, P, W>,
    notifier: N,
    last_result: Option<InstanceCheckResult>,
}

impl InstanceGuard {
    /// Guard over the platform lock, process table and window system
    pub fn new() -> Self {
        Self::with_parts(InstanceChecker::system(), LogNotifier)
    }
}

impl Default for InstanceGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, P, W, N> InstanceGuard<L, P, W, N>
where
    L: LockBackend,
    P: ProcessTable,
    W: WindowSystem,
    N: BusyNotifier,
{
    pub fn with_parts(checker: InstanceChecker<L, P, W>, notifier: N) -> Self {
        Self {
            checker,
            notifier,
            last_result: None,
        }
    }

    /// Whether this process may run as the single instance of `config`'s app
    pub fn check_and_run(&mut self, config: &CheckConfig) -> bool {
        let identity = config.identity();

        let result = match self
            .checker
            .check_and_run_with_title(&identity, config.window_title.as_deref())
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    "Cannot determine instance status for {}, allowing startup: {}",
                    identity,
                    e
                );
                self.last_result = None;
                return true;
            }
        };

        if !result.can_proceed && !result.activated_window && config.show_message_box {
            self.notifier
                .notify_busy(&config.message(), result.peer.as_ref());
        }

        let can_proceed = result.can_proceed;
        self.last_result = Some(result);
        can_proceed
    }

    /// Full result of the last determinate check
    pub fn last_result(&self) -> Option<&InstanceCheckResult> {
        self.last_result.as_ref()
    }

    /// Release the lock. Must run on normal shutdown; dropping the guard
    /// does the same.
    pub fn dispose(&mut self) {
        self.checker.dispose();
    }
}
