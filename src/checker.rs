//! Instance Check Orchestrator
//!
//! try to acquire -> on failure find the peer -> activate its window.
//! The result always describes what happened; a resource error from the
//! lock is the only `Err` and means the status could not be determined.

use crate::activator::WindowActivator;
use crate::error::Result;
use crate::lock::{LockBackend, LockCoordinator, SystemLockBackend};
use crate::name::LockIdentity;
use crate::process::{PeerProcessInfo, ProcessLocator, ProcessTable, SysinfoProcessTable};
use crate::window::{SystemWindows, WindowSystem};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceCheckResult {
    /// This process is now the sole owner and may keep running
    pub can_proceed: bool,
    /// Another instance, possibly only partially described
    pub peer: Option<PeerProcessInfo>,
    pub activated_window: bool,
}

impl InstanceCheckResult {
    fn proceed() -> Self {
        InstanceCheckResult {
            can_proceed: true,
            peer: None,
            activated_window: false,
        }
    }
}

pub type SystemInstanceChecker = InstanceChecker<SystemLockBackend, SysinfoProcessTable, SystemWindows>;

pub struct InstanceChecker<L: LockBackend, P, W> {
    lock: LockCoordinator<L>,
    processes: P,
    windows: W,
}

impl SystemInstanceChecker {
    pub fn system() -> Self {
        Self::new(
            SystemLockBackend::default(),
            SysinfoProcessTable::default(),
            SystemWindows::default(),
        )
    }
}

impl<L: LockBackend, P: ProcessTable, W: WindowSystem> InstanceChecker<L, P, W> {
    pub fn new(backend: L, processes: P, windows: W) -> Self {
        Self {
            lock: LockCoordinator::new(backend),
            processes,
            windows,
        }
    }

    /// Decide whether this process may continue as the single instance.
    ///
    /// A second call without [`dispose`](Self::dispose) is refused exactly
    /// like a duplicate launched by another process.
    pub fn check_and_run(&mut self, identity: &LockIdentity) -> Result<InstanceCheckResult> {
        self.check_and_run_with_title(identity, None)
    }

    /// Like [`check_and_run`](Self::check_and_run), activating the peer's
    /// window titled `window_title` when it has one
    pub fn check_and_run_with_title(
        &mut self,
        identity: &LockIdentity,
        window_title: Option<&str>,
    ) -> Result<InstanceCheckResult> {
        if self.lock.try_acquire(identity)? {
            return Ok(InstanceCheckResult::proceed());
        }

        let peer = ProcessLocator::new(&mut self.processes, &self.windows)
            .with_window_title(window_title)
            .find_peer();

        let activated_window = match peer.as_ref().and_then(|p| p.window_handle) {
            Some(window) => WindowActivator::new(&self.windows).activate(window),
            None => {
                tracing::info!("No window to activate for the running instance");
                false
            }
        };

        Ok(InstanceCheckResult {
            can_proceed: false,
            peer,
            activated_window,
        })
    }

    /// Release the lock if held; safe to call at any time, any number of times
    pub fn dispose(&mut self) {
        self.lock.release();
    }

    pub fn is_holding(&self) -> bool {
        self.lock.is_held()
    }
}
