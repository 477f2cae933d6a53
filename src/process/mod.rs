//! Process Locator
//!
//! Finds another running process backed by the same executable as this one
//! and describes it: main window, start time and owning account. Only a
//! failure to enumerate processes at all yields no result; every enrichment
//! step that fails (typically a permission boundary between accounts) just
//! leaves its field empty.

#[cfg(windows)]
pub mod token;

use crate::error::{AloneError, Result};
use crate::window::{WindowHandle, WindowSystem};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use sysinfo::System;

/// Snapshot of a process believed to be another instance of this app.
/// Pure data; the process may have exited by the time it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerProcessInfo {
    pub process_id: u32,
    pub executable_path: PathBuf,
    pub start_time: Option<SystemTime>,
    pub window_handle: Option<WindowHandle>,
    pub owner_domain: Option<String>,
    pub owner_user: Option<String>,
}

impl PeerProcessInfo {
    /// Whether both processes run under the same account.
    /// `None` when either owner could not be resolved.
    pub fn same_owner(&self, other: &PeerProcessInfo) -> Option<bool> {
        let mine = self.owner_user.as_ref()?;
        let theirs = other.owner_user.as_ref()?;
        Some(mine == theirs && self.owner_domain == other.owner_domain)
    }
}

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    /// `None` when the image path cannot be read (e.g. another account)
    pub executable_path: Option<PathBuf>,
    pub start_time: Option<SystemTime>,
}

/// Security principal a process runs under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOwner {
    pub domain: Option<String>,
    pub user: String,
}

/// Source of process information
pub trait ProcessTable {
    fn current_pid(&self) -> u32;

    fn current_executable(&self) -> Option<PathBuf>;

    /// Capture the running processes
    fn snapshot(&mut self) -> Result<Vec<ProcessEntry>>;

    /// Owning account of `pid`, if it can be inspected
    fn owner_of(&self, pid: u32) -> Option<ProcessOwner>;
}

impl<P: ProcessTable + ?Sized> ProcessTable for &mut P {
    fn current_pid(&self) -> u32 {
        (**self).current_pid()
    }

    fn current_executable(&self) -> Option<PathBuf> {
        (**self).current_executable()
    }

    fn snapshot(&mut self) -> Result<Vec<ProcessEntry>> {
        (**self).snapshot()
    }

    fn owner_of(&self, pid: u32) -> Option<ProcessOwner> {
        (**self).owner_of(pid)
    }
}

/// Process table backed by `sysinfo`
pub struct SysinfoProcessTable {
    system: System,
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    fn current_executable(&self) -> Option<PathBuf> {
        std::env::current_exe().ok()
    }

    fn snapshot(&mut self) -> Result<Vec<ProcessEntry>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(AloneError::ProcessEnumeration(
                "process enumeration is not supported on this platform".to_string(),
            ));
        }

        self.system.refresh_processes();
        // Linux lists every thread as its own task entry sharing the
        // executable; only thread-group leaders are processes
        let entries: Vec<ProcessEntry> = self
            .system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| ProcessEntry {
                pid: pid.as_u32(),
                executable_path: process.exe().map(Path::to_path_buf),
                start_time: (process.start_time() > 0)
                    .then(|| UNIX_EPOCH + Duration::from_secs(process.start_time())),
            })
            .collect();

        if entries.is_empty() {
            return Err(AloneError::ProcessEnumeration(
                "process snapshot was empty".to_string(),
            ));
        }
        Ok(entries)
    }

    #[cfg(windows)]
    fn owner_of(&self, pid: u32) -> Option<ProcessOwner> {
        token::owner_of(pid)
    }

    #[cfg(not(windows))]
    fn owner_of(&self, pid: u32) -> Option<ProcessOwner> {
        let process = self.system.process(sysinfo::Pid::from_u32(pid))?;
        let uid = process.user_id()?;
        let users = sysinfo::Users::new_with_refreshed_list();
        users.get_user_by_id(uid).map(|user| ProcessOwner {
            domain: None,
            user: user.name().to_string(),
        })
    }
}

/// Absolute, canonical, case-folded form used for executable comparison
pub fn normalize_executable(path: &Path) -> Option<String> {
    let resolved = match std::fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(_) if path.is_absolute() => path.to_path_buf(),
        Err(_) => return None,
    };
    let text = resolved.to_string_lossy().to_lowercase();
    // Verbatim prefix appears only when canonicalize succeeded
    let text = text.strip_prefix(r"\\?\").unwrap_or(&text);
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

pub struct ProcessLocator<P, W> {
    table: P,
    windows: W,
    window_title: Option<String>,
}

impl ProcessLocator<SysinfoProcessTable, crate::window::SystemWindows> {
    pub fn system() -> Self {
        Self::new(SysinfoProcessTable::default(), crate::window::SystemWindows::default())
    }
}

impl<P: ProcessTable, W: WindowSystem> ProcessLocator<P, W> {
    pub fn new(table: P, windows: W) -> Self {
        Self {
            table,
            windows,
            window_title: None,
        }
    }

    /// Prefer the window with this exact title when describing a process
    pub fn with_window_title(mut self, title: Option<&str>) -> Self {
        self.window_title = title.map(str::to_string);
        self
    }

    /// First other process running the same executable, if any
    pub fn find_peer(&mut self) -> Option<PeerProcessInfo> {
        let current_pid = self.table.current_pid();
        let Some(current_exe) = self
            .table
            .current_executable()
            .and_then(|exe| normalize_executable(&exe))
        else {
            tracing::warn!("Cannot resolve own executable path, skipping peer search");
            return None;
        };

        let entries = match self.table.snapshot() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Peer search failed: {}", e);
                return None;
            }
        };

        let peer = entries.into_iter().find(|entry| {
            entry.pid != current_pid
                && entry
                    .executable_path
                    .as_deref()
                    .and_then(normalize_executable)
                    .map_or(false, |exe| exe == current_exe)
        })?;

        tracing::info!("Found running instance with pid {}", peer.pid);
        Some(self.describe(peer))
    }

    /// Description of this very process
    pub fn current_process(&mut self) -> PeerProcessInfo {
        let pid = self.table.current_pid();
        let start_time = self.table.snapshot().ok().and_then(|entries| {
            entries
                .into_iter()
                .find(|entry| entry.pid == pid)
                .and_then(|entry| entry.start_time)
        });
        let entry = ProcessEntry {
            pid,
            executable_path: self.table.current_executable(),
            start_time,
        };
        self.describe(entry)
    }

    fn describe(&self, entry: ProcessEntry) -> PeerProcessInfo {
        let window_handle = self
            .windows
            .find_main_window(entry.pid, self.window_title.as_deref());
        if window_handle.is_none() {
            tracing::debug!("No visible titled window for pid {}", entry.pid);
        }

        let owner = self.table.owner_of(entry.pid);
        if owner.is_none() {
            tracing::debug!(
                "Owner of pid {} is not accessible from this account",
                entry.pid
            );
        }

        PeerProcessInfo {
            process_id: entry.pid,
            executable_path: entry.executable_path.unwrap_or_default(),
            start_time: entry.start_time,
            window_handle,
            owner_domain: owner.as_ref().and_then(|o| o.domain.clone()),
            owner_user: owner.map(|o| o.user),
        }
    }
}
