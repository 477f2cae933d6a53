//! Alone Library
//!
//! Keeps a desktop application to a single running instance per machine
//! (or per session) and hands control to the instance already running.
//!
//! Architecture:
//! - `name` derives the system-wide lock name from the app identity
//! - `lock` owns the named lock (Win32 named mutex, or a lock file elsewhere)
//! - `process` finds the other process running the same executable
//! - `activator` restores and raises that process's main window
//! - `checker` composes the above; `guard` is the caller-facing facade

pub mod activator;
pub mod checker;
pub mod config;
pub mod error;
pub mod guard;
pub mod lock;
pub mod name;
pub mod notify;
pub mod process;
pub mod window;

#[cfg(test)]
mod testing;

pub use checker::{InstanceCheckResult, InstanceChecker, SystemInstanceChecker};
pub use config::{CheckConfig, MessageConfig};
pub use error::AloneError;
pub use guard::InstanceGuard;
pub use name::{generate, LockIdentity, LockScope};
pub use process::PeerProcessInfo;
