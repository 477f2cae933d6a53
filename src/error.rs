//! Error types for instance coordination
//!
//! Only genuinely indeterminate states are errors. A duplicate instance,
//! a stale window or a peer owned by another account are ordinary results.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AloneError {
    /// The OS refused to create the named lock for a reason other than
    /// the name already existing (access denied, resource limits, ...).
    #[error("failed to create instance lock `{name}`: {source}")]
    LockCreate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The running process table could not be captured at all.
    #[error("failed to enumerate running processes: {0}")]
    ProcessEnumeration(String),

    #[error("invalid configuration at {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, AloneError>;
