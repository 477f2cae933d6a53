//! Lock name generation
//!
//! Derives the kernel object name for an application from its package id,
//! application name and an optional suffix. The result is deterministic,
//! restricted to `[A-Za-z0-9_.-]` after the scope prefix, and never longer
//! than [`MAX_NAME_LEN`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Longest object name the reference platform accepts
pub const MAX_NAME_LEN: usize = 260;

/// Identifier used when the package id or application name is missing
pub const DEFAULT_APP_IDENTIFIER: &str = "AloneApp_UniqueId";

/// Visibility of the lock object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockScope {
    /// Visible to every session and user on the machine
    #[default]
    Global,
    /// Visible only inside the current user session
    Session,
}

impl LockScope {
    /// Kernel namespace prefix, including the trailing separator
    pub fn prefix(self) -> &'static str {
        match self {
            LockScope::Global => "Global\\",
            LockScope::Session => "Local\\",
        }
    }
}

/// Immutable description of one application's lock
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockIdentity {
    pub scope: LockScope,
    pub primary_id: String,
    pub secondary_id: String,
    pub suffix: Option<String>,
    name: String,
    lock_file: Option<PathBuf>,
}

impl LockIdentity {
    /// Full object name, scope prefix included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object name without the scope prefix
    pub fn base_name(&self) -> &str {
        self.name
            .strip_prefix(self.scope.prefix())
            .unwrap_or(&self.name)
    }

    /// True when the inputs were unusable and the well-known default was used
    pub fn is_default(&self) -> bool {
        self.base_name() == DEFAULT_APP_IDENTIFIER
    }

    /// Use `path` as the lock file on platforms that lock through a file.
    /// Named kernel objects ignore it.
    pub fn with_lock_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file = Some(path.into());
        self
    }

    pub fn lock_file(&self) -> Option<&Path> {
        self.lock_file.as_deref()
    }
}

impl fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Build the lock identity in the default (global) scope.
pub fn generate(primary_id: &str, secondary_id: &str, suffix: Option<&str>) -> LockIdentity {
    generate_scoped(LockScope::Global, primary_id, secondary_id, suffix)
}

/// Build the lock identity for an explicit scope.
///
/// Missing ids (or ids with no usable characters left after sanitizing)
/// fall back to [`DEFAULT_APP_IDENTIFIER`] so protection degrades to one
/// shared default lock instead of being disabled. A suffix that sanitizes
/// to nothing is dropped.
pub fn generate_scoped(
    scope: LockScope,
    primary_id: &str,
    secondary_id: &str,
    suffix: Option<&str>,
) -> LockIdentity {
    let primary = sanitize(primary_id);
    let secondary = sanitize(secondary_id);
    let suffix_part = suffix.map(sanitize).filter(|s| !s.is_empty());

    let mut name = String::from(scope.prefix());
    if primary.is_empty() || secondary.is_empty() {
        tracing::debug!(
            "Missing package id or app name, using default lock identity {}",
            DEFAULT_APP_IDENTIFIER
        );
        name.push_str(DEFAULT_APP_IDENTIFIER);
    } else {
        name.push_str(&primary);
        name.push('_');
        name.push_str(&secondary);
        if let Some(ref s) = suffix_part {
            name.push('_');
            name.push_str(s);
        }
    }

    // Every character is ASCII at this point, so byte truncation is char-safe
    if name.len() > MAX_NAME_LEN {
        tracing::warn!(
            "Lock name is {} characters, truncating to {}",
            name.len(),
            MAX_NAME_LEN
        );
        name.truncate(MAX_NAME_LEN);
    }

    LockIdentity {
        scope,
        primary_id: primary_id.to_string(),
        secondary_id: secondary_id.to_string(),
        suffix: suffix.map(str::to_string),
        name,
        lock_file: None,
    }
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Replace unsafe characters with `_`, collapse `_` runs, trim `_` at both ends
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if is_safe_char(c) { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}
