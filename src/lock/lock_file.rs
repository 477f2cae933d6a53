//! Advisory lock file backend for platforms without named kernel mutexes.
//!
//! The lock is an exclusive `flock`-style lock on `<dir>/<name>.lock`.
//! Global scope lives in the shared temp directory, session scope in the
//! per-user runtime directory. The file itself is never deleted: unlinking
//! it would let a concurrent opener lock an orphaned inode.
//!
//! A caller-supplied lock file path on the identity replaces the derived
//! location entirely.

use super::{CreateOutcome, LockBackend};
use crate::error::{AloneError, Result};
use crate::name::{LockIdentity, LockScope};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Longest file stem kept so `<stem>.lock` fits the 255-byte NAME_MAX
const MAX_FILE_STEM: usize = 250;

/// Exclusive file lock kept open while the instance lock is held
#[derive(Debug)]
pub struct LockFileHandle {
    file: File,
    path: PathBuf,
}

impl LockFileHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Default)]
pub struct LockFileBackend {
    directory: Option<PathBuf>,
}

impl LockFileBackend {
    /// Keep every lock file in `dir` regardless of scope
    pub fn with_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(dir.into()),
        }
    }

    pub fn lock_path(&self, identity: &LockIdentity) -> PathBuf {
        if let Some(path) = identity.lock_file() {
            return path.to_path_buf();
        }
        let dir = match self.directory {
            Some(ref dir) => dir.clone(),
            None => scope_directory(identity.scope),
        };
        dir.join(format!("{}.lock", file_stem(identity.base_name())))
    }
}

fn file_stem(base_name: &str) -> &str {
    if base_name.len() <= MAX_FILE_STEM {
        return base_name;
    }
    let mut end = MAX_FILE_STEM;
    while !base_name.is_char_boundary(end) {
        end -= 1;
    }
    &base_name[..end]
}

fn scope_directory(scope: LockScope) -> PathBuf {
    match scope {
        LockScope::Global => std::env::temp_dir(),
        LockScope::Session => directories::BaseDirs::new()
            .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| {
                let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
                std::env::temp_dir().join(format!("alone-{}", user))
            }),
    }
}

fn open_lock_file(path: &Path, scope: LockScope) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
    {
        Ok(file) => {
            if scope == LockScope::Global {
                share_with_all_users(&file);
            }
            Ok(file)
        }
        // Created by another account without write access for us
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            OpenOptions::new().read(true).open(path)
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn share_with_all_users(file: &File) {
    use std::os::unix::fs::PermissionsExt;
    // Fails harmlessly when another account owns the file
    let _ = file.set_permissions(std::fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn share_with_all_users(_file: &File) {}

impl LockBackend for LockFileBackend {
    type Handle = LockFileHandle;

    fn create(&self, identity: &LockIdentity) -> Result<CreateOutcome<LockFileHandle>> {
        let path = self.lock_path(identity);
        let lock_error = |source: io::Error| AloneError::LockCreate {
            name: identity.name().to_string(),
            source,
        };

        let file = open_lock_file(&path, identity.scope).map_err(lock_error)?;

        if let Err(e) = FileExt::try_lock_exclusive(&file) {
            if e.kind() == fs2::lock_contended_error().kind() {
                tracing::debug!("Lock file {:?} is held by another owner", path);
                return Ok(CreateOutcome::AlreadyExists);
            }
            return Err(lock_error(e));
        }

        // Owner pid is informational only
        let _ = file.set_len(0);
        let mut writer = &file;
        let _ = writeln!(writer, "{}", std::process::id());

        tracing::debug!("Locked {:?}", path);
        Ok(CreateOutcome::Created(LockFileHandle { file, path }))
    }

    fn release(&self, handle: LockFileHandle) {
        if let Err(e) = FileExt::unlock(&handle.file) {
            tracing::warn!("Failed to unlock {:?}: {}", handle.path, e);
        }
    }
}
