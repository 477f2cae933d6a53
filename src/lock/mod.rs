//! Lock Coordinator
//!
//! Owns at most one named system lock and implements acquire-or-detect.
//! The OS creation call is the only arbiter of "who is first": the backend
//! reports `Created` to exactly one caller per name and `AlreadyExists`
//! to everyone else. There is no check-then-create step in this module.
//!
//! Intended for single-threaded use during startup and shutdown. Callers
//! sharing a coordinator between threads must serialize access themselves.

#[cfg(not(windows))]
pub mod lock_file;
#[cfg(windows)]
pub mod named_mutex;

use crate::error::Result;
use crate::name::LockIdentity;

#[cfg(not(windows))]
pub use lock_file::LockFileBackend as SystemLockBackend;
#[cfg(windows)]
pub use named_mutex::NamedMutexBackend as SystemLockBackend;

/// Result of asking the OS to create a named lock
#[derive(Debug)]
pub enum CreateOutcome<H> {
    /// The object was newly created and is owned by this process
    Created(H),
    /// Another owner already holds the name; nothing was retained
    AlreadyExists,
}

/// Platform primitive behind the coordinator
pub trait LockBackend {
    /// Owned OS resource kept while the lock is held
    type Handle;

    /// Create the named object. Must report an existing name as
    /// `AlreadyExists` and release anything partially created.
    fn create(&self, identity: &LockIdentity) -> Result<CreateOutcome<Self::Handle>>;

    /// Release ownership and close the handle.
    fn release(&self, handle: Self::Handle);
}

struct HeldLock<H> {
    name: String,
    handle: H,
}

/// Unlocked -> Held -> Unlocked state machine over one backend
pub struct LockCoordinator<B: LockBackend> {
    backend: B,
    held: Option<HeldLock<B::Handle>>,
}

impl LockCoordinator<SystemLockBackend> {
    /// Coordinator over the platform's named lock primitive
    pub fn system() -> Self {
        Self::new(SystemLockBackend::default())
    }
}

impl<B: LockBackend> LockCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            held: None,
        }
    }

    /// Try to become the sole owner of `identity`.
    ///
    /// Returns `Ok(true)` when the lock was created by this call and
    /// `Ok(false)` when the name already exists or this coordinator already
    /// holds a lock (no OS call is made in that case). Resource errors are
    /// returned as `Err` and leave the coordinator unlocked.
    pub fn try_acquire(&mut self, identity: &LockIdentity) -> Result<bool> {
        if let Some(ref held) = self.held {
            tracing::debug!(
                "Lock {} already held by this coordinator, refusing {}",
                held.name,
                identity
            );
            return Ok(false);
        }

        match self.backend.create(identity)? {
            CreateOutcome::Created(handle) => {
                tracing::info!("Acquired instance lock {}", identity);
                self.held = Some(HeldLock {
                    name: identity.name().to_string(),
                    handle,
                });
                Ok(true)
            }
            CreateOutcome::AlreadyExists => {
                tracing::info!("Instance lock {} already exists", identity);
                Ok(false)
            }
        }
    }

    /// Release the held lock. Calling it while unlocked is a no-op.
    pub fn release(&mut self) {
        if let Some(held) = self.held.take() {
            self.backend.release(held.handle);
            tracing::info!("Released instance lock {}", held.name);
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }

    /// Name of the held lock, if any
    pub fn held_name(&self) -> Option<&str> {
        self.held.as_ref().map(|h| h.name.as_str())
    }
}

impl<B: LockBackend> Drop for LockCoordinator<B> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AloneError;
    use crate::name::{generate, generate_scoped, LockScope};
    use crate::testing::FakeLockBackend;
    use std::sync::{Arc, Barrier};

    /// Per-test name so parallel tests never share a real lock
    fn unique_identity(test: &str) -> LockIdentity {
        generate_scoped(
            LockScope::Session,
            "alone.tests",
            &format!("{}_{}", test, std::process::id()),
            None,
        )
    }

    #[test]
    fn test_acquire_and_release() {
        let backend = FakeLockBackend::default();
        let mut coordinator = LockCoordinator::new(backend.clone());
        let id = generate("com.example.app", "MyApp", None);

        assert!(coordinator.try_acquire(&id).unwrap());
        assert!(coordinator.is_held());
        assert_eq!(coordinator.held_name(), Some("Global\\com.example.app_MyApp"));

        coordinator.release();
        assert!(!coordinator.is_held());
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn test_reentrant_acquire_is_refused_without_os_call() {
        let backend = FakeLockBackend::default();
        let mut coordinator = LockCoordinator::new(backend.clone());
        let id = generate("pkg", "app", None);

        assert!(coordinator.try_acquire(&id).unwrap());
        assert!(!coordinator.try_acquire(&id).unwrap());
        assert!(!coordinator.try_acquire(&generate("other", "app", None)).unwrap());
        assert_eq!(backend.create_calls(), 1);
        assert!(coordinator.is_held());
    }

    #[test]
    fn test_existing_name_is_not_acquired() {
        let backend = FakeLockBackend::default();
        let id = generate("pkg", "app", None);

        let mut first = LockCoordinator::new(backend.clone());
        let mut second = LockCoordinator::new(backend.clone());
        assert!(first.try_acquire(&id).unwrap());
        assert!(!second.try_acquire(&id).unwrap());
        assert!(!second.is_held());

        first.release();
        assert!(second.try_acquire(&id).unwrap());
    }

    #[test]
    fn test_release_twice_is_noop() {
        let backend = FakeLockBackend::default();
        let mut coordinator = LockCoordinator::new(backend.clone());
        coordinator.release();
        coordinator
            .try_acquire(&generate("pkg", "app", None))
            .unwrap();
        coordinator.release();
        coordinator.release();
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn test_resource_error_stays_unlocked() {
        let backend = FakeLockBackend::failing();
        let mut coordinator = LockCoordinator::new(backend);
        let err = coordinator
            .try_acquire(&generate("pkg", "app", None))
            .unwrap_err();
        assert!(matches!(err, AloneError::LockCreate { .. }));
        assert!(!coordinator.is_held());
    }

    #[test]
    fn test_drop_releases() {
        let backend = FakeLockBackend::default();
        {
            let mut coordinator = LockCoordinator::new(backend.clone());
            coordinator
                .try_acquire(&generate("pkg", "app", None))
                .unwrap();
        }
        assert_eq!(backend.releases(), 1);
    }

    #[test]
    fn test_system_lock_exclusive() {
        let id = unique_identity("exclusive");
        let mut first = LockCoordinator::system();
        let mut second = LockCoordinator::system();

        assert!(first.try_acquire(&id).unwrap());
        assert!(!second.try_acquire(&id).unwrap());

        first.release();
        assert!(second.try_acquire(&id).unwrap());
        second.release();
    }

    #[test]
    fn test_system_lock_race_has_one_winner() {
        const CONTENDERS: usize = 8;
        let id = unique_identity("race");
        let start = Arc::new(Barrier::new(CONTENDERS));
        let tried = Arc::new(Barrier::new(CONTENDERS));

        let handles: Vec<_> = (0..CONTENDERS)
            .map(|_| {
                let id = id.clone();
                let start = Arc::clone(&start);
                let tried = Arc::clone(&tried);
                std::thread::spawn(move || {
                    let mut coordinator = LockCoordinator::system();
                    start.wait();
                    let won = coordinator.try_acquire(&id).unwrap();
                    // Nobody releases before every contender has tried
                    tried.wait();
                    won
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
