//! In-memory stand-ins for the platform seams, shared by unit tests.

use crate::error::{AloneError, Result};
use crate::lock::{CreateOutcome, LockBackend};
use crate::name::LockIdentity;
use crate::process::{ProcessEntry, ProcessOwner, ProcessTable};
use crate::window::{WindowHandle, WindowSystem};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LockState {
    held: HashSet<String>,
    create_calls: usize,
    releases: usize,
}

/// Named locks in a shared set; clones see the same namespace
#[derive(Clone, Default)]
pub struct FakeLockBackend {
    state: Arc<Mutex<LockState>>,
    fail: bool,
}

impl FakeLockBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().unwrap().create_calls
    }

    pub fn releases(&self) -> usize {
        self.state.lock().unwrap().releases
    }
}

impl LockBackend for FakeLockBackend {
    type Handle = String;

    fn create(&self, identity: &LockIdentity) -> Result<CreateOutcome<String>> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if self.fail {
            return Err(AloneError::LockCreate {
                name: identity.name().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        if state.held.insert(identity.name().to_string()) {
            Ok(CreateOutcome::Created(identity.name().to_string()))
        } else {
            Ok(CreateOutcome::AlreadyExists)
        }
    }

    fn release(&self, handle: String) {
        let mut state = self.state.lock().unwrap();
        state.held.remove(&handle);
        state.releases += 1;
    }
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub title: String,
    pub visible: bool,
    pub minimized: bool,
    pub allow_foreground: bool,
    pub allow_focus: bool,
}

impl FakeWindow {
    pub fn visible(title: &str) -> Self {
        Self {
            title: title.to_string(),
            visible: true,
            minimized: false,
            allow_foreground: true,
            allow_focus: true,
        }
    }
}

#[derive(Default)]
pub struct FakeWindows {
    windows: RefCell<Vec<(u32, WindowHandle, FakeWindow)>>,
    next: Cell<isize>,
    calls: RefCell<Vec<&'static str>>,
    /// Windows disappear right after being looked up (peer exited)
    vanish_after_lookup: Cell<bool>,
}

impl FakeWindows {
    pub fn add(&self, pid: u32, window: FakeWindow) -> WindowHandle {
        self.next.set(self.next.get() + 1);
        let handle = WindowHandle(0x1000 + self.next.get());
        self.windows.borrow_mut().push((pid, handle, window));
        handle
    }

    pub fn get(&self, handle: WindowHandle) -> Option<FakeWindow> {
        self.windows
            .borrow()
            .iter()
            .find(|(_, h, _)| *h == handle)
            .map(|(_, _, w)| w.clone())
    }

    pub fn vanish_after_lookup(&self) {
        self.vanish_after_lookup.set(true);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn with_window<R>(
        &self,
        handle: WindowHandle,
        call: &'static str,
        f: impl FnOnce(&mut FakeWindow) -> R,
    ) -> Option<R> {
        self.calls.borrow_mut().push(call);
        self.windows
            .borrow_mut()
            .iter_mut()
            .find(|(_, h, _)| *h == handle)
            .map(|(_, _, w)| f(w))
    }
}

impl WindowSystem for FakeWindows {
    fn find_main_window(&self, pid: u32, title: Option<&str>) -> Option<WindowHandle> {
        let found = {
            let windows = self.windows.borrow();
            let mut candidates = windows
                .iter()
                .filter(|(owner, _, w)| *owner == pid && w.visible && !w.title.is_empty());
            let first = candidates.clone().next().map(|(_, h, _)| *h);
            title
                .and_then(|wanted| candidates.find(|(_, _, w)| w.title == wanted))
                .map(|(_, h, _)| *h)
                .or(first)
        };
        if let Some(handle) = found {
            if self.vanish_after_lookup.get() {
                self.windows.borrow_mut().retain(|(_, h, _)| *h != handle);
            }
        }
        found
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        self.get(window).is_some()
    }

    fn is_visible(&self, window: WindowHandle) -> bool {
        self.get(window).map_or(false, |w| w.visible)
    }

    fn is_minimized(&self, window: WindowHandle) -> bool {
        self.get(window).map_or(false, |w| w.minimized)
    }

    fn show(&self, window: WindowHandle) -> bool {
        self.with_window(window, "show", |w| {
            w.visible = true;
            true
        })
        .unwrap_or(false)
    }

    fn restore(&self, window: WindowHandle) -> bool {
        self.with_window(window, "restore", |w| {
            w.minimized = false;
            true
        })
        .unwrap_or(false)
    }

    fn bring_to_foreground(&self, window: WindowHandle) -> bool {
        self.with_window(window, "foreground", |w| w.allow_foreground)
            .unwrap_or(false)
    }

    fn focus(&self, window: WindowHandle) -> bool {
        self.with_window(window, "focus", |w| w.allow_focus)
            .unwrap_or(false)
    }
}

pub struct FakeProcessTable {
    current_pid: u32,
    current_exe: PathBuf,
    entries: Vec<ProcessEntry>,
    owners: HashMap<u32, ProcessOwner>,
    fail: bool,
}

impl FakeProcessTable {
    pub fn new(current_pid: u32, current_exe: PathBuf) -> Self {
        Self {
            current_pid,
            current_exe,
            entries: Vec::new(),
            owners: HashMap::new(),
            fail: false,
        }
    }

    pub fn failing(current_pid: u32, current_exe: PathBuf) -> Self {
        Self {
            fail: true,
            ..Self::new(current_pid, current_exe)
        }
    }

    pub fn add(&mut self, pid: u32, executable_path: Option<PathBuf>) {
        self.entries.push(ProcessEntry {
            pid,
            executable_path,
            start_time: None,
        });
    }

    pub fn set_owner(&mut self, pid: u32, domain: Option<&str>, user: &str) {
        self.owners.insert(
            pid,
            ProcessOwner {
                domain: domain.map(str::to_string),
                user: user.to_string(),
            },
        );
    }
}

impl ProcessTable for FakeProcessTable {
    fn current_pid(&self) -> u32 {
        self.current_pid
    }

    fn current_executable(&self) -> Option<PathBuf> {
        Some(self.current_exe.clone())
    }

    fn snapshot(&mut self) -> Result<Vec<ProcessEntry>> {
        if self.fail {
            return Err(AloneError::ProcessEnumeration("snapshot denied".to_string()));
        }
        Ok(self.entries.clone())
    }

    fn owner_of(&self, pid: u32) -> Option<ProcessOwner> {
        self.owners.get(&pid).cloned()
    }
}
