use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Condvar, Mutex, OnceLock, PoisonError},
};

static GLOBAL: OnceLock<PathLocks> = OnceLock::new();

/// Mutual exclusion keyed by filesystem path.
///
/// At most one [`PathGuard`] exists per path at a time. Guards for different paths never block
/// each other. Entries are removed on release, so the table only holds paths currently in use.
#[derive(Debug, Default)]
pub struct PathLocks {
    busy: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PathLocks {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide table shared by every [`RenderInvoker`](crate::RenderInvoker).
    pub fn global() -> &'static PathLocks {
        GLOBAL.get_or_init(PathLocks::new)
    }

    /// Block until `path` is free, then hold it until the returned guard is dropped.
    pub fn acquire(&self, path: &Path) -> PathGuard<'_> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        while busy.contains(path) {
            busy = self
                .released
                .wait(busy)
                .unwrap_or_else(PoisonError::into_inner);
        }
        busy.insert(path.to_path_buf());
        PathGuard {
            locks: self,
            path: path.to_path_buf(),
        }
    }

    /// Return `true` while some guard holds `path`.
    pub fn is_held(&self, path: &Path) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

/// Exclusive hold on one path in a [`PathLocks`] table.
#[derive(Debug)]
pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    path: PathBuf,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        let mut busy = self
            .locks
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        busy.remove(&self.path);
        drop(busy);
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/locks.rs"]
mod tests;
