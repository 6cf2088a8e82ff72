//! Scoped scratch resources with cleanup on every exit path.
//!
//! Dropping a guard removes its path on success and on error. Paths are also
//! kept in a process-wide registry so that the interrupt handler installed by
//! [`install_interrupt_cleanup`] can remove them before the process exits on
//! SIGINT/SIGTERM, when destructors never run.

use crate::bundler::error::{ErrorExt, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Exit status used after an interrupt, matching shell convention for SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static REGISTRY: LazyLock<Mutex<BTreeSet<PathBuf>>> = LazyLock::new(Default::default);

fn registry() -> MutexGuard<'static, BTreeSet<PathBuf>> {
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn register(path: &Path) {
    registry().insert(path.to_path_buf());
}

fn unregister(path: &Path) {
    registry().remove(path);
}

fn remove_path(path: &Path) {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Removes every registered path. Returns how many were registered.
pub fn cleanup_registered() -> usize {
    let paths: Vec<PathBuf> = std::mem::take(&mut *registry()).into_iter().collect();
    for path in &paths {
        remove_path(path);
    }
    paths.len()
}

/// Spawns a task that cleans registered paths and exits on SIGINT/SIGTERM.
///
/// Must be called from within a tokio runtime.
pub fn install_interrupt_cleanup() {
    tokio::spawn(async {
        wait_for_interrupt().await;
        let removed = cleanup_registered();
        log::warn!("Interrupted; removed {} scratch path(s)", removed);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
}

#[cfg(unix)]
async fn wait_for_interrupt() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            log::debug!("SIGTERM handler unavailable: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Removes a file or directory when dropped unless disarmed.
#[derive(Debug)]
pub struct CleanupGuard {
    path: PathBuf,
    armed: bool,
}

impl CleanupGuard {
    /// Registers `path` for removal.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        register(&path);
        Self { path, armed: true }
    }

    /// Guarded path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keeps the path; it is no longer removed on drop or interrupt.
    pub fn disarm(mut self) {
        unregister(&self.path);
        self.armed = false;
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if self.armed {
            remove_path(&self.path);
            unregister(&self.path);
        }
    }
}

/// Temporary directory removed on drop or interrupt.
#[derive(Debug)]
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    /// Creates a fresh directory under the system temp location.
    pub fn new(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .fs_context("creating scratch directory in", std::env::temp_dir())?;
        register(dir.path());
        log::debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        unregister(self.dir.path());
    }
}
