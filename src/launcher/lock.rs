//! Cross-process serialization of the repair path.

use super::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive advisory lock, released on drop.
pub struct RepairLock {
    #[cfg(unix)]
    _lock: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _file: File,
}

impl RepairLock {
    /// Blocks until the lock on `path` is held, creating the file if needed.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;

        #[cfg(unix)]
        {
            use nix::fcntl::{Flock, FlockArg};

            let lock = Flock::lock(file, FlockArg::LockExclusive)
                .map_err(|(_, errno)| std::io::Error::from(errno))?;
            log::debug!("Holding {}", path.display());
            Ok(Self { _lock: lock })
        }

        #[cfg(not(unix))]
        {
            Ok(Self { _file: file })
        }
    }
}
