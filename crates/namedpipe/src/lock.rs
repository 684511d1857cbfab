use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Scoped advisory lock serializing the existence-check-and-create sequence
/// across processes targeting the same pipe path.
///
/// Takes a blocking exclusive `flock(2)` on a sibling `<path>.lock` file.
/// The guard releases the lock on drop, on every exit path. The lock file
/// itself is left in place: removing it would hand a later locker a fresh
/// inode while an earlier one still holds the old inode's lock.
pub(crate) struct CreationLock {
    file: File,
    path: PathBuf,
}

impl CreationLock {
    /// The sibling lock path for a pipe path.
    pub(crate) fn lock_path(pipe_path: &Path) -> PathBuf {
        let mut path = OsString::from(pipe_path.as_os_str());
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Block until the exclusive lock for `pipe_path` is held.
    pub(crate) fn acquire(pipe_path: &Path) -> std::io::Result<Self> {
        let path = Self::lock_path(pipe_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        loop {
            // SAFETY: `file` is an open descriptor owned by this function.
            let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
            if rc == 0 {
                break;
            }
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }

        debug!(?path, "acquired creation lock");
        Ok(Self { file, path })
    }
}

impl Drop for CreationLock {
    fn drop(&mut self) {
        // SAFETY: the descriptor is still open; unlocking cannot invalidate it.
        let _ = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_UN) };
        debug!(path = ?self.path, "released creation lock");
    }
}
