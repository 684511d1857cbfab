use std::path::Path;

/// The primitive used to create a FIFO special file.
///
/// Carried in [`PipeOptions`](crate::PipeOptions) rather than read from
/// process-wide state, so concurrent handles (and tests) can use different
/// primitives without interfering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FifoCreator {
    /// Direct `mkfifo(2)` syscall.
    #[default]
    Syscall,
    /// Spawn an external command as `<command> <path>`.
    ///
    /// A non-zero exit status is a creation failure.
    Command(String),
}

#[cfg(unix)]
impl FifoCreator {
    /// Create a FIFO at `path` with permission `mode` (masked by the umask).
    pub(crate) fn create(&self, path: &Path, mode: u32) -> std::io::Result<()> {
        match self {
            FifoCreator::Syscall => mkfifo(path, mode),
            FifoCreator::Command(command) => {
                let status = std::process::Command::new(command).arg(path).status()?;
                if status.success() {
                    Ok(())
                } else {
                    Err(std::io::Error::other(format!(
                        "{command} exited with {status}"
                    )))
                }
            }
        }
    }
}

#[cfg(unix)]
fn mkfifo(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    let path = std::ffi::CString::new(path.as_os_str().as_bytes())?;
    // SAFETY: `path` is a valid NUL-terminated C string for the duration of
    // the call.
    let rc = unsafe { libc::mkfifo(path.as_ptr(), mode as libc::mode_t) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}
