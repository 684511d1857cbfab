use namedpipe_data::DataConfig;

use crate::creation::FifoCreator;

/// Default permission mode for newly created FIFOs, masked by the umask.
pub const DEFAULT_PIPE_MODE: u32 = 0o600;

/// One direction of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Read => f.write_str("read"),
            Direction::Write => f.write_str("write"),
        }
    }
}

/// Lifecycle state of one pipe direction: `Unopened → Open → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeState {
    Unopened,
    Open,
    Closed,
}

/// How a handle came to refer to its FIFO. Recorded for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// The path did not exist; a new FIFO was created.
    CreateNew,
    /// The path held a FIFO already; it was validated and reused.
    OpenExisting,
    /// The path held some entry; it was deleted and a new FIFO created.
    CreateOrOverwrite,
}

/// Construction options for [`PipeHandle`](crate::PipeHandle).
#[derive(Debug, Clone)]
pub struct PipeOptions {
    /// If the path already exists, delete it and create a fresh FIFO.
    pub overwrite_existing: bool,
    /// If the path already exists and is a FIFO, reuse it instead of failing.
    ///
    /// When both `open_existing` and `overwrite_existing` are set and the
    /// path exists, `open_existing` wins: the existing FIFO is validated and
    /// reused, nothing is deleted. Opening intent beats destructive intent.
    pub open_existing: bool,
    /// Remove the filesystem entry when the handle is closed.
    pub delete_on_close: bool,
    /// Permission mode for a newly created FIFO, masked by the umask.
    pub mode: u32,
    /// The primitive used to create the FIFO special file.
    pub creator: FifoCreator,
    /// Configuration applied to both typed streams.
    pub data_config: DataConfig,
}

impl Default for PipeOptions {
    /// Defaults: create-new semantics, delete on close, mode `0o600`,
    /// `mkfifo(2)` syscall creator.
    fn default() -> Self {
        Self {
            overwrite_existing: false,
            open_existing: false,
            delete_on_close: true,
            mode: DEFAULT_PIPE_MODE,
            creator: FifoCreator::default(),
            data_config: DataConfig::default(),
        }
    }
}
