use std::path::PathBuf;

use crate::options::Direction;

/// Errors that can occur over a pipe handle's lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// The host platform has no FIFO special files.
    #[error("named pipes are not supported on this platform")]
    UnsupportedPlatform,

    /// The target path exists and neither opening nor overwriting was requested.
    #[error("path already exists: {path}")]
    PathAlreadyExists { path: PathBuf },

    /// The target path exists but is not a FIFO special file.
    #[error("existing entry is not a named pipe: {path}")]
    ExistingEntryNotAPipe { path: PathBuf },

    /// The creation primitive failed to produce a FIFO at the target path.
    #[error("failed to create FIFO at {path}: {source}")]
    CreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The creation lock file could not be created or locked.
    #[error("failed to acquire creation lock {path}: {source}")]
    LockUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Opening one direction's stream over the FIFO failed.
    #[error("failed to open {direction} stream for {path}: {source}")]
    StreamOpenFailed {
        direction: Direction,
        path: PathBuf,
        source: std::io::Error,
    },

    /// An operation was attempted on a closed handle.
    #[error("pipe handle is closed ({direction} side)")]
    UseAfterClose { direction: Direction },

    /// Removing the filesystem entry during close failed.
    ///
    /// The streams have already been closed when this is reported.
    #[error("failed to delete {path}: {source}")]
    DeletionFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Typed-I/O error on an open stream.
    #[error("data error: {0}")]
    Data(#[from] namedpipe_data::DataError),

    /// An I/O error during teardown.
    #[error("pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipeError>;
