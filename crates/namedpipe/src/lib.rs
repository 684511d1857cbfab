//! Unix named pipe (FIFO) lifecycle management.
//!
//! A [`PipeHandle`] owns a filesystem path designated to be (or become) a
//! FIFO special file, plus at most one lazily opened read stream and one
//! lazily opened write stream over it:
//!
//! - Construction runs the creation/validation protocol synchronously,
//!   under an advisory inter-process lock on a sibling `<path>.lock` file,
//!   so two processes cannot race each other through the
//!   existence-check-and-create sequence.
//! - The first typed read (or write) opens that direction's stream and
//!   caches it; per FIFO semantics, the open blocks until a peer opens the
//!   complementary direction.
//! - [`PipeHandle::close`] is idempotent, tears down whatever was opened,
//!   and optionally removes the filesystem entry; it also runs on drop, so
//!   cleanup is deterministic on every exit path.
//!
//! Typed values (integers, floats, booleans, length-prefixed text and
//! blobs, raw byte ranges) are carried by the [`namedpipe-data`] layer,
//! re-exported here.
//!
//! One pipe per handle, one logical reader, one logical writer. No
//! framing, no multiplexing, no timeouts: a blocked open or read can only
//! be unblocked by the peer.
//!
//! ```no_run
//! use std::sync::Arc;
//! use namedpipe::PipeHandle;
//!
//! let pipe = Arc::new(PipeHandle::create("/tmp/p1")?);
//! let writer = Arc::clone(&pipe);
//! let t = std::thread::spawn(move || writer.write_i32(2739847));
//! assert_eq!(pipe.read_i32()?, 2739847);
//! t.join().unwrap()?;
//! pipe.close()?;
//! # Ok::<(), namedpipe::PipeError>(())
//! ```
//!
//! [`namedpipe-data`]: namedpipe_data

pub mod creation;
pub mod error;
pub mod handle;
pub mod options;

#[cfg(unix)]
mod lock;

pub use creation::FifoCreator;
pub use error::{PipeError, Result};
pub use handle::PipeHandle;
pub use options::{CreationMode, Direction, PipeOptions, PipeState, DEFAULT_PIPE_MODE};

pub use namedpipe_data::{DataConfig, DataError, DataReader, DataWriter};
