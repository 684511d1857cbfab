//! Sequential typed binary I/O over `Read`/`Write` streams.
//!
//! Every value is encoded big-endian (network order):
//! - Fixed-width integers and IEEE-754 floats
//! - Booleans as a single byte (writer emits 0/1, reader accepts any non-zero as true)
//! - Text as a 2-byte length prefix followed by UTF-8 bytes
//! - Blobs as a 4-byte length prefix followed by raw bytes
//!
//! No buffering surprises: each value is read or written in full before the
//! call returns.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{DataError, Result};
pub use reader::DataReader;
pub use writer::DataWriter;

/// Maximum byte length of a length-prefixed text value (16-bit prefix).
pub const MAX_TEXT_LEN: usize = u16::MAX as usize;

/// Default maximum blob size: 16 MiB.
pub const DEFAULT_MAX_BLOB: usize = 16 * 1024 * 1024;

/// Configuration for typed stream I/O.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Maximum accepted blob size in bytes. Default: 16 MiB.
    pub max_blob_size: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            max_blob_size: DEFAULT_MAX_BLOB,
        }
    }
}
