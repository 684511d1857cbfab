use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{DataError, Result};
use crate::DataConfig;

const SKIP_CHUNK_SIZE: usize = 4 * 1024;

/// Reads typed values from any `Read` stream.
///
/// All multi-byte values are big-endian. Each call blocks until the full
/// value has been read; partial reads are handled internally.
pub struct DataReader<T> {
    inner: T,
    config: DataConfig,
}

impl<T: Read> DataReader<T> {
    /// Create a new reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DataConfig::default())
    }

    /// Create a new reader with explicit configuration.
    pub fn with_config(inner: T, config: DataConfig) -> Self {
        Self { inner, config }
    }

    /// Fill `buf` completely from the stream.
    ///
    /// Returns `Err(DataError::StreamClosed)` if EOF is hit first.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < buf.len() {
            match self.inner.read(&mut buf[offset..]) {
                Ok(0) => return Err(DataError::StreamClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Read an unsigned byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian `i16`.
    pub fn read_i16(&mut self) -> Result<i16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Read a big-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    /// Read a big-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Read a big-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Read a big-endian IEEE-754 `f64`.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a boolean. Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a length-prefixed UTF-8 text value (2-byte big-endian prefix).
    pub fn read_text(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Read a length-prefixed blob (4-byte big-endian prefix).
    ///
    /// Fails with `PayloadTooLarge` if the prefix exceeds the configured
    /// maximum, before any payload bytes are consumed.
    pub fn read_blob(&mut self) -> Result<Bytes> {
        let len = self.read_u32()? as usize;
        if len > self.config.max_blob_size {
            return Err(DataError::PayloadTooLarge {
                size: len,
                max: self.config.max_blob_size,
            });
        }
        let mut buf = BytesMut::zeroed(len);
        self.fill(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Fill `buf` exactly from the stream.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.fill(buf)
    }

    /// Fill `buf[off..off + len]` exactly from the stream.
    pub fn read_range(&mut self, buf: &mut [u8], off: usize, len: usize) -> Result<()> {
        let end = off
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| {
                DataError::Io(std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "range out of bounds",
                ))
            })?;
        self.fill(&mut buf[off..end])
    }

    /// Discard exactly `n` bytes from the stream.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        let mut scratch = [0u8; SKIP_CHUNK_SIZE];
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(SKIP_CHUNK_SIZE);
            self.fill(&mut scratch[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &DataConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for DataReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataReader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
