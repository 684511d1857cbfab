use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{DataError, Result};
use crate::{DataConfig, MAX_TEXT_LEN};

const STAGING_CAPACITY: usize = 8 * 1024;

/// Writes typed values to any `Write` stream.
///
/// All multi-byte values are big-endian. Each call writes the full value
/// before returning; length-prefixed values are staged so prefix and payload
/// reach the stream in one write.
pub struct DataWriter<T> {
    inner: T,
    buf: BytesMut,
    config: DataConfig,
}

impl<T: Write> DataWriter<T> {
    /// Create a new writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DataConfig::default())
    }

    /// Create a new writer with explicit configuration.
    pub fn with_config(inner: T, config: DataConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(STAGING_CAPACITY),
            config,
        }
    }

    /// Write all of `bytes` to the stream.
    fn put_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(DataError::StreamClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Write an unsigned byte.
    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.put_all(&[v])
    }

    /// Write a signed byte.
    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.put_all(&[v as u8])
    }

    /// Write a big-endian `u16`.
    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian `i16`.
    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian `u32`.
    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian `i32`.
    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian `u64`.
    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian `i64`.
    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        self.put_all(&v.to_be_bytes())
    }

    /// Write a big-endian IEEE-754 `f32`.
    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.write_u32(v.to_bits())
    }

    /// Write a big-endian IEEE-754 `f64`.
    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        self.write_u64(v.to_bits())
    }

    /// Write a boolean as a single byte (0 or 1).
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(v as u8)
    }

    /// Write a length-prefixed UTF-8 text value (2-byte big-endian prefix).
    ///
    /// Fails with `TextTooLong` if the encoded text exceeds 65 535 bytes.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let bytes = text.as_bytes();
        if bytes.len() > MAX_TEXT_LEN {
            return Err(DataError::TextTooLong {
                len: bytes.len(),
                max: MAX_TEXT_LEN,
            });
        }
        self.buf.clear();
        self.buf.reserve(2 + bytes.len());
        self.buf.put_u16(bytes.len() as u16);
        self.buf.put_slice(bytes);
        let staged = self.buf.split().freeze();
        self.put_all(&staged)
    }

    /// Write a length-prefixed blob (4-byte big-endian prefix).
    ///
    /// Fails with `PayloadTooLarge` if the blob exceeds the configured
    /// maximum; nothing is written in that case.
    pub fn write_blob(&mut self, blob: &[u8]) -> Result<()> {
        if blob.len() > self.config.max_blob_size {
            return Err(DataError::PayloadTooLarge {
                size: blob.len(),
                max: self.config.max_blob_size,
            });
        }
        self.buf.clear();
        self.buf.reserve(4 + blob.len());
        self.buf.put_u32(blob.len() as u32);
        self.buf.put_slice(blob);
        let staged = self.buf.split().freeze();
        self.put_all(&staged)
    }

    /// Write all of `bytes` with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.put_all(bytes)
    }

    /// Write `bytes[off..off + len]` with no length prefix.
    pub fn write_range(&mut self, bytes: &[u8], off: usize, len: usize) -> Result<()> {
        let end = off
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                DataError::Io(std::io::Error::new(
                    ErrorKind::InvalidInput,
                    "range out of bounds",
                ))
            })?;
        self.put_all(&bytes[off..end])
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &DataConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for DataWriter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataWriter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
