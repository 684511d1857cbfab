/// Errors that can occur in typed stream I/O.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The stream ended before the operation completed.
    #[error("stream closed before the operation completed")]
    StreamClosed,

    /// A text value exceeds the 16-bit length prefix.
    #[error("text too long ({len} bytes, max {max})")]
    TextTooLong { len: usize, max: usize },

    /// A blob exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A text value on the stream is not valid UTF-8.
    #[error("text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred on the underlying stream.
    #[error("data I/O error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            DataError::StreamClosed
        } else {
            DataError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
