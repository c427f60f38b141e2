use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for reading, converting and writing wave streams
#[derive(Debug, Error)]
pub enum Error {
    /// The bytes are not a well formed RIFF/WAVE container
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// The container is well formed but declares an encoding that can't be decoded or encoded
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Samples handed to a [`SampleBuffer`](crate::SampleBuffer) don't fit its format
    #[error("invalid buffer: {0}")]
    InvalidBuffer(String),
    /// No frames left to read
    #[error("end of stream")]
    EndOfStream,
    /// The writer has already been closed
    #[error("stream writer is closed")]
    Closed,
    /// Append target does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedFormat(msg.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
