//! Our error types for the UDP3000S PSUs.

use thiserror::Error;

use crate::channel::InvalidChannel;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Error type for SCPI communications with the PSU, generic over the transport's error type.
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error(transparent)]
    InvalidChannel(#[from] InvalidChannel),
    #[error("Invalid setpoint value: {0}")]
    InvalidValue(f64),
    #[error("Invalid or unsupported resource: {0}")]
    InvalidResource(String),
    #[error("Could not open resource: {0:?}")]
    Open(I),
    #[error("Transport error: {0:?}")]
    Transport(I),
    #[error("Communication timeout")]
    Timeout,
    #[error("Transport closed by the instrument")]
    Disconnected,
    #[error("Message does not fit in the session buffer")]
    BufferError,
    #[error("Reply is not valid UTF-8")]
    InvalidUtf8,
    #[error("Invalid response received: {0:?}")]
    InvalidResponse(String),
}

impl<I: embedded_io::Error> Error<I> {
    /// Sort a transport read/write failure into a timeout or a plain transport error.
    pub(crate) fn from_io(err: I) -> Self {
        if matches!(err.kind(), embedded_io::ErrorKind::TimedOut) {
            Error::Timeout
        } else {
            Error::Transport(err)
        }
    }
}
