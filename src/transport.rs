//! The boundary between the PSU driver and whatever carries its bytes.
//!
//! A [`ResourceManager`] knows how to find and open instruments by resource string; each open
//! resource is a [`Transport`], a plain byte stream over [`embedded_io::Read`] and
//! [`embedded_io::Write`] that can also change its timeout and be closed.

use fugit::MillisDurationU32;

use crate::error::Result;

/// An open, byte-oriented connection to one instrument.
pub trait Transport: embedded_io::Read + embedded_io::Write {
    /// Set how long a read or write may block before failing with
    /// [`embedded_io::ErrorKind::TimedOut`].
    fn set_timeout(&mut self, timeout: MillisDurationU32) -> core::result::Result<(), Self::Error>;

    /// Release the connection.
    fn close(self) -> core::result::Result<(), Self::Error>
    where
        Self: Sized;
}

/// The error type of a manager's transports.
pub type TransportError<M> =
    <<M as ResourceManager>::Transport as embedded_io::ErrorType>::Error;

/// Discovers and opens instrument resources.
pub trait ResourceManager {
    type Transport: Transport;

    /// Return the identifiers of every resource this manager can currently see.
    fn list_resources(
        &mut self,
    ) -> Result<Vec<String>, <Self::Transport as embedded_io::ErrorType>::Error>;

    /// Open the resource named by `resource`.
    fn open(
        &mut self,
        resource: &str,
    ) -> Result<Self::Transport, <Self::Transport as embedded_io::ErrorType>::Error>;

    /// Release the manager itself.
    fn close(&mut self) -> Result<(), <Self::Transport as embedded_io::ErrorType>::Error>;
}
