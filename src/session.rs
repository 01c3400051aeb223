//! Line framing of SCPI text over a [`Transport`].

use core::fmt::{Display, Write as _};

use fugit::MillisDurationU32;

use crate::{
    error::{Error, Result},
    transport::{ResourceManager, Transport},
};

/// Timeout applied to newly opened sessions.
pub const DEFAULT_TIMEOUT: MillisDurationU32 = MillisDurationU32::from_ticks(2000);

/// Line terminator used in both directions by default.
pub const DEFAULT_TERMINATION: u8 = b'\n';

/// One open resource, speaking newline-terminated text.
///
/// `L` bounds both the longest command and the longest reply line.
pub struct Session<T: Transport, const L: usize = 256> {
    transport: T,
    timeout: MillisDurationU32,
    read_termination: u8,
    write_termination: u8,
    /// Bytes received after the last read terminator, not yet handed out.
    pending: heapless::Vec<u8, L>,
}

impl<T: Transport, const L: usize> Session<T, L> {
    /// Wrap an already open transport. Terminators default to `\n`; the transport's own
    /// timeout is left untouched until [`Self::set_timeout`] is called.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
            read_termination: DEFAULT_TERMINATION,
            write_termination: DEFAULT_TERMINATION,
            pending: heapless::Vec::new(),
        }
    }

    /// Open `resource` through `manager`, then apply `timeout` and `\n` termination both ways.
    pub fn open<M>(manager: &mut M, resource: &str, timeout: MillisDurationU32) -> Result<Self, T::Error>
    where
        M: ResourceManager<Transport = T>,
    {
        let transport = manager.open(resource)?;
        let mut session = Self::new(transport);
        session.set_timeout(timeout)?;
        session.set_read_termination(DEFAULT_TERMINATION);
        session.set_write_termination(DEFAULT_TERMINATION);
        log::debug!("Opened {resource} (timeout {} ms)", timeout.to_millis());
        Ok(session)
    }

    pub fn set_timeout(&mut self, timeout: MillisDurationU32) -> Result<(), T::Error> {
        self.transport
            .set_timeout(timeout)
            .map_err(Error::Transport)?;
        self.timeout = timeout;
        Ok(())
    }

    pub fn timeout(&self) -> MillisDurationU32 {
        self.timeout
    }

    pub fn set_read_termination(&mut self, termination: u8) {
        self.read_termination = termination;
    }

    pub fn set_write_termination(&mut self, termination: u8) {
        self.write_termination = termination;
    }

    pub fn interface(&self) -> &T {
        &self.transport
    }

    pub fn interface_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send one command line.
    pub fn write(&mut self, command: impl Display) -> Result<(), T::Error> {
        let mut line: heapless::String<L> = heapless::String::new();
        write!(line, "{command}").map_err(|_| Error::BufferError)?;
        log::debug!("-> {line}");
        line.push(self.write_termination as char)
            .map_err(|_| Error::BufferError)?;

        self.transport
            .write_all(line.as_bytes())
            .map_err(Error::from_io)?;
        self.transport.flush().map_err(Error::from_io)
    }

    /// Send one command line and wait for one reply line, returned without its terminator.
    pub fn query(&mut self, command: impl Display) -> Result<heapless::String<L>, T::Error> {
        self.write(command)?;
        let reply = self.read_line()?;
        log::debug!("<- {}", reply.trim_end());
        Ok(reply)
    }

    /// Read up to the next read terminator.
    ///
    /// A line longer than `L` is consumed through its terminator and reported as
    /// [`Error::BufferError`], so the following read starts on the next line.
    pub fn read_line(&mut self) -> Result<heapless::String<L>, T::Error> {
        let mut line: heapless::Vec<u8, L> = heapless::Vec::new();
        let mut overflowed = false;
        let mut chunk = [0u8; 32];
        loop {
            if let Some(end) = self
                .pending
                .iter()
                .position(|&b| b == self.read_termination)
            {
                if !overflowed && line.extend_from_slice(&self.pending[..end]).is_err() {
                    overflowed = true;
                }
                self.pending = heapless::Vec::from_slice(&self.pending[end + 1..])
                    .map_err(|_| Error::BufferError)?;
                break;
            }

            if !overflowed && line.extend_from_slice(&self.pending).is_err() {
                log::debug!("Reply exceeds {L} bytes, discarding the rest of the line");
                overflowed = true;
            }
            self.pending.clear();

            // `pending` is empty here, so one read never holds more than it can take.
            let room = chunk.len().min(L);
            match self.transport.read(&mut chunk[..room]) {
                Ok(0) => return Err(Error::Disconnected),
                Ok(bytes_read) => self
                    .pending
                    .extend_from_slice(&chunk[..bytes_read])
                    .map_err(|_| Error::BufferError)?,
                Err(e) => return Err(Error::from_io(e)),
            }
        }

        if overflowed {
            return Err(Error::BufferError);
        }
        heapless::String::from_utf8(line).map_err(|_| Error::InvalidUtf8)
    }

    /// Release the transport.
    pub fn close(self) -> Result<(), T::Error> {
        self.transport.close().map_err(Error::Transport)
    }
}
