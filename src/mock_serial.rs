//! We use this mocking module in unit tests to emulate an instrument connection and a
//! resource manager.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use fugit::MillisDurationU32;
use thiserror::Error;

use crate::{
    error::{Error, Result},
    transport::{ResourceManager, Transport},
};

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, 512>,
    /// Buffer containing pre-configured response data to be read
    read_buffer: heapless::Vec<u8, 512>,
    /// Current position in the read buffer
    read_position: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
    /// Flag to simulate close errors
    should_error_on_close: bool,
    /// Report end of stream instead of timing out once the read buffer is exhausted
    end_of_stream: bool,
    /// Last timeout applied through [`Transport::set_timeout`]
    timeout: Option<MillisDurationU32>,
    /// Set once the port has been closed
    closed: Rc<Cell<bool>>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSerialError {
    /// Simulated timeout error
    #[error("simulated timeout")]
    Timeout,
    /// Simulated buffer overflow
    #[error("simulated buffer overflow")]
    BufferOverflow,
    /// Simulated missing resource
    #[error("simulated resource not found")]
    NotFound,
    /// Generic simulated error for testing
    #[error("simulated error")]
    SimulatedError,
}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::Timeout => embedded_io::ErrorKind::TimedOut,
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::NotFound => embedded_io::ErrorKind::NotFound,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.read_position >= self.read_buffer.len() {
            if self.end_of_stream {
                return Ok(0);
            }
            // A real port would block until its timeout expires.
            return Err(MockSerialError::Timeout);
        }

        let available_bytes = self.read_buffer.len() - self.read_position;
        let bytes_to_read = core::cmp::min(buf.len(), available_bytes);

        buf[..bytes_to_read].copy_from_slice(
            &self.read_buffer[self.read_position..self.read_position + bytes_to_read],
        );

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl Transport for MockSerial {
    fn set_timeout(
        &mut self,
        timeout: MillisDurationU32,
    ) -> core::result::Result<(), Self::Error> {
        self.timeout = Some(timeout);
        Ok(())
    }

    fn close(self) -> core::result::Result<(), Self::Error> {
        self.closed.set(true);
        if self.should_error_on_close {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            should_error_on_write: false,
            should_error_on_read: false,
            should_error_on_close: false,
            end_of_stream: false,
            timeout: None,
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Create a MockSerial that will answer with `reply`.
    pub fn replying(reply: &[u8]) -> Self {
        let mut mock = Self::new();
        mock.set_read_data(reply)
            .expect("mock reply exceeds read buffer");
        mock
    }

    /// Set the data that will be returned when read() is called
    pub fn set_read_data(&mut self, data: &[u8]) -> core::result::Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;

        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// The written data as text.
    pub fn written_text(&self) -> &str {
        core::str::from_utf8(&self.write_buffer).expect("written data is not UTF-8")
    }

    /// Clear the write buffer
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    /// Configure whether closing the port should fail with an error
    pub fn set_close_error(&mut self, should_error: bool) {
        self.should_error_on_close = should_error;
    }

    /// Configure whether an exhausted read buffer reads as end of stream
    pub fn set_end_of_stream(&mut self, end_of_stream: bool) {
        self.end_of_stream = end_of_stream;
    }

    /// The last timeout applied to this port, if any
    pub fn timeout(&self) -> Option<MillisDurationU32> {
        self.timeout
    }

    /// A handle which reads `true` once this port has been closed
    pub fn closed_flag(&self) -> Rc<Cell<bool>> {
        self.closed.clone()
    }
}

/// A resource manager over a fixed list of mock devices.
///
/// Resources registered with [`MockManager::add_unopenable`] are listed but fail to open.
pub struct MockManager {
    devices: Vec<(String, Option<MockSerial>)>,
    open_attempts: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<bool>>,
    should_error_on_list: bool,
    should_error_on_close: bool,
}

impl MockManager {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            open_attempts: Rc::new(RefCell::new(Vec::new())),
            closed: Rc::new(Cell::new(false)),
            should_error_on_list: false,
            should_error_on_close: false,
        }
    }

    pub fn add_device(&mut self, resource: &str, device: MockSerial) {
        self.devices.push((resource.to_owned(), Some(device)));
    }

    pub fn add_unopenable(&mut self, resource: &str) {
        self.devices.push((resource.to_owned(), None));
    }

    pub fn set_list_error(&mut self, should_error: bool) {
        self.should_error_on_list = should_error;
    }

    pub fn set_close_error(&mut self, should_error: bool) {
        self.should_error_on_close = should_error;
    }

    /// Every resource string passed to [`ResourceManager::open`], in order.
    pub fn open_attempts(&self) -> Rc<RefCell<Vec<String>>> {
        self.open_attempts.clone()
    }

    /// A handle which reads `true` once [`ResourceManager::close`] has been called.
    pub fn closed_flag(&self) -> Rc<Cell<bool>> {
        self.closed.clone()
    }
}

impl ResourceManager for MockManager {
    type Transport = MockSerial;

    fn list_resources(&mut self) -> Result<Vec<String>, MockSerialError> {
        if self.should_error_on_list {
            return Err(Error::Transport(MockSerialError::SimulatedError));
        }
        Ok(self.devices.iter().map(|(name, _)| name.clone()).collect())
    }

    fn open(&mut self, resource: &str) -> Result<MockSerial, MockSerialError> {
        self.open_attempts.borrow_mut().push(resource.to_owned());
        self.devices
            .iter_mut()
            .find(|(name, _)| name == resource)
            .and_then(|(_, device)| device.take())
            .ok_or(Error::Open(MockSerialError::NotFound))
    }

    fn close(&mut self) -> Result<(), MockSerialError> {
        self.closed.set(true);
        if self.should_error_on_close {
            return Err(Error::Transport(MockSerialError::SimulatedError));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error as _, Read, Write};

    #[test]
    fn test_new_mock_serial() {
        let mock = MockSerial::new();
        assert_eq!(mock.written_data().len(), 0);
        assert_eq!(mock.read_position, 0);
        assert!(!mock.should_error_on_write);
        assert!(!mock.should_error_on_read);
        assert_eq!(mock.timeout(), None);
    }

    #[test]
    fn test_write_multiple_times() {
        let mut mock = MockSerial::new();
        mock.write(b"*IDN").unwrap();
        mock.write(b"?\n").unwrap();
        assert_eq!(mock.written_text(), "*IDN?\n");

        mock.clear_written_data();
        assert!(mock.written_data().is_empty());
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockSerial::new();
        let large_data = vec![0u8; 600];
        assert_eq!(mock.write(&large_data), Err(MockSerialError::BufferOverflow));
    }

    #[test]
    fn test_read_partial_data() {
        let mut mock = MockSerial::replying(b"Long response data");

        let mut buffer = [0u8; 5];
        assert_eq!(mock.read(&mut buffer), Ok(5));
        assert_eq!(&buffer, b"Long ");
    }

    #[test]
    fn test_read_times_out_after_data_exhausted() {
        let mut mock = MockSerial::replying(b"Hi");
        let mut buffer = [0u8; 10];

        assert_eq!(mock.read(&mut buffer), Ok(2));
        assert_eq!(mock.read(&mut buffer), Err(MockSerialError::Timeout));

        mock.set_end_of_stream(true);
        assert_eq!(mock.read(&mut buffer), Ok(0));
    }

    #[test]
    fn test_error_flags() {
        let mut mock = MockSerial::replying(b"data");
        let mut buffer = [0u8; 10];

        mock.set_write_error(true);
        assert!(mock.write(b"test").is_err());
        assert!(mock.flush().is_err());
        mock.set_write_error(false);
        assert!(mock.write(b"test").is_ok());

        mock.set_read_error(true);
        assert!(mock.read(&mut buffer).is_err());
        mock.set_read_error(false);
        assert!(mock.read(&mut buffer).is_ok());
    }

    #[test]
    fn test_close_sets_flag() {
        let mut mock = MockSerial::new();
        mock.set_close_error(true);
        let closed = mock.closed_flag();
        assert_eq!(Transport::close(mock), Err(MockSerialError::SimulatedError));
        assert!(closed.get());
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockSerialError::Timeout.kind(),
            embedded_io::ErrorKind::TimedOut
        ));
        assert!(matches!(
            MockSerialError::NotFound.kind(),
            embedded_io::ErrorKind::NotFound
        ));
        assert!(matches!(
            MockSerialError::SimulatedError.kind(),
            embedded_io::ErrorKind::Other
        ));
    }

    #[test]
    fn test_manager_open_once() {
        let mut manager = MockManager::new();
        manager.add_device("ASRL1::INSTR", MockSerial::new());
        manager.add_unopenable("ASRL2::INSTR");

        assert_eq!(
            manager.list_resources().unwrap(),
            vec!["ASRL1::INSTR".to_owned(), "ASRL2::INSTR".to_owned()]
        );
        assert!(manager.open("ASRL1::INSTR").is_ok());
        assert!(matches!(manager.open("ASRL1::INSTR"), Err(Error::Open(_))));
        assert!(matches!(manager.open("ASRL2::INSTR"), Err(Error::Open(_))));
        assert_eq!(manager.open_attempts().borrow().len(), 3);
    }
}
