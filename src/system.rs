//! The host's own instrument transports: serial ports (including USB virtual COM ports) and
//! raw SCPI sockets.

use std::{
    io,
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::Duration,
};

use fugit::MillisDurationU32;
use serialport::{SerialPort, SerialPortType};

use crate::{
    config::TransportConfig,
    error::{Error, Result},
    resource::ResourceAddress,
    transport::{ResourceManager, Transport},
};

/// [`std::io::Error`] wearing the [`embedded_io::Error`] interface.
#[derive(Debug)]
pub struct IoError(pub io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<io::Error> for IoError {
    fn from(err: io::Error) -> Self {
        IoError(err)
    }
}

impl From<serialport::Error> for IoError {
    fn from(err: serialport::Error) -> Self {
        IoError(err.into())
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            io::ErrorKind::ConnectionRefused => embedded_io::ErrorKind::ConnectionRefused,
            io::ErrorKind::ConnectionReset => embedded_io::ErrorKind::ConnectionReset,
            io::ErrorKind::ConnectionAborted => embedded_io::ErrorKind::ConnectionAborted,
            io::ErrorKind::NotConnected => embedded_io::ErrorKind::NotConnected,
            io::ErrorKind::AddrInUse => embedded_io::ErrorKind::AddrInUse,
            io::ErrorKind::AddrNotAvailable => embedded_io::ErrorKind::AddrNotAvailable,
            io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            io::ErrorKind::AlreadyExists => embedded_io::ErrorKind::AlreadyExists,
            io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            // Socket read timeouts surface as EAGAIN on Unix.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                embedded_io::ErrorKind::TimedOut
            }
            io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            io::ErrorKind::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

fn to_std_duration(timeout: MillisDurationU32) -> Duration {
    Duration::from_millis(timeout.to_millis() as u64)
}

/// An open serial port or TCP socket.
pub enum SystemTransport {
    Serial(Box<dyn SerialPort>),
    Tcp(TcpStream),
}

impl embedded_io::ErrorType for SystemTransport {
    type Error = IoError;
}

impl embedded_io::Read for SystemTransport {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        match self {
            SystemTransport::Serial(port) => io::Read::read(port, buf).map_err(IoError),
            SystemTransport::Tcp(stream) => io::Read::read(stream, buf).map_err(IoError),
        }
    }
}

impl embedded_io::Write for SystemTransport {
    fn write(&mut self, buf: &[u8]) -> core::result::Result<usize, Self::Error> {
        match self {
            SystemTransport::Serial(port) => io::Write::write(port, buf).map_err(IoError),
            SystemTransport::Tcp(stream) => io::Write::write(stream, buf).map_err(IoError),
        }
    }

    fn flush(&mut self) -> core::result::Result<(), Self::Error> {
        match self {
            SystemTransport::Serial(port) => io::Write::flush(port).map_err(IoError),
            SystemTransport::Tcp(stream) => io::Write::flush(stream).map_err(IoError),
        }
    }
}

impl Transport for SystemTransport {
    fn set_timeout(
        &mut self,
        timeout: MillisDurationU32,
    ) -> core::result::Result<(), Self::Error> {
        let timeout = to_std_duration(timeout);
        match self {
            SystemTransport::Serial(port) => port.set_timeout(timeout).map_err(IoError::from),
            SystemTransport::Tcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                Ok(())
            }
        }
    }

    fn close(self) -> core::result::Result<(), Self::Error> {
        match self {
            SystemTransport::Serial(port) => {
                drop(port);
                Ok(())
            }
            SystemTransport::Tcp(stream) => match stream.shutdown(Shutdown::Both) {
                // The instrument may already have dropped its end.
                Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
                other => other.map_err(IoError),
            },
        }
    }
}

/// Finds serial ports on this host and opens serial, USB virtual COM port and raw socket
/// resources.
///
/// USB resources are resolved to the serial port whose USB vendor id, product id and (if given)
/// serial number match; instruments without a virtual COM port interface cannot be reached.
pub struct SystemResourceManager {
    baud_rate: u32,
    open_timeout: MillisDurationU32,
    static_resources: Vec<String>,
}

impl Default for SystemResourceManager {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl SystemResourceManager {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            baud_rate: config.baud_rate,
            open_timeout: MillisDurationU32::millis(config.timeout_ms),
            static_resources: config.resources.clone(),
        }
    }

    /// Add a resource that should be listed even though it cannot be discovered.
    pub fn add_resource(&mut self, resource: impl Into<String>) {
        let resource = resource.into();
        if !self.static_resources.contains(&resource) {
            self.static_resources.push(resource);
        }
    }

    fn open_serial(&self, port: &str) -> Result<SystemTransport, IoError> {
        log::debug!("Opening serial port {port} at {} baud", self.baud_rate);
        let port = serialport::new(port, self.baud_rate)
            .timeout(to_std_duration(self.open_timeout))
            .open()
            .map_err(|e| Error::Open(IoError::from(e)))?;
        Ok(SystemTransport::Serial(port))
    }

    fn open_tcp(&self, host: &str, port: u16) -> Result<SystemTransport, IoError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| Error::Open(IoError(e)))?;

        let mut last_error =
            io::Error::new(io::ErrorKind::NotFound, format!("{host} did not resolve"));
        for addr in addrs {
            log::debug!("Connecting to {addr}");
            match TcpStream::connect_timeout(&addr, to_std_duration(self.open_timeout)) {
                Ok(stream) => {
                    stream
                        .set_nodelay(true)
                        .map_err(|e| Error::Open(IoError(e)))?;
                    return Ok(SystemTransport::Tcp(stream));
                }
                Err(e) => last_error = e,
            }
        }
        Err(Error::Open(IoError(last_error)))
    }

    fn find_usb_port(
        &self,
        vendor_id: u16,
        product_id: u16,
        serial_number: Option<&str>,
    ) -> Result<String, IoError> {
        let ports = serialport::available_ports().map_err(|e| Error::Open(IoError::from(e)))?;
        ports
            .into_iter()
            .find(|port| match &port.port_type {
                SerialPortType::UsbPort(usb) => {
                    usb.vid == vendor_id
                        && usb.pid == product_id
                        && serial_number.is_none_or(|wanted| {
                            usb.serial_number
                                .as_deref()
                                .is_some_and(|found| found.eq_ignore_ascii_case(wanted))
                        })
                }
                _ => false,
            })
            .map(|port| port.port_name)
            .ok_or_else(|| {
                Error::Open(IoError(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no USB serial port with id {vendor_id:04x}:{product_id:04x}"),
                )))
            })
    }
}

impl ResourceManager for SystemResourceManager {
    type Transport = SystemTransport;

    fn list_resources(&mut self) -> Result<Vec<String>, IoError> {
        let ports = serialport::available_ports().map_err(|e| Error::Transport(e.into()))?;
        let mut resources: Vec<String> = ports
            .into_iter()
            .map(|port| ResourceAddress::serial(port.port_name).to_string())
            .collect();
        for resource in &self.static_resources {
            if !resources.contains(resource) {
                resources.push(resource.clone());
            }
        }
        Ok(resources)
    }

    fn open(&mut self, resource: &str) -> Result<SystemTransport, IoError> {
        let address: ResourceAddress = resource
            .parse()
            .map_err(|_| Error::InvalidResource(resource.to_owned()))?;

        match address {
            ResourceAddress::Serial { port } => self.open_serial(&port),
            ResourceAddress::TcpSocket { host, port, .. } => self.open_tcp(&host, port),
            ResourceAddress::Usb {
                vendor_id,
                product_id,
                serial_number,
                ..
            } => {
                let port = self.find_usb_port(vendor_id, product_id, serial_number.as_deref())?;
                self.open_serial(&port)
            }
        }
    }

    fn close(&mut self) -> Result<(), IoError> {
        Ok(())
    }
}
