//! VISA resource strings.
//!
//! Only the address forms the system backend can actually reach are understood:
//!
//! | Form | Example |
//! |---|---|
//! | Serial | `ASRL/dev/ttyACM0::INSTR`, `ASRLCOM3::INSTR`, `ASRL1::INSTR` |
//! | Raw TCP socket | `TCPIP0::192.168.1.20::5025::SOCKET` |
//! | USB | `USB0::0x0483::0x5740::ADP3423060093::INSTR` |
//!
//! Prefixes and suffixes are matched case-insensitively, as VISA does.

use core::{fmt, str::FromStr};

use thiserror::Error;

/// A parsed resource string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAddress {
    Serial {
        /// OS path or name of the port.
        port: String,
    },
    TcpSocket {
        board: u16,
        host: String,
        port: u16,
    },
    Usb {
        board: u16,
        vendor_id: u16,
        product_id: u16,
        serial_number: Option<String>,
        /// USB interface number, only given alongside a serial number.
        interface: Option<u16>,
    },
}

/// Returned for resource strings that are malformed or name an unsupported interface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported resource string `{0}`")]
pub struct UnsupportedResource(pub String);

impl ResourceAddress {
    /// Resource string for a serial port, as listed by the system resource manager.
    pub fn serial(port: impl Into<String>) -> Self {
        ResourceAddress::Serial { port: port.into() }
    }
}

/// Split `TCPIP0` into `("TCPIP", 0)`; a missing board number means board 0.
fn split_board(head: &str, interface: &str) -> Option<u16> {
    let (prefix, board) = head.split_at_checked(interface.len())?;
    if !prefix.eq_ignore_ascii_case(interface) {
        return None;
    }
    if board.is_empty() {
        Some(0)
    } else {
        board.parse().ok()
    }
}

fn parse_id(field: &str) -> Option<u16> {
    match field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => field.parse().ok(),
    }
}

fn serial_port_name(port: &str) -> String {
    if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
        if cfg!(windows) {
            format!("COM{port}")
        } else {
            format!("/dev/ttyS{port}")
        }
    } else {
        port.to_owned()
    }
}

impl FromStr for ResourceAddress {
    type Err = UnsupportedResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || UnsupportedResource(s.to_owned());
        let fields: Vec<&str> = s.trim().split("::").collect();
        let head = fields.first().copied().unwrap_or_default();
        let suffix = fields.last().copied().unwrap_or_default();

        if head.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("ASRL")) {
            if fields.len() != 2 || !suffix.eq_ignore_ascii_case("INSTR") || head.len() == 4 {
                return Err(unsupported());
            }
            return Ok(ResourceAddress::serial(serial_port_name(&head[4..])));
        }

        if let Some(board) = split_board(head, "TCPIP") {
            if fields.len() != 4 || !suffix.eq_ignore_ascii_case("SOCKET") || fields[1].is_empty() {
                return Err(unsupported());
            }
            let port = fields[2].parse().map_err(|_| unsupported())?;
            return Ok(ResourceAddress::TcpSocket {
                board,
                host: fields[1].to_owned(),
                port,
            });
        }

        if let Some(board) = split_board(head, "USB") {
            if !(4..=6).contains(&fields.len()) || !suffix.eq_ignore_ascii_case("INSTR") {
                return Err(unsupported());
            }
            let vendor_id = parse_id(fields[1]).ok_or_else(unsupported)?;
            let product_id = parse_id(fields[2]).ok_or_else(unsupported)?;
            let serial_number = match fields.len() {
                4 => None,
                _ => Some(fields[3].to_owned()),
            };
            let interface = match fields.len() {
                6 => Some(fields[4].parse().map_err(|_| unsupported())?),
                _ => None,
            };
            return Ok(ResourceAddress::Usb {
                board,
                vendor_id,
                product_id,
                serial_number,
                interface,
            });
        }

        Err(unsupported())
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceAddress::Serial { port } => write!(f, "ASRL{port}::INSTR"),
            ResourceAddress::TcpSocket { board, host, port } => {
                write!(f, "TCPIP{board}::{host}::{port}::SOCKET")
            }
            ResourceAddress::Usb {
                board,
                vendor_id,
                product_id,
                serial_number,
                interface,
            } => {
                write!(f, "USB{board}::0x{vendor_id:04X}::0x{product_id:04X}")?;
                if let Some(serial) = serial_number {
                    write!(f, "::{serial}")?;
                }
                if let Some(interface) = interface {
                    write!(f, "::{interface}")?;
                }
                f.write_str("::INSTR")
            }
        }
    }
}
