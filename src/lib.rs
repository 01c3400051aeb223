//! This crate provides an interface for controlling the UNI-T UDP3000S series of programmable
//! power supplies over SCPI, plus a scanner which lists connected instruments.
//!
//! Example PSU model numbers which this should work with:
//! * UDP3305S
//! * UDP3305S-E
//! * UDP3303S
//!
//! Instruments are addressed by VISA-style resource strings. The built-in
//! [`SystemResourceManager`](system::SystemResourceManager) reaches:
//! * Serial ports, `ASRL/dev/ttyACM0::INSTR`. The UDP3000S enumerates as a USB virtual COM port.
//! * USB virtual COM ports by id, `USB0::0x0483::0x5740::<serial>::INSTR`.
//! * Raw SCPI sockets, `TCPIP0::<host>::5025::SOCKET`.
//!
//! Any other transport can be plugged in by implementing [`transport::ResourceManager`] and
//! [`transport::Transport`] over an [`embedded_io`] byte stream.
//!
//! Every command is newline terminated in both directions, and every query waits for exactly one
//! reply line, up to a 2000 ms timeout by default.
//!
//! ```no_run
//! use udp3000s_psu::psu::Udp3000s;
//!
//! let mut psu = Udp3000s::connect("ASRL/dev/ttyACM0::INSTR")?;
//! println!("{}", psu.idn()?);
//! psu.set_voltage(1, 5.0)?;
//! psu.set_current(1, 0.5)?;
//! psu.set_output(1, true)?;
//! let (volts, amps) = psu.get_v_i(1)?;
//! println!("CH1: {volts:.3} V, {amps:.3} A");
//! psu.set_output(1, false)?;
//! psu.close()?;
//! # Ok::<(), udp3000s_psu::error::Error<udp3000s_psu::system::IoError>>(())
//! ```

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod psu;
pub mod resource;
pub mod scan;
pub mod session;
pub mod system;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_serial;
