//! This module defines the SCPI command set of the UDP3000S PSUs.
//!
//! Each [`Command`] is a pure formatter: its [`Display`](core::fmt::Display) output is the
//! exact text sent to the instrument, minus the line terminator.

use core::fmt;

use crate::{
    channel::Channel,
    types::{Protection, State},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// __Q__ - `*IDN?`, manufacturer, model, serial number and firmware version.
    Identify,
    /// __W__ - `:OUTPut:STATe CHn, ON|OFF`.
    SetOutput(Channel, State),
    /// __W__ - `:SOURcen:VOLTage v.vvv`, voltage setpoint in volts.
    SetVoltage(Channel, f64),
    /// __W__ - `:SOURcen:CURRent a.aaa`, current limit in amps.
    SetCurrent(Channel, f64),
    /// __Q__ - `:MEASure:VOLTage? CHn`, measured output voltage.
    MeasureVoltage(Channel),
    /// __Q__ - `:MEASure:CURRent? CHn`, measured output current.
    MeasureCurrent(Channel),
    /// __W__ - `:OUTPut:OVP|OCP:VALue CHn, x.xxx`.
    SetProtectionLevel(Protection, Channel, f64),
    /// __Q__ - `:OUTPut:OVP|OCP:VALue? CHn`.
    GetProtectionLevel(Protection, Channel),
    /// __W__ - `:OUTPut:OVP|OCP:STATe CHn, ON|OFF`.
    SetProtectionState(Protection, Channel, State),
    /// __Q__ - `:OUTPut:OVP|OCP:STATe? CHn`.
    GetProtectionState(Protection, Channel),
}

impl Command {
    /// The numeric argument, if this command carries one.
    pub fn value(&self) -> Option<f64> {
        match self {
            Command::SetVoltage(_, v)
            | Command::SetCurrent(_, v)
            | Command::SetProtectionLevel(_, _, v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Identify => f.write_str("*IDN?"),
            Command::SetOutput(ch, state) => write!(f, ":OUTPut:STATe {ch}, {state}"),
            Command::SetVoltage(ch, volts) => {
                write!(f, ":SOURce{}:VOLTage {volts:.3}", ch.number())
            }
            Command::SetCurrent(ch, amps) => {
                write!(f, ":SOURce{}:CURRent {amps:.3}", ch.number())
            }
            Command::MeasureVoltage(ch) => write!(f, ":MEASure:VOLTage? {ch}"),
            Command::MeasureCurrent(ch) => write!(f, ":MEASure:CURRent? {ch}"),
            Command::SetProtectionLevel(kind, ch, level) => {
                write!(f, ":OUTPut:{kind}:VALue {ch}, {level:.3}")
            }
            Command::GetProtectionLevel(kind, ch) => write!(f, ":OUTPut:{kind}:VALue? {ch}"),
            Command::SetProtectionState(kind, ch, state) => {
                write!(f, ":OUTPut:{kind}:STATe {ch}, {state}")
            }
            Command::GetProtectionState(kind, ch) => write!(f, ":OUTPut:{kind}:STATe? {ch}"),
        }
    }
}
