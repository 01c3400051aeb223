//! This module contains types relevant to the PSU's SCPI values.

use strum_macros::Display;

/// Used to be less ambiguous about whether something is on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum State {
    /// Disabled.
    #[default]
    #[strum(serialize = "OFF")]
    Off,
    /// Enabled.
    #[strum(serialize = "ON")]
    On,
}

impl State {
    /// Interpret a state query reply. Only `ON` (any case, surrounding whitespace ignored)
    /// counts as enabled; every other reply reads as [`State::Off`].
    pub fn from_reply(reply: &str) -> Self {
        State::from(reply.trim().eq_ignore_ascii_case("ON"))
    }
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// The two per-channel protection subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Protection {
    /// OVP, over-voltage protection. Level in volts.
    #[strum(serialize = "OVP")]
    OverVoltage,
    /// OCP, over-current protection. Level in amps.
    #[strum(serialize = "OCP")]
    OverCurrent,
}

/// Trip level and enable flag of one protection subsystem on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProtectionSetting {
    /// Volts for OVP, amps for OCP.
    pub level: f64,
    pub enabled: bool,
}

impl ProtectionSetting {
    pub fn new(level: f64, enabled: bool) -> Self {
        Self { level, enabled }
    }
}
