use core::str::FromStr;

use fugit::MillisDurationU32;

use crate::{
    channel::IntoChannel,
    command::Command,
    error::{Error, Result},
    session::{DEFAULT_TIMEOUT, Session},
    system::{IoError, SystemResourceManager},
    transport::{ResourceManager, TransportError},
    types::{Protection, ProtectionSetting, State},
};

/// You can create a Udp3000s from any [`ResourceManager`], which is kept alongside the open
/// resource and released with it in [`Self::close`].
///
/// Channels may be given as a [`Channel`](crate::channel::Channel), as `1`..=`3`, or as
/// `"CH1"`..`"CH3"` in any case. An invalid channel fails before anything is sent.
///
/// For its methods, "set" writes a setting and "get" queries one back or reads a measurement.
pub struct Udp3000s<M: ResourceManager, const L: usize = 256> {
    session: Session<M::Transport, L>,
    manager: M,
}

impl Udp3000s<SystemResourceManager> {
    /// Open `resource` through the host's own transports with the default 2 s timeout.
    pub fn connect(resource: &str) -> Result<Self, IoError> {
        Self::open(SystemResourceManager::default(), resource)
    }
}

impl<M: ResourceManager, const L: usize> Udp3000s<M, L> {
    /// Open `resource` through `manager` with the default 2 s timeout.
    pub fn open(manager: M, resource: &str) -> Result<Self, TransportError<M>> {
        Self::open_with_timeout(manager, resource, DEFAULT_TIMEOUT)
    }

    /// Open `resource` through `manager`, with `\n` termination both ways and the given timeout.
    pub fn open_with_timeout(
        mut manager: M,
        resource: &str,
        timeout: MillisDurationU32,
    ) -> Result<Self, TransportError<M>> {
        let session = Session::open(&mut manager, resource, timeout)?;
        Ok(Self { session, manager })
    }

    /// Release the instrument, then the resource manager.
    ///
    /// A failure to release the instrument is returned, but the manager is released regardless
    /// and its own failure is ignored.
    pub fn close(self) -> Result<(), TransportError<M>> {
        let Self {
            session,
            mut manager,
        } = self;
        let result = session.close();
        if let Err(e) = manager.close() {
            log::debug!("Ignoring resource manager close failure: {e}");
        }
        result
    }

    pub fn session(&self) -> &Session<M::Transport, L> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<M::Transport, L> {
        &mut self.session
    }

    /// Return the trimmed `*IDN?` reply: manufacturer, model, serial number, firmware.
    pub fn idn(&mut self) -> Result<String, TransportError<M>> {
        self.query_raw(Command::Identify)
    }

    /// Enable/disable a channel's output.
    pub fn set_output(
        &mut self,
        ch: impl IntoChannel,
        state: impl Into<State>,
    ) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.session.write(Command::SetOutput(ch, state.into()))
    }

    /// Set a channel's voltage setpoint in volts.
    pub fn set_voltage(&mut self, ch: impl IntoChannel, volts: f64) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.send_setpoint(Command::SetVoltage(ch, volts))
    }

    /// Set a channel's current limit in amps.
    pub fn set_current(&mut self, ch: impl IntoChannel, amps: f64) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.send_setpoint(Command::SetCurrent(ch, amps))
    }

    /// Return a channel's measured output voltage in volts.
    pub fn get_voltage(&mut self, ch: impl IntoChannel) -> Result<f64, TransportError<M>> {
        let ch = ch.into_channel()?;
        self.query_parsed(Command::MeasureVoltage(ch))
    }

    /// Return a channel's measured output current in amps.
    pub fn get_current(&mut self, ch: impl IntoChannel) -> Result<f64, TransportError<M>> {
        let ch = ch.into_channel()?;
        self.query_parsed(Command::MeasureCurrent(ch))
    }

    /// Return a channel's measured `(volts, amps)`, read one after the other.
    pub fn get_v_i(&mut self, ch: impl IntoChannel) -> Result<(f64, f64), TransportError<M>> {
        let ch = ch.into_channel()?;
        let volts = self.get_voltage(ch)?;
        let amps = self.get_current(ch)?;
        Ok((volts, amps))
    }

    pub fn set_ovp_level(&mut self, ch: impl IntoChannel, volts: f64) -> Result<(), TransportError<M>> {
        self.set_protection_level(Protection::OverVoltage, ch, volts)
    }

    pub fn get_ovp_level(&mut self, ch: impl IntoChannel) -> Result<f64, TransportError<M>> {
        self.get_protection_level(Protection::OverVoltage, ch)
    }

    pub fn set_ovp_state(
        &mut self,
        ch: impl IntoChannel,
        state: impl Into<State>,
    ) -> Result<(), TransportError<M>> {
        self.set_protection_state(Protection::OverVoltage, ch, state)
    }

    pub fn get_ovp_state(&mut self, ch: impl IntoChannel) -> Result<bool, TransportError<M>> {
        self.get_protection_state(Protection::OverVoltage, ch)
    }

    pub fn set_ocp_level(&mut self, ch: impl IntoChannel, amps: f64) -> Result<(), TransportError<M>> {
        self.set_protection_level(Protection::OverCurrent, ch, amps)
    }

    pub fn get_ocp_level(&mut self, ch: impl IntoChannel) -> Result<f64, TransportError<M>> {
        self.get_protection_level(Protection::OverCurrent, ch)
    }

    pub fn set_ocp_state(
        &mut self,
        ch: impl IntoChannel,
        state: impl Into<State>,
    ) -> Result<(), TransportError<M>> {
        self.set_protection_state(Protection::OverCurrent, ch, state)
    }

    pub fn get_ocp_state(&mut self, ch: impl IntoChannel) -> Result<bool, TransportError<M>> {
        self.get_protection_state(Protection::OverCurrent, ch)
    }

    /// Set over-voltage protection level (volts) and enable state together.
    pub fn set_ovp(
        &mut self,
        ch: impl IntoChannel,
        setting: ProtectionSetting,
    ) -> Result<(), TransportError<M>> {
        self.set_protection(Protection::OverVoltage, ch, setting)
    }

    pub fn get_ovp(&mut self, ch: impl IntoChannel) -> Result<ProtectionSetting, TransportError<M>> {
        self.get_protection(Protection::OverVoltage, ch)
    }

    /// Set over-current protection level (amps) and enable state together.
    pub fn set_ocp(
        &mut self,
        ch: impl IntoChannel,
        setting: ProtectionSetting,
    ) -> Result<(), TransportError<M>> {
        self.set_protection(Protection::OverCurrent, ch, setting)
    }

    pub fn get_ocp(&mut self, ch: impl IntoChannel) -> Result<ProtectionSetting, TransportError<M>> {
        self.get_protection(Protection::OverCurrent, ch)
    }

    pub fn set_protection_level(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
        level: f64,
    ) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.send_setpoint(Command::SetProtectionLevel(kind, ch, level))
    }

    pub fn get_protection_level(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
    ) -> Result<f64, TransportError<M>> {
        let ch = ch.into_channel()?;
        self.query_parsed(Command::GetProtectionLevel(kind, ch))
    }

    pub fn set_protection_state(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
        state: impl Into<State>,
    ) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.session
            .write(Command::SetProtectionState(kind, ch, state.into()))
    }

    /// Only an `ON` reply (any case) reads as enabled.
    pub fn get_protection_state(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
    ) -> Result<bool, TransportError<M>> {
        let ch = ch.into_channel()?;
        let reply = self
            .session
            .query(Command::GetProtectionState(kind, ch))?;
        Ok(State::from_reply(&reply).into())
    }

    /// Write the level, then the enable state.
    pub fn set_protection(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
        setting: ProtectionSetting,
    ) -> Result<(), TransportError<M>> {
        let ch = ch.into_channel()?;
        self.set_protection_level(kind, ch, setting.level)?;
        self.set_protection_state(kind, ch, setting.enabled)
    }

    /// Query the level, then the enable state.
    pub fn get_protection(
        &mut self,
        kind: Protection,
        ch: impl IntoChannel,
    ) -> Result<ProtectionSetting, TransportError<M>> {
        let ch = ch.into_channel()?;
        let level = self.get_protection_level(kind, ch)?;
        let enabled = self.get_protection_state(kind, ch)?;
        Ok(ProtectionSetting { level, enabled })
    }

    /// Send an arbitrary SCPI command.
    pub fn write_raw(&mut self, command: impl core::fmt::Display) -> Result<(), TransportError<M>> {
        self.session.write(command)
    }

    /// Send an arbitrary SCPI query and return the trimmed reply.
    pub fn query_raw(&mut self, command: impl core::fmt::Display) -> Result<String, TransportError<M>> {
        let reply = self.session.query(command)?;
        Ok(reply.trim().to_owned())
    }

    fn send_setpoint(&mut self, command: Command) -> Result<(), TransportError<M>> {
        if let Some(value) = command.value() {
            if !value.is_finite() {
                return Err(Error::InvalidValue(value));
            }
        }
        self.session.write(command)
    }

    fn query_parsed<V: FromStr>(&mut self, command: Command) -> Result<V, TransportError<M>> {
        let reply = self.session.query(command)?;
        let reply = reply.trim();
        reply
            .parse()
            .map_err(|_| Error::InvalidResponse(reply.to_owned()))
    }
}
