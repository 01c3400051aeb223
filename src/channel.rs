//! Output channel selection.
//!
//! The UDP3000S addresses a channel in two ways: most commands take the `CHn` token
//! (`:MEASure:VOLTage? CH1`), while the setpoint subsystem embeds the bare number
//! (`:SOURce1:VOLTage`). [`Channel`] renders both.

use core::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// One of the three PSU output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Channel {
    #[strum(serialize = "CH1")]
    Ch1 = 1,
    #[strum(serialize = "CH2")]
    Ch2 = 2,
    #[strum(serialize = "CH3")]
    Ch3 = 3,
}

impl Channel {
    /// The canonical `CHn` token.
    pub fn token(self) -> &'static str {
        match self {
            Channel::Ch1 => "CH1",
            Channel::Ch2 => "CH2",
            Channel::Ch3 => "CH3",
        }
    }

    /// The bare channel number, `1` to `3`.
    pub fn number(self) -> u8 {
        self as u8
    }

    fn from_number(n: i128) -> Result<Self, InvalidChannel> {
        match n {
            1 => Ok(Channel::Ch1),
            2 => Ok(Channel::Ch2),
            3 => Ok(Channel::Ch3),
            other => Err(InvalidChannel(other.to_string())),
        }
    }
}

/// Returned when a value does not name one of the three channels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Channel must be 1, 2 or 3 (or CH1, CH2, CH3), got `{0}`")]
pub struct InvalidChannel(pub String);

/// Anything that can name a channel: a [`Channel`], an integer `1..=3`, or a
/// `"CHn"` string in any case.
pub trait IntoChannel {
    fn into_channel(self) -> Result<Channel, InvalidChannel>;
}

impl IntoChannel for Channel {
    fn into_channel(self) -> Result<Channel, InvalidChannel> {
        Ok(self)
    }
}

impl IntoChannel for &str {
    fn into_channel(self) -> Result<Channel, InvalidChannel> {
        Channel::from_str(self).map_err(|_| InvalidChannel(self.to_owned()))
    }
}

impl IntoChannel for &String {
    fn into_channel(self) -> Result<Channel, InvalidChannel> {
        self.as_str().into_channel()
    }
}

impl IntoChannel for String {
    fn into_channel(self) -> Result<Channel, InvalidChannel> {
        self.as_str().into_channel()
    }
}

macro_rules! impl_into_channel_for_int {
    ($($t:ty),*) => {
        $(
            impl IntoChannel for $t {
                fn into_channel(self) -> Result<Channel, InvalidChannel> {
                    Channel::from_number(self as i128)
                }
            }

            impl TryFrom<$t> for Channel {
                type Error = InvalidChannel;
                fn try_from(value: $t) -> Result<Self, Self::Error> {
                    value.into_channel()
                }
            }
        )*
    };
}

impl_into_channel_for_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
