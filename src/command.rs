//! Outbound command tokens.

use std::fmt;

use crate::types::HueSaturation;

/// A single command datagram understood by the lamp.
///
/// Every command is one ASCII token without delimiters. Its [`Display`]
/// output is exactly what goes on the wire.
///
/// ```
/// use gyverlamp_rs::Command;
///
/// assert_eq!(Command::Brightness(200).to_string(), "BRI200");
/// assert_eq!(Command::Effect(3).to_string(), "EFF3");
/// assert_eq!(Command::Status.to_string(), "GET");
/// ```
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PowerOn,
    PowerOff,
    /// Brightness 0-255.
    Brightness(u8),
    /// Select an effect by wire id.
    Effect(u32),
    /// Hue on the lamp's 0-100 scale.
    Scale(u8),
    /// Saturation on the lamp's 0-255 speed.
    Speed(u8),
    /// Status query; the only command whose reply carries data.
    Status,
    /// A token sent verbatim, used for effect names the registry does not know.
    Raw(String),
}

impl Command {
    /// The `SCA`/`SPD` pair for a color.
    ///
    /// ```
    /// use gyverlamp_rs::{Command, HueSaturation};
    ///
    /// let hs = HueSaturation::create(180.0, 50.0).unwrap();
    /// assert_eq!(Command::color(&hs), [Command::Scale(50), Command::Speed(127)]);
    /// ```
    pub fn color(hs: &HueSaturation) -> [Command; 2] {
        [Command::Scale(hs.scale()), Command::Speed(hs.speed())]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PowerOn => f.write_str("P_ON"),
            Command::PowerOff => f.write_str("P_OFF"),
            Command::Brightness(value) => write!(f, "BRI{value}"),
            Command::Effect(id) => write!(f, "EFF{id}"),
            Command::Scale(value) => write!(f, "SCA{value}"),
            Command::Speed(value) => write!(f, "SPD{value}"),
            Command::Status => f.write_str("GET"),
            Command::Raw(token) => f.write_str(token),
        }
    }
}
