//! Mirrored lamp state and status reply decoding.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::effects::EffectRegistry;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Local copy of the lamp's state as of the last successful poll.
///
/// Commands never touch it. The next poll confirms what a command did.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampState {
    is_on: bool,
    brightness: u8,
    hue: f64,
    saturation: f64,
    effect: Option<String>,
    available: bool,
}

impl Default for LampState {
    fn default() -> Self {
        LampState {
            is_on: false,
            brightness: 0,
            hue: 0.0,
            saturation: 0.0,
            effect: None,
            available: true,
        }
    }
}

impl LampState {
    /// Check if the lamp is on.
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Brightness 0-255.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Hue in degrees.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Saturation in percent.
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Name of the running effect, if the registry knows its id.
    pub fn effect(&self) -> Option<&str> {
        self.effect.as_deref()
    }

    /// Whether the lamp answered recently enough to be considered reachable.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Decoded state for `report`, with the effect named through `registry`.
    ///
    /// ```
    /// use gyverlamp_rs::{EffectMapping, EffectRegistry, LampState, StatusReport};
    ///
    /// let registry = EffectRegistry::build(&[], &[EffectMapping::new("Радуга", 3, false)], false, &[], false);
    /// let report = StatusReport::parse(b"x 3 120 200 80 1").unwrap();
    /// let state = LampState::from_report(&report, &registry);
    ///
    /// assert_eq!(state.effect(), Some("Радуга"));
    /// assert_eq!(state.brightness(), 120);
    /// assert!((state.saturation() - 78.43).abs() < 0.01);
    /// assert!((state.hue() - 288.0).abs() < 1e-9);
    /// assert!(state.is_on());
    /// ```
    pub fn from_report(report: &StatusReport, registry: &EffectRegistry) -> Self {
        LampState {
            is_on: report.is_on,
            brightness: report.brightness,
            hue: report.hue_scaled / 100.0 * 360.0,
            saturation: report.scale / 255.0 * 100.0,
            effect: u32::try_from(report.effect_id)
                .ok()
                .and_then(|id| registry.name(id))
                .map(String::from),
            available: true,
        }
    }

    pub(crate) fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

/// A decoded `GET` reply.
///
/// The lamp answers with six space-separated fields:
/// `<ignored> <effect id> <brightness> <scale> <hue scaled> <power>`.
///
/// The effect id is kept as the lamp sent it. Ids the registry can't hold
/// (negative ones included) just name no effect.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub effect_id: i64,
    pub brightness: u8,
    pub scale: f64,
    pub hue_scaled: f64,
    pub is_on: bool,
}

impl StatusReport {
    const FIELDS: usize = 6;

    /// Parse a raw status reply.
    ///
    /// Fails with [`Error::MalformedResponse`] on non-UTF-8 input, on fewer
    /// than six fields, or when a numeric field does not parse.
    pub fn parse(reply: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(reply)
            .map_err(|_| Error::malformed(&String::from_utf8_lossy(reply), "not utf-8"))?;
        let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        if fields.len() < Self::FIELDS {
            return Err(Error::malformed(
                text,
                &format!("expected {} fields, got {}", Self::FIELDS, fields.len()),
            ));
        }

        Ok(StatusReport {
            effect_id: parse_field(text, fields[1], "effect id")?,
            brightness: parse_field(text, fields[2], "brightness")?,
            scale: parse_finite(text, fields[3], "scale")?,
            hue_scaled: parse_finite(text, fields[4], "hue")?,
            is_on: fields[5] == "1",
        })
    }
}

fn parse_field<T: FromStr>(reply: &str, field: &str, what: &str) -> Result<T> {
    field
        .parse()
        .map_err(|_| Error::malformed(reply, &format!("invalid {what} {field:?}")))
}

fn parse_finite(reply: &str, field: &str, what: &str) -> Result<f64> {
    let value: f64 = parse_field(reply, field, what)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::malformed(reply, &format!("invalid {what} {field:?}")))
    }
}
