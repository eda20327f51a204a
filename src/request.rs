//! Turn-on requests and their translation into commands.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::effects::EffectRegistry;
use crate::types::HueSaturation;

/// Attributes to apply when turning a lamp on.
///
/// Every attribute is optional. An empty request just powers the lamp on
/// (and, with random effects enabled, picks an effect).
///
/// ```
/// use gyverlamp_rs::{HueSaturation, TurnOnRequest};
///
/// let mut request = TurnOnRequest::new();
/// request.brightness(200);
/// request.effect("Огонь");
/// request.hue_saturation(&HueSaturation::create(90.0, 40.0).unwrap());
/// assert!(!request.is_empty());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TurnOnFields")]
pub struct TurnOnRequest {
    pub(crate) brightness: Option<u8>,
    pub(crate) effect: Option<String>,
    pub(crate) hue_saturation: Option<HueSaturation>,
}

// Deserialized requests go through the setters so zero and empty stay unset.
#[derive(Deserialize)]
struct TurnOnFields {
    brightness: Option<u8>,
    effect: Option<String>,
    hue_saturation: Option<HueSaturation>,
}

impl From<TurnOnFields> for TurnOnRequest {
    fn from(fields: TurnOnFields) -> Self {
        let mut request = TurnOnRequest::new();
        if let Some(brightness) = fields.brightness {
            request.brightness(brightness);
        }
        if let Some(effect) = &fields.effect {
            request.effect(effect);
        }
        if let Some(hs) = &fields.hue_saturation {
            request.hue_saturation(hs);
        }
        request
    }
}

impl TurnOnRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the brightness (0-255). Zero counts as unset.
    pub fn brightness(&mut self, brightness: u8) {
        self.brightness = Some(brightness).filter(|b| *b > 0);
    }

    /// Select an effect by name, or pass a raw token the registry does not
    /// know. An empty string counts as unset.
    pub fn effect(&mut self, effect: &str) {
        self.effect = Some(effect.to_string()).filter(|e| !e.is_empty());
    }

    pub fn hue_saturation(&mut self, hs: &HueSaturation) {
        self.hue_saturation = Some(*hs);
    }

    pub fn is_empty(&self) -> bool {
        self.brightness.is_none() && self.effect.is_none() && self.hue_saturation.is_none()
    }

    /// Commands for this request, in send order.
    ///
    /// Brightness goes first, then the effect, then color. `P_ON` is
    /// appended only when the lamp is believed to be off.
    ///
    /// ```
    /// use gyverlamp_rs::{Command, EffectRegistry, TurnOnRequest};
    ///
    /// let registry = EffectRegistry::default();
    /// let mut request = TurnOnRequest::new();
    /// request.brightness(200);
    ///
    /// assert_eq!(
    ///     request.commands(&registry, false),
    ///     vec![Command::Brightness(200), Command::PowerOn]
    /// );
    /// assert_eq!(request.commands(&registry, true), vec![Command::Brightness(200)]);
    /// ```
    pub fn commands(&self, registry: &EffectRegistry, is_on: bool) -> Vec<Command> {
        self.commands_with(registry, is_on, &mut rand::thread_rng())
    }

    /// Like [`commands`](Self::commands), drawing a random effect from `rng`.
    pub fn commands_with<R: Rng + ?Sized>(
        &self,
        registry: &EffectRegistry,
        is_on: bool,
        rng: &mut R,
    ) -> Vec<Command> {
        let mut commands = Vec::with_capacity(5);

        if let Some(brightness) = self.brightness {
            commands.push(Command::Brightness(brightness));
        }

        match &self.effect {
            Some(effect) => commands.push(match registry.resolve(effect) {
                Ok(id) => Command::Effect(id),
                Err(_) => Command::Raw(effect.clone()),
            }),
            None => {
                if let Some(id) = registry.pick_random_with(rng) {
                    commands.push(Command::Effect(id));
                }
            }
        }

        if let Some(hs) = &self.hue_saturation {
            commands.extend(Command::color(hs));
        }

        if !is_on {
            commands.push(Command::PowerOn);
        }

        commands
    }
}

impl From<&HueSaturation> for TurnOnRequest {
    fn from(hs: &HueSaturation) -> Self {
        let mut r = TurnOnRequest::new();
        r.hue_saturation(hs);
        r
    }
}
