//! Lamp configuration as supplied by the host integration.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, formats::PreferMany, serde_as};

use crate::effects::EffectRegistry;
use crate::errors::Error;
use crate::types::DefaultEffect;

type Result<T> = std::result::Result<T, Error>;

/// Name used when the configuration does not provide one.
pub const DEFAULT_NAME: &str = "Gyver Lamp Ex";

/// Complete configuration of a single lamp.
///
/// Keys follow the host integration's schema, so a config block can be
/// deserialized as-is:
///
/// ```
/// use gyverlamp_rs::LampConfig;
///
/// let config = LampConfig::from_json(r#"{
///     "host": "192.168.1.50",
///     "effects": ["Огонь", "Радуга"],
///     "effects_map": [{"name": "Лава", "id": 7, "random": true}],
///     "use_random_effect": true
/// }"#).unwrap();
///
/// assert_eq!(config.name(), "Gyver Lamp Ex");
/// assert_eq!(config.effects_map[0].id, 7);
/// assert!(!config.include_all_effect_to_random);
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LampConfig {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Effect names by wire id. `None` means the firmware defaults.
    #[serde_as(as = "Option<OneOrMany<_, PreferMany>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<String>>,
    #[serde(default)]
    pub effects_map: Vec<EffectMapping>,
    #[serde(default)]
    pub use_random_effect: bool,
    #[serde(default)]
    pub include_all_effect_to_random: bool,
    #[serde(default)]
    pub random_effects: Vec<String>,
}

impl LampConfig {
    /// Configuration for `host` with every option at its default.
    pub fn new(host: &str) -> Self {
        LampConfig {
            host: host.to_string(),
            name: None,
            effects: None,
            effects_map: Vec::new(),
            use_random_effect: false,
            include_all_effect_to_random: false,
            random_effects: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    pub fn address(&self) -> DeviceAddress {
        DeviceAddress::new(&self.host)
    }

    /// The configured effect list, or the firmware's built-in one.
    pub fn effect_names(&self) -> Vec<String> {
        self.effects.clone().unwrap_or_else(DefaultEffect::names)
    }

    pub fn registry(&self) -> EffectRegistry {
        EffectRegistry::build(
            &self.effect_names(),
            &self.effects_map,
            self.include_all_effect_to_random,
            &self.random_effects,
            self.use_random_effect,
        )
    }
}

/// A user-supplied effect id override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectMapping {
    #[serde(default = "EffectMapping::default_name")]
    pub name: String,
    #[serde(default)]
    pub id: u32,
    /// Whether the effect may be picked when no effect is requested.
    #[serde(default)]
    pub random: bool,
}

impl EffectMapping {
    pub fn new(name: &str, id: u32, random: bool) -> Self {
        EffectMapping {
            name: name.to_string(),
            id,
            random,
        }
    }

    fn default_name() -> String {
        String::from("none")
    }
}

/// Network location of a lamp. The port is fixed by the firmware.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceAddress {
    host: String,
}

impl DeviceAddress {
    pub const PORT: u16 = 8888;

    pub fn new(host: &str) -> Self {
        DeviceAddress {
            host: host.to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for DeviceAddress {
    /// Formats as `host:port`, bracketing bare IPv6 literals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(f, "[{}]:{}", self.host, Self::PORT)
        } else {
            write!(f, "{}:{}", self.host, Self::PORT)
        }
    }
}

/// Static device description surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub manufacturer: &'static str,
    pub model: &'static str,
}

impl DeviceInfo {
    pub const GYVER_LAMP: DeviceInfo = DeviceInfo {
        manufacturer: "@AlexGyver",
        model: "GyverLamp",
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = LampConfig::from_json(r#"{"host": "10.0.0.7"}"#).unwrap();
        assert_eq!(config, LampConfig::new("10.0.0.7"));
        assert_eq!(config.effect_names(), DefaultEffect::names());
    }

    #[test]
    fn test_missing_host() {
        assert!(matches!(
            LampConfig::from_json(r#"{"name": "Kitchen"}"#),
            Err(Error::JsonLoad(_))
        ));
    }

    #[test]
    fn test_single_effect_becomes_list() {
        let config = LampConfig::from_json(r#"{"host": "h", "effects": "Огонь"}"#).unwrap();
        assert_eq!(config.effect_names(), vec!["Огонь".to_string()]);
    }

    #[test]
    fn test_empty_effect_list_is_kept() {
        let config = LampConfig::from_json(r#"{"host": "h", "effects": []}"#).unwrap();
        assert!(config.effect_names().is_empty());
    }

    #[test]
    fn test_mapping_defaults() {
        let config = LampConfig::from_json(r#"{"host": "h", "effects_map": [{}]}"#).unwrap();
        assert_eq!(config.effects_map, vec![EffectMapping::new("none", 0, false)]);
    }

    #[test]
    fn test_address_format() {
        assert_eq!(DeviceAddress::new("192.168.1.5").to_string(), "192.168.1.5:8888");
        assert_eq!(DeviceAddress::new("lamp.local").to_string(), "lamp.local:8888");
        assert_eq!(DeviceAddress::new("fe80::1").to_string(), "[fe80::1]:8888");
    }

    #[test]
    fn test_custom_name() {
        let mut config = LampConfig::new("h");
        config.name = Some(String::from("Bedroom"));
        assert_eq!(config.name(), "Bedroom");
    }
}
