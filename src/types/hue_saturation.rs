//! Hue and Saturation color representation.

use serde::{Deserialize, Serialize};

/// Hue and Saturation color representation.
///
/// - Hue: The color angle on the color wheel (0-360 degrees)
/// - Saturation: The intensity of the color (0-100 percent)
///
/// The lamp has no notion of either. Hue travels over the wire as a 0-100
/// "scale" and saturation as a 0-255 "speed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HueSaturationFields")]
pub struct HueSaturation {
    hue: f64,
    saturation: f64,
}

#[derive(Deserialize)]
struct HueSaturationFields {
    hue: f64,
    saturation: f64,
}

impl TryFrom<HueSaturationFields> for HueSaturation {
    type Error = String;

    fn try_from(fields: HueSaturationFields) -> Result<Self, Self::Error> {
        HueSaturation::create(fields.hue, fields.saturation).ok_or_else(|| {
            format!(
                "hue {} or saturation {} out of range",
                fields.hue, fields.saturation
            )
        })
    }
}

impl HueSaturation {
    /// Create a new HueSaturation with the given values.
    ///
    /// Returns `None` if values are outside valid ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyverlamp_rs::HueSaturation;
    ///
    /// assert!(HueSaturation::create(0.0, 100.0).is_some());
    /// assert!(HueSaturation::create(120.5, 50.0).is_some());
    /// assert!(HueSaturation::create(361.0, 50.0).is_none());
    /// assert!(HueSaturation::create(180.0, 101.0).is_none());
    /// assert!(HueSaturation::create(f64::NAN, 10.0).is_none());
    /// ```
    pub fn create(hue: f64, saturation: f64) -> Option<Self> {
        if (0.0..=360.0).contains(&hue) && (0.0..=100.0).contains(&saturation) {
            Some(HueSaturation { hue, saturation })
        } else {
            None
        }
    }

    /// Get the hue value.
    pub fn hue(&self) -> f64 {
        self.hue
    }

    /// Get the saturation value.
    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Hue mapped onto the lamp's 0-100 scale, rounding half to even.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyverlamp_rs::HueSaturation;
    ///
    /// assert_eq!(HueSaturation::create(180.0, 0.0).unwrap().scale(), 50);
    /// assert_eq!(HueSaturation::create(360.0, 0.0).unwrap().scale(), 100);
    /// // 45 degrees lands on 12.5
    /// assert_eq!(HueSaturation::create(45.0, 0.0).unwrap().scale(), 12);
    /// ```
    pub fn scale(&self) -> u8 {
        (self.hue / 360.0 * 100.0).round_ties_even() as u8
    }

    /// Saturation mapped onto the lamp's 0-255 speed, truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyverlamp_rs::HueSaturation;
    ///
    /// assert_eq!(HueSaturation::create(0.0, 50.0).unwrap().speed(), 127);
    /// assert_eq!(HueSaturation::create(0.0, 100.0).unwrap().speed(), 255);
    /// ```
    pub fn speed(&self) -> u8 {
        (self.saturation / 100.0 * 255.0) as u8
    }
}
