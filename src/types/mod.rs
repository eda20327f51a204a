//! Value types for lamp control parameters.

mod effect;
mod hue_saturation;

pub use effect::DefaultEffect;
pub use hue_saturation::HueSaturation;
