//! Effects built into the lamp firmware.

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// The firmware's built-in effects, in the order of their wire ids.
///
/// Used as the effect list when the configuration does not provide one.
///
/// # Examples
///
/// ```
/// use gyverlamp_rs::DefaultEffect;
///
/// assert_eq!(DefaultEffect::Rainbow.id(), 9);
/// assert_eq!(DefaultEffect::Rainbow.to_string(), "Радуга");
/// assert_eq!(DefaultEffect::names().len(), 18);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum DefaultEffect {
    #[strum(serialize = "Конфетти")]
    Confetti = 0,
    #[strum(serialize = "Огонь")]
    Fire = 1,
    #[strum(serialize = "Радуга вертикальная")]
    RainbowVertical = 2,
    #[strum(serialize = "Радуга горизонтальная")]
    RainbowHorizontal = 3,
    #[strum(serialize = "Смена цвета")]
    ColorCycle = 4,
    #[strum(serialize = "Безумие")]
    Madness = 5,
    #[strum(serialize = "Облака")]
    Clouds = 6,
    #[strum(serialize = "Лава")]
    Lava = 7,
    #[strum(serialize = "Плазма")]
    Plasma = 8,
    #[strum(serialize = "Радуга")]
    Rainbow = 9,
    #[strum(serialize = "Павлин")]
    Peacock = 10,
    #[strum(serialize = "Зебра")]
    Zebra = 11,
    #[strum(serialize = "Лес")]
    Forest = 12,
    #[strum(serialize = "Океан")]
    Ocean = 13,
    #[strum(serialize = "Цвет")]
    Color = 14,
    #[strum(serialize = "Снег")]
    Snow = 15,
    #[strum(serialize = "Матрица")]
    Matrix = 16,
    #[strum(serialize = "Светлячки")]
    Fireflies = 17,
}

impl DefaultEffect {
    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Display names of every built-in effect, ordered by id.
    pub fn names() -> Vec<String> {
        DefaultEffect::iter().map(|effect| effect.to_string()).collect()
    }
}
