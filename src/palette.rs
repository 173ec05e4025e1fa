//! Badge color palettes.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::color::{deserialize_hex, Rgba};
use crate::error::AppError;

/// Every color a badge is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Palette {
    #[serde(deserialize_with = "deserialize_hex")]
    pub background: Rgba,
    /// Company label and rule.
    #[serde(deserialize_with = "deserialize_hex")]
    pub text: Rgba,
    /// Background texture glyphs.
    #[serde(deserialize_with = "deserialize_hex")]
    pub pattern: Rgba,
    #[serde(deserialize_with = "deserialize_hex")]
    pub name: Rgba,
    #[serde(deserialize_with = "deserialize_hex")]
    pub shine: Rgba,
    #[serde(deserialize_with = "deserialize_hex")]
    pub shade: Rgba,
}

const TAN: Rgba = Rgba::rgb(1.0, 237.0 / 255.0, 216.0 / 255.0);
const GREEN_BLACK: Rgba = Rgba::rgb(30.0 / 255.0, 48.0 / 255.0, 18.0 / 255.0);
const BLACK_COOL: Rgba = Rgba::rgb(33.0 / 255.0, 31.0 / 255.0, 33.0 / 255.0);
const PINK_HOT: Rgba = Rgba::rgb(253.0 / 255.0, 73.0 / 255.0, 159.0 / 255.0);
const BROWN_DARK: Rgba = Rgba::rgb(62.0 / 255.0, 37.0 / 255.0, 42.0 / 255.0);
const BROWN: Rgba = Rgba::rgb(103.0 / 255.0, 39.0 / 255.0, 40.0 / 255.0);
const BLUE: Rgba = Rgba::rgb(13.0 / 255.0, 187.0 / 255.0, 214.0 / 255.0);

/// The built-in palettes, in their canonical order.
pub fn builtin_palettes() -> Vec<(String, Palette)> {
    vec![
        (
            "cinammon".to_string(),
            Palette {
                background: Rgba::from_u8(0xe8, 0xcd, 0xe9),
                text: Rgba::from_u8(0xa6, 0x21, 0x16),
                pattern: Rgba::from_u8(0xa6, 0x21, 0x16),
                name: Rgba::from_u8(0xea, 0x33, 0x23),
                shine: Rgba::WHITE,
                shade: Rgba::from_u8(0x7d, 0x1d, 0x17),
            },
        ),
        (
            "watermelon".to_string(),
            Palette {
                background: Rgba::from_u8(0x5F, 0xC6, 0xA0),
                text: GREEN_BLACK,
                pattern: TAN,
                name: Rgba::rgb(1.0, 0.0, 0.0),
                shine: Rgba::WHITE,
                shade: BROWN_DARK,
            },
        ),
        (
            "juicy".to_string(),
            Palette {
                background: Rgba::from_u8(0x8D, 0xD9, 0x51),
                text: GREEN_BLACK,
                pattern: TAN,
                name: PINK_HOT,
                shine: Rgba::WHITE,
                shade: BROWN_DARK,
            },
        ),
        (
            "taffy".to_string(),
            Palette {
                background: BLUE,
                text: BLACK_COOL,
                pattern: TAN,
                name: PINK_HOT,
                shine: Rgba::WHITE,
                shade: BROWN_DARK,
            },
        ),
        (
            "bubblegum".to_string(),
            Palette {
                background: PINK_HOT,
                text: BLACK_COOL,
                pattern: Rgba::from_u8(255, 225, 46),
                name: Rgba::from_u8(242, 184, 197),
                shine: Rgba::WHITE,
                shade: Rgba::from_u8(0x17, 0x38, 0x8C),
            },
        ),
        (
            "sherbet".to_string(),
            Palette {
                background: Rgba::from_u8(0xF9, 0xA8, 0x66),
                text: BLACK_COOL,
                pattern: TAN,
                name: BLUE,
                shine: Rgba::WHITE,
                shade: BROWN,
            },
        ),
        (
            "primary".to_string(),
            Palette {
                background: Rgba::from_u8(0xFF, 0xE1, 0x2E),
                text: BLACK_COOL,
                pattern: BLUE,
                name: Rgba::rgb(1.0, 0.0, 0.0),
                shine: Rgba::WHITE,
                shade: BROWN,
            },
        ),
    ]
}

/// Named palettes available to a run.
#[derive(Debug, Clone)]
pub struct PaletteSet {
    palettes: Vec<(String, Palette)>,
}

impl Default for PaletteSet {
    fn default() -> PaletteSet {
        PaletteSet {
            palettes: builtin_palettes(),
        }
    }
}

impl PaletteSet {
    /// Adds a palette, replacing any existing palette with the same name.
    pub fn insert(&mut self, name: &str, palette: Palette) {
        match self.palettes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = palette,
            None => self.palettes.push((name.to_string(), palette)),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Palette, AppError> {
        self.palettes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .ok_or_else(|| AppError::PaletteError(format!("{} (available: {})", name, self.names().join(", "))))
    }

    pub fn names(&self) -> Vec<&str> {
        self.palettes.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Picks a palette uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> (&str, &Palette) {
        // builtins are never removed, so the set is never empty
        let (name, palette) = self
            .palettes
            .choose(rng)
            .unwrap_or(&self.palettes[0]);
        (name.as_str(), palette)
    }
}
