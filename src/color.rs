//! Hex color parsing and small interpolation helpers.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

use crate::error::AppError;

/// A flat sRGB color with every channel normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Rgba {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Builds a color from 0–255 channel values.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Rgba {
        Rgba::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Rgba, AppError> {
        let channels = hex_to_rgb(hex)?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgba::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Rgba { r: *r, g: *g, b: *b, a: *a }),
            _ => Err(AppError::ColorError(format!(
                "\"{}\" must have 3 or 4 channels",
                hex
            ))),
        }
    }
}

/// Converts a hex string into normalized channel values, two digits per channel.
pub fn hex_to_rgb(hex: &str) -> Result<Vec<f32>, AppError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.is_empty() || digits.len() % 2 != 0 || !digits.is_ascii() {
        return Err(AppError::ColorError(format!("\"{}\" is not a hex color", hex)));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| AppError::ColorError(format!("\"{}\" is not a hex color", hex)))
        })
        .collect()
}

/// Interpolation factor of `value` between `start` and `stop`.
pub fn norm(value: f32, start: f32, stop: f32) -> f32 {
    (value - start) / (stop - start)
}

/// Linear interpolation by `amt` in `0..=1`.
pub fn lerp(start: f32, stop: f32, amt: f32) -> f32 {
    start + (stop - start) * amt
}

/// Re-maps `value` from one range to another, optionally clamping to the target range.
pub fn remap(value: f32, start1: f32, stop1: f32, start2: f32, stop2: f32, clamp: bool) -> f32 {
    let mut factor = norm(value, start1, stop1);
    if clamp {
        factor = factor.clamp(0.0, 1.0);
    }
    lerp(start2, stop2, factor)
}

struct HexVisitor;

impl<'de> Visitor<'de> for HexVisitor {
    type Value = Rgba;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a hex color such as \"#5FC6A0\"")
    }

    fn visit_str<E>(self, value: &str) -> Result<Rgba, E>
    where
        E: de::Error,
    {
        Rgba::from_hex(value).map_err(E::custom)
    }
}

/// Serde hook so configuration files can spell colors as hex strings.
pub fn deserialize_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgba, D::Error> {
    deserializer.deserialize_str(HexVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn parses_rgb_hex() {
        let c = Rgba::from_hex("#FF0000").unwrap();
        assert_eq!(c, Rgba::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn parses_without_pound_and_with_alpha() {
        let c = Rgba::from_hex("00000080").unwrap();
        assert_eq!(c.r, 0.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test_case("#12345" ; "odd length")]
    #[test_case("#GG0000" ; "bad digit")]
    #[test_case("" ; "empty")]
    #[test_case("#ABCD" ; "two channels")]
    fn rejects_bad_hex(input: &str) {
        assert!(Rgba::from_hex(input).is_err());
    }

    #[test]
    fn hex_matches_u8_constructor() {
        assert_eq!(Rgba::from_hex("#5FC6A0").unwrap(), Rgba::from_u8(0x5F, 0xC6, 0xA0));
    }

    #[test]
    fn remap_interpolates_and_clamps() {
        assert_eq!(remap(5.0, 0.0, 10.0, 100.0, 200.0, false), 150.0);
        assert_eq!(remap(20.0, 0.0, 10.0, 100.0, 200.0, false), 300.0);
        assert_eq!(remap(20.0, 0.0, 10.0, 100.0, 200.0, true), 200.0);
        assert_eq!(remap(-5.0, 0.0, 10.0, 100.0, 200.0, true), 100.0);
    }

    #[test]
    fn norm_and_lerp_are_inverse() {
        let t = norm(30.0, 10.0, 50.0);
        assert_eq!(t, 0.5);
        assert_eq!(lerp(10.0, 50.0, t), 30.0);
    }
}
