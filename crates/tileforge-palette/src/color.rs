#![forbid(unsafe_code)]

//! 24-bit RGB colors and palette entries.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

/// A 24-bit RGB color packed as `0xRRGGBB`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Color(u32);

impl Color {
    /// Pure black, also the filler for empty palette slots.
    pub const BLACK: Self = Self(0);

    /// Magenta, the conventional transparency key.
    pub const MAGENTA: Self = Self(0xff00ff);

    /// Build from a packed value; bits above the low 24 are dropped.
    #[must_use]
    pub const fn new(packed: u32) -> Self {
        Self(packed & 0x00ff_ffff)
    }

    /// Build from channels.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// The packed `0xRRGGBB` value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Split into `(red, green, blue)`.
    #[must_use]
    pub const fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// The channel-wise complement.
    #[must_use]
    pub const fn inverted(self) -> Self {
        Self(!self.0 & 0x00ff_ffff)
    }

    /// Parse `#rrggbb`.
    ///
    /// # Errors
    ///
    /// [`PaletteError::InvalidHex`] for anything else.
    pub fn from_hex(hex: &str) -> Result<Self, PaletteError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| PaletteError::InvalidHex(hex.to_string()))?;
        u32::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| PaletteError::InvalidHex(hex.to_string()))
    }

    /// Format as `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:06x})", self.0)
    }
}

impl FromStr for Color {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

/// One palette slot: a color and how many pixels currently use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColorData {
    pub color: Color,
    pub usage_count: u32,
}

impl ColorData {
    #[must_use]
    pub const fn new(color: Color, usage_count: u32) -> Self {
        Self { color, usage_count }
    }

    /// True when no pixel uses this entry.
    #[must_use]
    pub const fn is_unused(&self) -> bool {
        self.usage_count == 0
    }
}

/// An unused black slot.
pub const EMPTY_COLOR: ColorData = ColorData::new(Color::BLACK, 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_round_trip() {
        let c = Color::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(c.raw(), 0x123456);
        assert_eq!(c.rgb(), (0x12, 0x34, 0x56));
    }

    #[test]
    fn new_masks_high_bits() {
        assert_eq!(Color::new(0xff12_3456).raw(), 0x123456);
    }

    #[test]
    fn hex_parse_and_format() {
        let c: Color = "#ff00ff".parse().unwrap();
        assert_eq!(c, Color::MAGENTA);
        assert_eq!(c.to_hex(), "#ff00ff");
        assert_eq!(Color::new(0xa).to_string(), "#00000a");
    }

    #[test]
    fn hex_rejects_malformed() {
        for bad in ["ff00ff", "#ff00f", "#ff00ffa", "#gg0000", "#+fffff", ""] {
            assert!(
                matches!(Color::from_hex(bad), Err(PaletteError::InvalidHex(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn inverted_is_complement() {
        assert_eq!(Color::BLACK.inverted(), Color::new(0xffffff));
        assert_eq!(Color::MAGENTA.inverted(), Color::new(0x00ff00));
    }

    #[test]
    fn debug_shows_hex() {
        assert_eq!(format!("{:?}", Color::new(0x0a0b0c)), "Color(#0a0b0c)");
    }

    #[test]
    fn empty_color_is_unused_black() {
        assert!(EMPTY_COLOR.is_unused());
        assert_eq!(EMPTY_COLOR.color, Color::BLACK);
    }
}
