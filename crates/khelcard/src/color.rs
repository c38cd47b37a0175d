//! RGB colours used by the catalog and the card layout.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a colour from its channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// Fully opaque RGBA pixel
    #[must_use]
    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fixed palette of the card layout
pub mod palette {
    use super::Rgb;

    /// Card background
    pub const WHITE: Rgb = Rgb::from_hex(0xffffff);
    /// Outer border frame
    pub const FRAME: Rgb = Rgb::from_hex(0x667eea);
    /// Accent used when no game is selected or a custom label is set
    pub const DEFAULT_ACCENT: Rgb = Rgb::from_hex(0xff6b35);
    /// Gold (logo fallback block, middle kundli ring)
    pub const GOLD: Rgb = Rgb::from_hex(0xffd700);
    /// Brown (logo fallback glyph, outer kundli ring)
    pub const BROWN: Rgb = Rgb::from_hex(0x8b4513);
    /// Kundli interior
    pub const BLUSH: Rgb = Rgb::from_hex(0xfff5f5);
    /// Number inside the kundli
    pub const KUNDLI_NUMBER: Rgb = Rgb::from_hex(0xe74c3c);
    /// Dark body text
    pub const INK: Rgb = Rgb::from_hex(0x2c3e50);
    /// Illustration placeholder block
    pub const PLACEHOLDER: Rgb = Rgb::from_hex(0xf0f0f0);
    /// Illustration placeholder caption
    pub const CAPTION: Rgb = Rgb::from_hex(0x666666);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Rgb::from_hex(0x3498db), Rgb::new(0x34, 0x98, 0xdb));
    }

    #[test]
    fn test_display_is_css_hex() {
        assert_eq!(palette::DEFAULT_ACCENT.to_string(), "#ff6b35");
    }

    #[test]
    fn test_to_rgba_is_opaque() {
        assert_eq!(Rgb::new(1, 2, 3).to_rgba(), Rgba([1, 2, 3, 255]));
    }
}
