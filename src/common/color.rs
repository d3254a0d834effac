//! Color type conversions and utilities
//!
//! Provides type-safe color handling with conversions between:
//! - Hex strings (#rrggbb format)
//! - Alpha channel values (0-255)
//! - Opacity percentages (0-100)
//!
//! Toolkit-specific conversions (X11 render colors, egui colors) live next to
//! the code that draws with them.

use std::fmt;

/// Opaque RGB color shown to the user as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string:
    /// - 6 digits: RRGGBB
    /// - Optional '#' prefix supported but not required
    pub fn parse(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;

        Some(Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Opacity stored as the raw alpha channel (0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opacity(u8);

impl Opacity {
    pub fn from_alpha(alpha: u8) -> Self {
        Self(alpha)
    }

    /// Create from percentage, rounding to the nearest alpha value.
    /// Out-of-range input clamps to 0-255.
    pub fn from_percent(percent: f64) -> Self {
        if percent.is_nan() {
            return Self(0);
        }
        let alpha = (percent / 100.0 * 255.0).round().clamp(0.0, 255.0);
        Self(alpha as u8)
    }

    /// Raw alpha channel
    pub fn alpha(self) -> u8 {
        self.0
    }

    /// Opacity as a rounded percentage (0-100)
    pub fn percent(self) -> u8 {
        (self.0 as f64 / 255.0 * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_parsing() {
        assert_eq!(
            HexColor::parse("#59f7ff"),
            Some(HexColor::from_rgb(89, 247, 255))
        );
        assert_eq!(
            HexColor::parse("FF0000"),
            Some(HexColor::from_rgb(255, 0, 0))
        );
        assert_eq!(
            HexColor::parse(" #00ff7f "),
            Some(HexColor::from_rgb(0, 255, 127))
        );

        // Invalid
        assert_eq!(HexColor::parse("invalid"), None);
        assert_eq!(HexColor::parse(""), None);
        assert_eq!(HexColor::parse("#7FFF0000"), None);
    }

    #[test]
    fn test_hex_color_display_is_lowercase_and_padded() {
        assert_eq!(HexColor::from_rgb(89, 247, 255).to_string(), "#59f7ff");
        assert_eq!(HexColor::from_rgb(0, 10, 1).to_string(), "#000a01");
    }

    #[test]
    fn test_opacity_from_percent() {
        assert_eq!(Opacity::from_percent(50.0).alpha(), 128);
        assert_eq!(Opacity::from_percent(100.0).alpha(), 255);
        assert_eq!(Opacity::from_percent(0.0).alpha(), 0);

        // clamped
        assert_eq!(Opacity::from_percent(150.0).alpha(), 255);
        assert_eq!(Opacity::from_percent(-20.0).alpha(), 0);
        assert_eq!(Opacity::from_percent(f64::NAN).alpha(), 0);
    }

    #[test]
    fn test_opacity_percent() {
        assert_eq!(Opacity::from_alpha(255).percent(), 100);
        assert_eq!(Opacity::from_alpha(128).percent(), 50);
        assert_eq!(Opacity::from_alpha(0).percent(), 0);
        // 191 / 255 = 74.9%
        assert_eq!(Opacity::from_alpha(191).percent(), 75);
    }

    #[test]
    fn test_opacity_round_trip() {
        for percent in 0..=100u8 {
            let alpha = Opacity::from_percent(percent as f64).alpha();
            assert_eq!(Opacity::from_alpha(alpha).percent(), percent);
        }
    }
}
