//! Straight-alpha RGBA colours and the demo palette.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| {
            digits
                .get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        match digits.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Same colour with opacity `alpha` in `[0, 1]`.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Colour from hue in degrees, saturation and lightness in `[0, 1]`.
    #[must_use]
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Colours shared by the demo scenes.
pub mod palette {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const NIGHT: Rgba = Rgba::rgb(0x0a, 0x0a, 0x0a);
    pub const INK: Rgba = Rgba::rgb(0x1f, 0x29, 0x37);
    pub const GRID: Rgba = Rgba::rgb(0xe5, 0xe7, 0xeb);
    pub const MUTED: Rgba = Rgba::rgb(0x80, 0x80, 0x80);

    pub const BLUE: Rgba = Rgba::rgb(0x25, 0x63, 0xeb);
    pub const SKY: Rgba = Rgba::rgb(0x3b, 0x82, 0xf6);
    pub const LIGHT_BLUE: Rgba = Rgba::rgb(0x60, 0xa5, 0xfa);
    pub const RED: Rgba = Rgba::rgb(0xef, 0x44, 0x44);
    pub const LIGHT_RED: Rgba = Rgba::rgb(0xf8, 0x71, 0x71);
    pub const GREEN: Rgba = Rgba::rgb(0x10, 0xb9, 0x81);
    pub const LIME: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
    pub const AMBER: Rgba = Rgba::rgb(0xf5, 0x9e, 0x0b);
    pub const PURPLE: Rgba = Rgba::rgb(0x8b, 0x5c, 0xf6);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_alpha() {
        assert_eq!(Rgba::from_hex("#2563eb"), Some(palette::BLUE));
        assert_eq!(
            Rgba::from_hex("ef444440"),
            Some(Rgba::rgba(0xef, 0x44, 0x44, 0x40))
        );
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#zz0000"), None);
    }

    #[test]
    fn hsl_matches_primary_hues() {
        assert_eq!(Rgba::hsl(0.0, 1.0, 0.5), Rgba::rgb(255, 0, 0));
        assert_eq!(Rgba::hsl(120.0, 1.0, 0.5), Rgba::rgb(0, 255, 0));
        assert_eq!(Rgba::hsl(240.0, 1.0, 0.5), Rgba::rgb(0, 0, 255));
        assert_eq!(Rgba::hsl(0.0, 0.0, 1.0), Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(palette::RED.with_alpha(0.4).a, 102);
        assert_eq!(palette::RED.with_alpha(3.0).a, 255);
    }
}
