//! RGBA colors and the shell palette.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIME_GREEN: Color = Color::rgb(50, 205, 50);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const DARK_GREY: Color = Color::rgb(169, 169, 169);
    pub const DIM_GREY: Color = Color::rgb(105, 105, 105);

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color scaled towards black by `factor` (0.0 = black, 1.0 = unchanged).
    pub fn dimmed(self, factor: f32) -> Self {
        let f = factor.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * f) as u8,
            g: (self.g as f32 * f) as u8,
            b: (self.b as f32 * f) as u8,
            a: self.a,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}'", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts `#rrggbb`, `#rrggbbaa`, or one of the named palette colors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            let channel = |i: usize| {
                hex.get(i..i + 2)
                    .and_then(|c| u8::from_str_radix(c, 16).ok())
                    .ok_or_else(|| ParseColorError(s.to_string()))
            };
            return match hex.len() {
                6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
                8 => Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
                _ => Err(ParseColorError(s.to_string())),
            };
        }
        match trimmed.to_ascii_lowercase().replace(' ', "").as_str() {
            "black" => Ok(Color::BLACK),
            "white" => Ok(Color::WHITE),
            "limegreen" => Ok(Color::LIME_GREEN),
            "red" => Ok(Color::RED),
            "darkgrey" | "darkgray" => Ok(Color::DARK_GREY),
            "dimgrey" | "dimgray" => Ok(Color::DIM_GREY),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
