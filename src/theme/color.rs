//! RGBA colors and CSS-style color parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color string")]
    Empty,
    #[error("invalid color length {0}, expected 3, 4, 6, or 8 hex digits")]
    InvalidLength(usize),
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    #[error("invalid color function `{0}`")]
    InvalidFunction(String),
    #[error("unknown color name `{0}`")]
    UnknownName(String),
}

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`,
    /// `transparent` or a basic named color.
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return parse_rgb_function(&lower);
        }
        named(&lower).ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }

    /// Same color with alpha scaled by `opacity` (clamped to 0..=1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let alpha = (f32::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }

    pub fn opacity(self) -> f32 {
        f32::from(self.a) / 255.0
    }

    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// `#rrggbb`, dropping alpha (pair with [`Color::opacity`]).
    pub fn to_rgb_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `#rrggbb` for opaque colors, `#rrggbbaa` otherwise.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            self.to_rgb_hex()
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Relative luma on the 0..=255 scale.
    pub fn luma(self) -> f32 {
        (0.2126 * f32::from(self.r)) + (0.7152 * f32::from(self.g)) + (0.0722 * f32::from(self.b))
    }

    pub fn is_dark(self) -> bool {
        self.luma() < 140.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_hex()
    }
}

fn parse_hex(hex: &str) -> Result<Color, ColorError> {
    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(bad));
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).unwrap_or(0);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    match hex.len() {
        3 => Ok(Color::rgb(digit(0) * 17, digit(1) * 17, digit(2) * 17)),
        4 => Ok(Color::rgba(
            digit(0) * 17,
            digit(1) * 17,
            digit(2) * 17,
            digit(3) * 17,
        )),
        6 => Ok(Color::rgb(pair(0), pair(2), pair(4))),
        8 => Ok(Color::rgba(pair(0), pair(2), pair(4), pair(6))),
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// `rgb(1, 2, 3)`, `rgba(1, 2, 3, 0.5)` or `rgb(1 2 3 / 50%)`.
fn parse_rgb_function(s: &str) -> Result<Color, ColorError> {
    let invalid = || ColorError::InvalidFunction(s.to_string());
    let open = s.find('(').ok_or_else(invalid)?;
    let close = s.rfind(')').ok_or_else(invalid)?;
    if close < open {
        return Err(invalid());
    }
    let parts: Vec<&str> = s[open + 1..close]
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid());
    }

    let channel = |part: &str| -> Result<u8, ColorError> {
        if let Some(pct) = part.strip_suffix('%') {
            let value: f32 = pct.parse().map_err(|_| invalid())?;
            Ok((value.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let value: f32 = part.parse().map_err(|_| invalid())?;
            Ok(value.clamp(0.0, 255.0).round() as u8)
        }
    };
    let alpha = |part: &str| -> Result<u8, ColorError> {
        let value: f32 = match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().map_err(|_| invalid())? / 100.0,
            None => part.parse().map_err(|_| invalid())?,
        };
        Ok((value.clamp(0.0, 1.0) * 255.0).round() as u8)
    };

    let a = parts.get(3).map_or(Ok(255), |part| alpha(part))?;
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn named(name: &str) -> Option<Color> {
    let color = match name {
        "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::hex(0xff0000),
        "green" => Color::hex(0x008000),
        "lime" => Color::hex(0x00ff00),
        "blue" => Color::hex(0x0000ff),
        "yellow" => Color::hex(0xffff00),
        "orange" => Color::hex(0xffa500),
        "purple" => Color::hex(0x800080),
        "pink" => Color::hex(0xffc0cb),
        "cyan" => Color::hex(0x00ffff),
        "magenta" => Color::hex(0xff00ff),
        "gray" | "grey" => Color::hex(0x808080),
        _ => return None,
    };
    Some(color)
}
