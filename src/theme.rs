//! Graph colors: RGBA values, hex parsing, and the color set used by the render pipeline.
//!
//! All series colors come from the caller; everything else (grid, axes, text, overlays)
//! comes from a [`GraphTheme`]. The default theme matches the classic light monitoring look.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color representation. `a` is opacity (255 = opaque).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with a different opacity.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Opacity in `0.0..=1.0`.
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Parse `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
        let digits = hex.trim().trim_start_matches('#');
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ParseColorError(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColorError(hex.to_string()))
        };
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl TryFrom<String> for Rgba {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&value)
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_hex()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected RRGGBB or RRGGBBAA")]
pub struct ParseColorError(String);

/// Opacity applied to series colors (about 88%, so overlapping stacked areas stay readable).
pub const SERIES_ALPHA: u8 = 225;

/// Colors of everything that is not a series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphTheme {
    pub background: Rgba,
    pub graph: Rgba,
    pub non_work_time: Rgba,
    pub grid: Rgba,
    pub main_grid: Rgba,
    pub grid_border: Rgba,
    pub text: Rgba,
    pub highlight: Rgba,
    pub left_percentile: Rgba,
    pub right_percentile: Rgba,
    pub zero_line_left: Rgba,
    pub zero_line_right: Rgba,
    pub value_min: Rgba,
    pub value_max: Rgba,
    pub value_min_max: Rgba,
    pub trigger_opposite: Rgba,
    /// Indexed by severity 0 (not classified) ..= 5 (disaster).
    pub severity: [Rgba; 6],
}

impl Default for GraphTheme {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0xFF, 0xFF, 0xFF),
            graph: Rgba::rgb(0xFF, 0xFF, 0xFF),
            non_work_time: Rgba::rgb(0xEB, 0xEB, 0xEB),
            grid: Rgba::rgb(0xCC, 0xD5, 0xD9),
            main_grid: Rgba::rgb(0xAC, 0xBB, 0xC2),
            grid_border: Rgba::rgb(0xAC, 0xBB, 0xC2),
            text: Rgba::rgb(0x1F, 0x2C, 0x33),
            highlight: Rgba::rgb(0xE3, 0x37, 0x34),
            left_percentile: Rgba::rgb(0x42, 0x9E, 0x47),
            right_percentile: Rgba::rgb(0xE3, 0x37, 0x34),
            zero_line_left: Rgba::rgb(0xAA, 0xAA, 0xAA),
            zero_line_right: Rgba::rgb(0x88, 0x88, 0x88),
            value_min: Rgba::rgb(0x00, 0x99, 0x00),
            value_max: Rgba::rgb(0x99, 0x00, 0x00),
            value_min_max: Rgba::rgb(0xEE, 0xEE, 0xCC),
            trigger_opposite: Rgba::rgb(0x00, 0x00, 0x00),
            severity: [
                Rgba::rgb(0x97, 0xAA, 0xB3),
                Rgba::rgb(0x74, 0x99, 0xFF),
                Rgba::rgb(0xFF, 0xC8, 0x59),
                Rgba::rgb(0xFF, 0xA0, 0x59),
                Rgba::rgb(0xE9, 0x76, 0x59),
                Rgba::rgb(0xE4, 0x59, 0x59),
            ],
        }
    }
}

impl GraphTheme {
    /// Color for a trigger severity; out-of-range severities use the highest one.
    pub fn severity_color(&self, severity: u8) -> Rgba {
        self.severity[usize::from(severity).min(self.severity.len() - 1)]
    }

    pub fn percentile_color(&self, side: crate::models::AxisSide) -> Rgba {
        match side {
            crate::models::AxisSide::Left => self.left_percentile,
            crate::models::AxisSide::Right => self.right_percentile,
        }
    }

    pub fn zero_line_color(&self, side: crate::models::AxisSide) -> Rgba {
        match side {
            crate::models::AxisSide::Left => self.zero_line_left,
            crate::models::AxisSide::Right => self.zero_line_right,
        }
    }
}
