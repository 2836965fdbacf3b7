//! RGB triples for text fill and stroke
//!
//! Colors arrive from JSON as `[r, g, b]` integer arrays and from the command
//! line as `#RGB`, `#RRGGBB` or `r,g,b`. Components are not range-checked on
//! input; they are clamped to `0..=255` when converted to pixels.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3 or 6 hex chars after #)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// Comma form without exactly three integer components
    #[error("expected three comma-separated integers, got '{0}'")]
    InvalidComponents(String),
}

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [i32; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Rgb([r, g, b])
    }

    /// Convert to an RGBA pixel, clamping each component into `0..=255`.
    pub fn to_rgba(self, alpha: u8) -> Rgba<u8> {
        let [r, g, b] = self.0.map(|c| c.clamp(0, 255) as u8);
        Rgba([r, g, b, alpha])
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl From<[i32; 3]> for Rgb {
    fn from(value: [i32; 3]) -> Self {
        Rgb(value)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "({}, {}, {})", r, g, b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
    }
}

/// Parse a color from `#RGB`, `#RRGGBB` or `r,g,b`.
///
/// ```
/// use pjsk_sticker::color::{parse_color, Rgb};
///
/// assert_eq!(parse_color("#F00").unwrap(), Rgb::new(255, 0, 0));
/// assert_eq!(parse_color("#33ccbb").unwrap(), Rgb::new(0x33, 0xcc, 0xbb));
/// assert_eq!(parse_color("255, 255, 255").unwrap(), Rgb::WHITE);
/// ```
pub fn parse_color(s: &str) -> Result<Rgb, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    parse_component_list(s)
}

/// Parse the digits of a hex color (without the leading '#')
fn parse_hex_color(hex: &str) -> Result<Rgb, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<i32> = hex.chars().filter_map(|c| c.to_digit(16)).map(|d| d as i32).collect();
    match digits.len() {
        // #RGB -> #RRGGBB (doubled digits)
        3 => Ok(Rgb::new(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
        6 => Ok(Rgb::new(
            digits[0] * 16 + digits[1],
            digits[2] * 16 + digits[3],
            digits[4] * 16 + digits[5],
        )),
        len => Err(ColorError::InvalidLength(len)),
    }
}

fn parse_component_list(s: &str) -> Result<Rgb, ColorError> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ColorError::InvalidComponents(s.to_string()));
    }
    let mut out = [0i32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| ColorError::InvalidComponents(s.to_string()))?;
    }
    Ok(Rgb(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_short() {
        assert_eq!(parse_color("#0F0").unwrap(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_parse_hex_long_mixed_case() {
        assert_eq!(parse_color("#FfA500").unwrap(), Rgb::new(255, 165, 0));
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert_eq!(parse_color("#GG0000"), Err(ColorError::InvalidHex('G')));
        assert_eq!(parse_color("#FFFF"), Err(ColorError::InvalidLength(4)));
    }

    #[test]
    fn test_parse_components() {
        assert_eq!(parse_color("10,20,30").unwrap(), Rgb::new(10, 20, 30));
        assert!(matches!(parse_color("10,20"), Err(ColorError::InvalidComponents(_))));
        assert!(matches!(parse_color("a,b,c"), Err(ColorError::InvalidComponents(_))));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_color("  "), Err(ColorError::Empty));
    }

    #[test]
    fn test_to_rgba_clamps() {
        assert_eq!(Rgb::new(300, -5, 128).to_rgba(255), Rgba([255, 0, 128, 255]));
    }

    #[test]
    fn test_serde_as_array() {
        let rgb: Rgb = serde_json::from_str("[51, 204, 187]").unwrap();
        assert_eq!(rgb, Rgb::new(51, 204, 187));
        assert_eq!(serde_json::to_string(&rgb).unwrap(), "[51,204,187]");
    }
}
