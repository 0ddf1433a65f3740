//! WCAG 2.0 contrast ratio between two sRGB colors.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Empty color value")]
    Empty,

    #[error("Unsupported color value: {0}")]
    Unsupported(String),
}

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance `L = 0.2126R + 0.7152G + 0.0722B` over linearized channels.
    pub fn relative_luminance(&self) -> f64 {
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    /// Accepts `#RGB`, `#RRGGBB` (leading `#` optional) and the names `black` / `white`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() {
            return Err(ColorError::Empty);
        }

        match value.to_ascii_lowercase().as_str() {
            "black" => return Ok(Color::BLACK),
            "white" => return Ok(Color::WHITE),
            _ => {}
        }

        let hex = value.strip_prefix('#').unwrap_or(value);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Unsupported(value.to_string()));
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(ColorError::Unsupported(value.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ColorError::Unsupported(value.to_string()))
        };

        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// `(L_light + 0.05) / (L_dark + 0.05)`, always >= 1.0 and symmetric in its arguments.
pub fn contrast_ratio(a: &Color, b: &Color) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (light, dark) = if la >= lb { (la, lb) } else { (lb, la) };
    (light + 0.05) / (dark + 0.05)
}

/// Parses both values then computes [`contrast_ratio`].
pub fn contrast_ratio_hex(a: &str, b: &str) -> Result<f64, ColorError> {
    let a: Color = a.parse()?;
    let b: Color = b.parse()?;
    Ok(contrast_ratio(&a, &b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_black_on_white_is_21() {
        let ratio = contrast_ratio(&Color::BLACK, &Color::WHITE);
        assert!((ratio - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_color_is_1() {
        let grey: Color = "#777777".parse().unwrap();
        assert!((contrast_ratio(&grey, &grey) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_pair() {
        // #777777 on white sits just under the AA threshold.
        let ratio = contrast_ratio_hex("#777777", "#FFFFFF").unwrap();
        assert!(ratio > 4.4 && ratio < 4.5, "ratio was {}", ratio);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("00539F".parse::<Color>().unwrap(), Color::new(0x00, 0x53, 0x9F));
        assert_eq!("Black".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!(Color::new(0, 83, 159).to_string(), "#00539F");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Color>(), Err(ColorError::Empty));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
        assert!("rgb(0,0,0)".parse::<Color>().is_err());
    }

    proptest! {
        #[test]
        fn ratio_is_bounded_and_symmetric(
            r1 in any::<u8>(), g1 in any::<u8>(), b1 in any::<u8>(),
            r2 in any::<u8>(), g2 in any::<u8>(), b2 in any::<u8>(),
        ) {
            let a = Color::new(r1, g1, b1);
            let b = Color::new(r2, g2, b2);
            let ratio = contrast_ratio(&a, &b);
            prop_assert!(ratio >= 1.0);
            prop_assert!(ratio <= 21.0 + 1e-9);
            prop_assert!((ratio - contrast_ratio(&b, &a)).abs() < 1e-12);
        }
    }
}
