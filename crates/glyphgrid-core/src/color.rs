//! Colours and the colour-pair table.
//!
//! Pairs are referenced from attribute words by index, not by value, so
//! redefining a pair changes every cell that uses it the next time that cell
//! is rendered.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xCC, 0xCC, 0xCC);
    pub const RED: Self = Self::rgb(0xCC, 0x44, 0x44);
    pub const GREEN: Self = Self::rgb(0x44, 0xCC, 0x44);
    pub const YELLOW: Self = Self::rgb(0xCC, 0xCC, 0x44);
    pub const BLUE: Self = Self::rgb(0x44, 0x44, 0xCC);
    pub const MAGENTA: Self = Self::rgb(0xCC, 0x44, 0xCC);
    pub const CYAN: Self = Self::rgb(0x44, 0xCC, 0xCC);
    pub const BLACK: Self = Self::rgb(0x22, 0x22, 0x22);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque RGBA8 bytes.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }

    /// Look up one of the eight named colours (case-insensitive).
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "yellow" => Self::YELLOW,
            "blue" => Self::BLUE,
            "magenta" => Self::MAGENTA,
            "cyan" => Self::CYAN,
            "black" => Self::BLACK,
            _ => return None,
        };
        Some(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid colour {:?} (expected #RRGGBB, #RGB or a colour name)", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let Some(hex) = s.strip_prefix('#') else {
            return Self::named(s).ok_or_else(err);
        };
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |digit: &str| channel(digit).map(|v| v * 0x11);
                Ok(Self::rgb(
                    expand(&hex[0..1])?,
                    expand(&hex[1..2])?,
                    expand(&hex[2..3])?,
                ))
            }
            _ => Err(err()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A (foreground, background) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorPair {
    pub fg: Color,
    pub bg: Color,
}

impl ColorPair {
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg }
    }

    /// The pair with foreground and background exchanged (reverse video).
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            fg: self.bg,
            bg: self.fg,
        }
    }
}

impl Default for ColorPair {
    fn default() -> Self {
        Self::new(Color::WHITE, Color::BLACK)
    }
}

/// Index → colour pair. Pair 0 is always defined.
#[derive(Debug, Clone)]
pub struct ColorPairTable {
    pairs: Vec<Option<ColorPair>>,
}

impl ColorPairTable {
    /// Table holding only the default pair 0.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default(ColorPair::default())
    }

    /// Table whose pair 0 is `default`.
    #[must_use]
    pub fn with_default(default: ColorPair) -> Self {
        Self {
            pairs: vec![Some(default)],
        }
    }

    /// Insert or overwrite pair `index`, returning the previous definition.
    pub fn define(&mut self, index: u8, fg: Color, bg: Color) -> Option<ColorPair> {
        let idx = usize::from(index);
        if idx >= self.pairs.len() {
            self.pairs.resize(idx + 1, None);
        }
        self.pairs[idx].replace(ColorPair::new(fg, bg))
    }

    /// Colours for pair `index`.
    pub fn resolve(&self, index: u8) -> Result<ColorPair> {
        self.pairs
            .get(usize::from(index))
            .copied()
            .flatten()
            .ok_or(Error::UndefinedPair(index))
    }

    #[must_use]
    pub fn is_defined(&self, index: u8) -> bool {
        self.resolve(index).is_ok()
    }

    /// The default pair (index 0).
    #[must_use]
    pub fn default_pair(&self) -> ColorPair {
        self.pairs.first().copied().flatten().unwrap_or_default()
    }

    /// Number of defined pairs, including pair 0.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Defined pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, ColorPair)> + '_ {
        self.pairs
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|pair| (i as u8, pair)))
    }
}

impl Default for ColorPairTable {
    fn default() -> Self {
        Self::new()
    }
}
