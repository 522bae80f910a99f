//! Error type shared by the grid and colour-pair table.

use std::fmt;

/// Failures detected synchronously by grid and colour-pair operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Cursor or write target outside the grid extents.
    OutOfBounds { row: u16, col: u16, rows: u16, cols: u16 },
    /// A write was given something other than exactly one character.
    InvalidCharacter { len: usize },
    /// A string write reached the bottom-right edge before it was fully placed.
    ///
    /// The first `written` characters remain committed.
    Overflow { written: usize, requested: usize },
    /// Colour-pair index used before being defined.
    UndefinedPair(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                row,
                col,
                rows,
                cols,
            } => write!(f, "position ({row}, {col}) outside {rows}x{cols} grid"),
            Self::InvalidCharacter { len } => {
                write!(f, "expected exactly one character, got {len}")
            }
            Self::Overflow { written, requested } => write!(
                f,
                "not enough room to write the whole string ({written} of {requested} characters placed)"
            ),
            Self::UndefinedPair(index) => write!(f, "colour pair {index} is not defined"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T, E = Error> = std::result::Result<T, E>;
