//! Grid cell: the fundamental unit of the display.

use crate::attrs::AttrWord;

/// Character used for blank cells unless a grid is configured otherwise.
pub const EMPTY_CHAR: char = ' ';

/// One grid position's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    content: char,
    attrs: AttrWord,
    /// True until something has been written to the cell since the last clear.
    empty: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(EMPTY_CHAR)
    }
}

impl Cell {
    /// A written cell.
    #[must_use]
    pub const fn new(content: char, attrs: AttrWord) -> Self {
        Self {
            content,
            attrs,
            empty: false,
        }
    }

    /// An empty cell showing `empty_char` with default attributes.
    #[must_use]
    pub const fn blank(empty_char: char) -> Self {
        Self {
            content: empty_char,
            attrs: AttrWord::NORMAL,
            empty: true,
        }
    }

    #[must_use]
    pub const fn content(&self) -> char {
        self.content
    }

    #[must_use]
    pub const fn attrs(&self) -> AttrWord {
        self.attrs
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether writing `(content, attrs)` would change what this cell shows.
    #[must_use]
    pub fn differs(&self, content: char, attrs: AttrWord) -> bool {
        self.content != content || self.attrs != attrs
    }
}
