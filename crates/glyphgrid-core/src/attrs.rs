//! Attribute words: style flags and colour-pair index packed into one `u32`.
//!
//! Layout (compatible with the classic curses-on-canvas encoding):
//!
//! ```text
//!  31            16 15      8 7       0
//! +----------------+---------+---------+
//! |  style flags   |  pair   | (spare) |
//! +----------------+---------+---------+
//! ```
//!
//! The low 16 bits are the colour field ([`PAIR_MASK`]); the pair number is
//! `(word & 0xFFFF) >> 8`. Anything in the high half is treated as a style
//! flag, including bits with no named [`StyleFlags`] constant, so unknown
//! flags survive enable/disable round trips.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Mask selecting the colour field of an attribute word.
pub const PAIR_MASK: u32 = 0x0000_FFFF;

/// Mask selecting the style-flag half of an attribute word.
pub const STYLE_MASK: u32 = 0xFFFF_0000;

bitflags! {
    /// Named style flags, stored in the high half of an [`AttrWord`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u32 {
        const STANDOUT  = 0x0001_0000;
        const UNDERLINE = 0x0002_0000;
        const REVERSE   = 0x0004_0000;
        const BLINK     = 0x0008_0000;
        const DIM       = 0x0010_0000;
        const BOLD      = 0x0020_0000;
    }
}

/// Packed display attributes applied to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrWord(u32);

impl AttrWord {
    pub const NORMAL: Self = Self(0);
    pub const STANDOUT: Self = Self(StyleFlags::STANDOUT.bits());
    pub const UNDERLINE: Self = Self(StyleFlags::UNDERLINE.bits());
    pub const REVERSE: Self = Self(StyleFlags::REVERSE.bits());
    pub const BLINK: Self = Self(StyleFlags::BLINK.bits());
    pub const DIM: Self = Self(StyleFlags::DIM.bits());
    pub const BOLD: Self = Self(StyleFlags::BOLD.bits());

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Attribute word selecting colour pair `index` with no style flags.
    #[must_use]
    pub const fn color_pair(index: u8) -> Self {
        Self((index as u32) << 8)
    }

    /// Colour-pair number encoded in this word (0 when unset).
    #[must_use]
    pub const fn pair_number(self) -> u8 {
        ((self.0 & PAIR_MASK) >> 8) as u8
    }

    /// Raw colour field (low 16 bits).
    #[must_use]
    pub const fn pair_field(self) -> u32 {
        self.0 & PAIR_MASK
    }

    /// Raw style half (high 16 bits), including unnamed bits.
    #[must_use]
    pub const fn style_field(self) -> u32 {
        self.0 & STYLE_MASK
    }

    /// Named style flags set in this word.
    #[must_use]
    pub const fn flags(self) -> StyleFlags {
        StyleFlags::from_bits_truncate(self.0)
    }

    #[must_use]
    pub const fn contains(self, flags: StyleFlags) -> bool {
        self.0 & flags.bits() == flags.bits()
    }

    #[must_use]
    pub const fn is_bold(self) -> bool {
        self.contains(StyleFlags::BOLD)
    }

    #[must_use]
    pub const fn is_reverse(self) -> bool {
        self.contains(StyleFlags::REVERSE)
    }

    /// Replace this word wholesale.
    pub fn set(&mut self, attrs: Self) {
        *self = attrs;
    }

    /// Turn on the style flags in `attrs`.
    ///
    /// A nonzero colour field in `attrs` replaces the current one; a zero
    /// colour field leaves the current pair in place.
    pub fn enable(&mut self, attrs: Self) {
        let pair = if attrs.pair_field() == 0 {
            self.pair_field()
        } else {
            attrs.pair_field()
        };
        self.0 = self.style_field() | attrs.style_field() | pair;
    }

    /// Turn off the style flags in `attrs`.
    ///
    /// A nonzero colour field in `attrs` resets the pair to 0, whatever pair
    /// it names.
    pub fn disable(&mut self, attrs: Self) {
        let mut bits = self.0 & !attrs.style_field();
        if attrs.pair_field() != 0 {
            bits &= !PAIR_MASK;
        }
        self.0 = bits;
    }

    /// Copy of this word with `attrs` enabled.
    #[must_use]
    pub fn enabled(mut self, attrs: Self) -> Self {
        self.enable(attrs);
        self
    }

    /// Copy of this word with `attrs` disabled.
    #[must_use]
    pub fn disabled(mut self, attrs: Self) -> Self {
        self.disable(attrs);
        self
    }
}

/// Attribute word for colour pair `index` (the `COLOR_PAIR(n)` of curses).
#[must_use]
pub const fn color_pair(index: u8) -> AttrWord {
    AttrWord::color_pair(index)
}

impl From<StyleFlags> for AttrWord {
    fn from(flags: StyleFlags) -> Self {
        Self(flags.bits())
    }
}

impl BitOr for AttrWord {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<StyleFlags> for AttrWord {
    type Output = Self;

    fn bitor(self, rhs: StyleFlags) -> Self {
        Self(self.0 | rhs.bits())
    }
}

impl BitOrAssign for AttrWord {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
