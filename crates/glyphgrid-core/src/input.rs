//! Input event schema: key codes, modifiers, resize notifications.
//!
//! Hosts deliver raw `(keycode, modifiers)` pairs; key codes are the
//! platform's numeric codes (`KeyboardEvent.which` on the web), with named
//! constants for the keys applications usually bind. Events have a stable
//! JSON encoding for record/replay.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Encoded as a compact `u8` bitset in JSON (`mods`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Numeric key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const BACKSPACE: Self = Self(8);
    pub const TAB: Self = Self(9);
    pub const ENTER: Self = Self(13);
    pub const SHIFT: Self = Self(16);
    pub const CONTROL: Self = Self(17);
    pub const ALT: Self = Self(18);
    pub const ESC: Self = Self(27);
    pub const PAGE_UP: Self = Self(33);
    pub const PAGE_DOWN: Self = Self(34);
    pub const END: Self = Self(35);
    pub const HOME: Self = Self(36);
    pub const LEFT: Self = Self(37);
    pub const UP: Self = Self(38);
    pub const RIGHT: Self = Self(39);
    pub const DOWN: Self = Self(40);
    pub const ALT_GRAPH: Self = Self(225);

    /// Code for an ASCII letter key (`'a'` and `'A'` map to the same code).
    #[must_use]
    pub const fn letter(ch: char) -> Option<Self> {
        if ch.is_ascii_alphabetic() {
            Some(Self(ch.to_ascii_uppercase() as u16))
        } else {
            None
        }
    }

    /// The letter for codes `A`..=`Z`.
    #[must_use]
    pub const fn as_letter(self) -> Option<char> {
        if self.0 >= b'A' as u16 && self.0 <= b'Z' as u16 {
            Some(self.0 as u8 as char)
        } else {
            None
        }
    }

    /// Keys that only modify other keys and are never delivered to subscribers.
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self.0, 16 | 17 | 18 | 225)
    }

    /// Stable name for logs and traces.
    #[must_use]
    pub fn name(self) -> String {
        match self {
            Self::BACKSPACE => "Backspace".to_string(),
            Self::TAB => "Tab".to_string(),
            Self::ENTER => "Enter".to_string(),
            Self::SHIFT => "Shift".to_string(),
            Self::CONTROL => "Control".to_string(),
            Self::ALT => "Alt".to_string(),
            Self::ESC => "Escape".to_string(),
            Self::PAGE_UP => "PageUp".to_string(),
            Self::PAGE_DOWN => "PageDown".to_string(),
            Self::END => "End".to_string(),
            Self::HOME => "Home".to_string(),
            Self::LEFT => "Left".to_string(),
            Self::UP => "Up".to_string(),
            Self::RIGHT => "Right".to_string(),
            Self::DOWN => "Down".to_string(),
            Self::ALT_GRAPH => "AltGraph".to_string(),
            other => match other.as_letter() {
                Some(c) => c.to_string(),
                None => format!("Key{}", other.0),
            },
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A key press delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: Modifiers,
    pub repeat: bool,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self {
            code,
            mods,
            repeat: false,
        }
    }

    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }
}

/// Subscription key for the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Key presses. getch-style consumers also receive relayouts here as
    /// [`InputEvent::Resize`], which carries no key code.
    KeyDown,
    /// Relayouts only.
    Resize,
}

/// Event payload passed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Key(KeyEvent),
    /// The display was resized to `rows` x `cols` cells.
    Resize { rows: u16, cols: u16 },
}

impl InputEvent {
    #[must_use]
    pub const fn key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(key) => Some(key),
            Self::Resize { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_resize(&self) -> bool {
        matches!(self, Self::Resize { .. })
    }

    /// Encode this event as a stable JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&InputEventJson::from(self))
    }

    /// Decode a previously encoded event JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        let json: InputEventJson = serde_json::from_str(s)?;
        Ok(Self::from(json))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum InputEventJson {
    Key {
        code: u16,
        mods: u8,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        repeat: bool,
    },
    Resize {
        rows: u16,
        cols: u16,
    },
}

impl From<&InputEvent> for InputEventJson {
    fn from(value: &InputEvent) -> Self {
        match value {
            InputEvent::Key(key) => Self::Key {
                code: key.code.0,
                mods: key.mods.bits(),
                repeat: key.repeat,
            },
            InputEvent::Resize { rows, cols } => Self::Resize {
                rows: *rows,
                cols: *cols,
            },
        }
    }
}

impl From<InputEventJson> for InputEvent {
    fn from(value: InputEventJson) -> Self {
        match value {
            InputEventJson::Key { code, mods, repeat } => Self::Key(KeyEvent {
                code: KeyCode(code),
                mods: Modifiers::from_bits_truncate(mods),
                repeat,
            }),
            InputEventJson::Resize { rows, cols } => Self::Resize { rows, cols },
        }
    }
}
