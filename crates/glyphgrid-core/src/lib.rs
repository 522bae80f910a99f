#![forbid(unsafe_code)]

//! Host-agnostic character-cell display model.
//!
//! `glyphgrid-core` is the platform-independent half of glyphgrid. It owns the
//! grid of styled cells, the cursor, the set of cells changed since the last
//! flush, the attribute-word codec, the colour-pair table and input routing,
//! all without touching pixels.
//!
//! # Primary responsibilities
//!
//! - **AttrWord**: packed style flags (high 16 bits) + colour-pair index (bits 8..16).
//! - **ColorPairTable**: index → (foreground, background), pair 0 always defined.
//! - **Grid**: 2D cell matrix, cursor, active attributes and pending changes.
//! - **InputRouter**: one-shot and persistent subscriptions keyed by [`EventKind`].
//!
//! # Design principles
//!
//! - **No I/O**: pixel output lives in `glyphgrid-render`; hosts feed input events.
//! - **Deterministic**: identical call sequences produce identical pending sets.
//! - **`#![forbid(unsafe_code)]`**: safety enforced at compile time.

pub mod attrs;
pub mod cell;
pub mod color;
pub mod error;
pub mod grid;
pub mod input;
pub mod router;

pub use attrs::{AttrWord, PAIR_MASK, STYLE_MASK, StyleFlags, color_pair};
pub use cell::Cell;
pub use color::{Color, ColorPair, ColorPairTable, ParseColorError};
pub use error::{Error, Result};
pub use grid::{Advance, Grid, PendingChange};
pub use input::{EventKind, InputEvent, KeyCode, KeyEvent, Modifiers};
pub use router::{Callback, EventContext, InputRouter, Propagation, SubscriptionId};
