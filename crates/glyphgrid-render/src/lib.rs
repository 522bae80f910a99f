#![forbid(unsafe_code)]

//! Pixel frontend for glyphgrid.
//!
//! Turns the cell model of `glyphgrid-core` into pixels: a paged glyph cache
//! renders each `(character, attributes)` combination once, and the renderer
//! blits cached glyphs for the cells that changed since the last refresh.
//!
//! # Layers
//!
//! - [`Surface`] / [`GlyphSource`]: what a host provides (a pixel target and a
//!   glyph rasterizer). [`PixelSurface`] and [`ProceduralGlyphSource`] are
//!   in-memory implementations for headless use.
//! - [`GlyphCache`] + [`Renderer`]: dirty-cell flush.
//! - [`Screen`]: grid, colour pairs, cache and surface behind a curses-like API.
//! - [`Session`]: a screen plus input routing (`getch`, raw mode, relayout).
//!
//! # Example
//!
//! ```
//! use glyphgrid_core::{AttrWord, Color, color_pair};
//! use glyphgrid_render::{PixelSurface, ProceduralGlyphSource, Screen, ScreenConfig};
//!
//! let config = ScreenConfig { rows: 2, cols: 12, ..ScreenConfig::default() };
//! let mut screen = Screen::new(config, PixelSurface::new(0, 0), ProceduralGlyphSource::new())?;
//! screen.init_pair(1, Color::RED, Color::BLACK);
//! screen.addstr_with(AttrWord::BOLD | color_pair(1), "hello")?;
//! let frame = screen.refresh()?;
//! assert_eq!(frame.cells_drawn, 5);
//! # Ok::<(), glyphgrid_render::RenderError>(())
//! ```

pub mod config;
pub mod error;
pub mod glyph_cache;
pub mod procedural;
pub mod renderer;
pub mod screen;
pub mod session;
pub mod surface;

pub use config::ScreenConfig;
pub use error::{RenderError, Result};
pub use glyph_cache::{
    DEFAULT_GLYPHS_PER_PAGE, GlyphCache, GlyphCacheError, GlyphCacheStats, GlyphKey, GlyphSlot,
};
pub use procedural::ProceduralGlyphSource;
pub use renderer::{FrameStats, Renderer};
pub use screen::Screen;
pub use session::Session;
pub use surface::{FontMetrics, FontSpec, GlyphSource, PixelRect, PixelSurface, Raster, Surface};
