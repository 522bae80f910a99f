//! Root display surface.
//!
//! A [`Screen`] ties one [`Grid`] to the pixels that show it: the colour-pair
//! table, the glyph cache, the renderer, the output [`Surface`] and the
//! [`GlyphSource`] glyphs are drawn with. Writes only touch the grid;
//! [`Screen::refresh`] pushes them to the surface. [`Screen::clear`] and
//! resizing paint immediately.

use crate::config::ScreenConfig;
use crate::error::Result;
use crate::glyph_cache::GlyphCache;
use crate::renderer::{FrameStats, Renderer};
use crate::surface::{FontMetrics, FontSpec, GlyphSource, Surface};
use glyphgrid_core::{Advance, AttrWord, Color, ColorPair, ColorPairTable, Grid};

pub struct Screen<S, G> {
    grid: Grid,
    pairs: ColorPairTable,
    cache: GlyphCache,
    renderer: Renderer,
    surface: S,
    source: G,
    font: FontSpec,
    metrics: FontMetrics,
    config: ScreenConfig,
}

impl<S: Surface, G: GlyphSource> Screen<S, G> {
    /// Build a screen from `config`, sizing `surface` to fit the grid and
    /// painting it with the default background.
    pub fn new(config: ScreenConfig, mut surface: S, source: G) -> Result<Self> {
        config.validate()?;
        let font = config.font();
        let metrics = FontMetrics::measure(&source, &font);
        let (width, height) = metrics.grid_size(config.rows, config.cols);
        surface.resize(width, height);

        let mut screen = Self {
            grid: Grid::with_empty_char(config.rows, config.cols, config.empty_char),
            pairs: ColorPairTable::with_default(config.default_pair),
            cache: GlyphCache::with_page_capacity(metrics, config.glyphs_per_page),
            renderer: Renderer::new(),
            surface,
            source,
            font,
            metrics,
            config,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = screen.config.rows,
            cols = screen.config.cols,
            char_width = metrics.char_width,
            char_height = metrics.char_height,
            "screen created"
        );

        screen.clear();
        Ok(screen)
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pairs(&self) -> &ColorPairTable {
        &self.pairs
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn source(&self) -> &G {
        &self.source
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn rows(&self) -> u16 {
        self.grid.rows()
    }

    pub fn cols(&self) -> u16 {
        self.grid.cols()
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.grid.cursor()
    }

    // ── Raw mode ────────────────────────────────────────────────────

    /// Suppress host key defaults unless a subscriber allows them.
    pub fn raw(&mut self) {
        self.config.raw = true;
    }

    /// Let host key defaults through unless a subscriber suppresses them.
    pub fn noraw(&mut self) {
        self.config.raw = false;
    }

    pub fn is_raw(&self) -> bool {
        self.config.raw
    }

    // ── Attributes ──────────────────────────────────────────────────

    pub fn attrs(&self) -> AttrWord {
        self.grid.attrs()
    }

    pub fn attrset(&mut self, attrs: AttrWord) {
        self.grid.set_attrs(attrs);
    }

    pub fn attron(&mut self, attrs: AttrWord) {
        self.grid.enable_attrs(attrs);
    }

    pub fn attroff(&mut self, attrs: AttrWord) {
        self.grid.disable_attrs(attrs);
    }

    /// Define colour pair `index`.
    ///
    /// Redefining a pair that already existed empties the glyph cache so
    /// later renders use the new colours. Cells already drawn keep their
    /// pixels until they are written again.
    pub fn init_pair(&mut self, index: u8, fg: Color, bg: Color) -> Option<ColorPair> {
        let previous = self.pairs.define(index, fg, bg);
        if previous.is_some_and(|p| p != ColorPair::new(fg, bg)) && !self.cache.is_empty() {
            self.cache.reset(self.metrics);
        }
        previous
    }

    // ── Output ──────────────────────────────────────────────────────

    pub fn move_to(&mut self, row: u16, col: u16) -> Result<()> {
        Ok(self.grid.move_to(row, col)?)
    }

    /// Write `ch` at the cursor with the active attributes.
    pub fn addch(&mut self, ch: char) -> Result<Advance> {
        let attrs = self.grid.attrs();
        Ok(self.grid.write_char(ch, attrs)?)
    }

    /// Write a one-character string at the cursor with the active attributes.
    pub fn add_symbol(&mut self, symbol: &str) -> Result<Advance> {
        let attrs = self.grid.attrs();
        Ok(self.grid.write_symbol(symbol, attrs)?)
    }

    pub fn addch_at(&mut self, row: u16, col: u16, ch: char) -> Result<Advance> {
        self.move_to(row, col)?;
        self.addch(ch)
    }

    /// Write `s` at the cursor with the active attributes.
    pub fn addstr(&mut self, s: &str) -> Result<usize> {
        let attrs = self.grid.attrs();
        Ok(self.grid.write_str(s, attrs)?)
    }

    pub fn addstr_at(&mut self, row: u16, col: u16, s: &str) -> Result<usize> {
        self.move_to(row, col)?;
        self.addstr(s)
    }

    /// `attron(attrs)`, write `s`, `attroff(attrs)`.
    ///
    /// The attributes are turned off again even when the write fails.
    pub fn addstr_with(&mut self, attrs: AttrWord, s: &str) -> Result<usize> {
        self.attron(attrs);
        let written = self.addstr(s);
        self.attroff(attrs);
        written
    }

    /// Draw every pending change.
    pub fn refresh(&mut self) -> Result<FrameStats> {
        self.renderer.flush(
            &mut self.grid,
            &mut self.cache,
            &self.font,
            &self.pairs,
            &self.source,
            &mut self.surface,
        )
    }

    /// Blank the grid and paint the whole surface with pair 0's background
    /// right away.
    pub fn clear(&mut self) {
        self.grid.clear();
        Renderer::paint_background(&mut self.surface, &self.pairs);
    }

    // ── Geometry ────────────────────────────────────────────────────

    /// Resize the grid and surface.
    ///
    /// Pixels of the surviving cells are kept; newly exposed cells are
    /// painted with pair 0's background.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        let old = (self.grid.rows(), self.grid.cols());
        if old == (rows, cols) {
            return;
        }
        self.grid.resize(rows, cols);
        let (width, height) = self.metrics.grid_size(rows, cols);
        self.surface.resize(width, height);
        Renderer::paint_exposed(&mut self.surface, &self.pairs, self.metrics, old, (rows, cols));
        self.config.rows = rows;
        self.config.cols = cols;
    }

    /// Grid size for a container of `px_width` x `px_height` pixels.
    ///
    /// Axes without auto sizing keep their current extent; auto-sized axes
    /// get as many whole cells as fit, but never fewer than the minimum.
    pub fn fit_to(&self, px_width: u32, px_height: u32) -> (u16, u16) {
        let (fit_rows, fit_cols) = self.metrics.cells_in(px_width, px_height);
        let rows = if self.config.auto_height {
            fit_rows.max(self.config.min_height)
        } else {
            self.grid.rows()
        };
        let cols = if self.config.auto_width {
            fit_cols.max(self.config.min_width)
        } else {
            self.grid.cols()
        };
        (rows, cols)
    }

    /// Switch fonts.
    ///
    /// Cell metrics are re-derived, the glyph cache is emptied, the surface is
    /// resized and repainted, and every written cell is queued for the next
    /// refresh.
    pub fn set_font(&mut self, font: FontSpec) {
        let metrics = FontMetrics::measure(&self.source, &font);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            family = %font.family,
            size_px = font.size_px,
            char_width = metrics.char_width,
            char_height = metrics.char_height,
            "font changed"
        );

        self.config.font_family = font.family.clone();
        self.config.font_size = font.size_px;
        self.font = font.regular();
        self.metrics = metrics;
        self.cache.reset(metrics);
        let (width, height) = metrics.grid_size(self.grid.rows(), self.grid.cols());
        self.surface.resize(width, height);
        Renderer::paint_background(&mut self.surface, &self.pairs);
        self.grid.invalidate();
    }
}

impl<S, G> std::fmt::Debug for Screen<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("rows", &self.grid.rows())
            .field("cols", &self.grid.cols())
            .field("cursor", &self.grid.cursor())
            .field("pending", &self.grid.pending_len())
            .field("font", &self.font)
            .field("metrics", &self.metrics)
            .field("glyphs", &self.cache.len())
            .finish()
    }
}
