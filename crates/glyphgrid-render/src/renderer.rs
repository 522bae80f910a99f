//! Dirty-cell renderer.
//!
//! The renderer never scans the grid. It drains the grid's pending changes,
//! resolves each to a cached glyph and blits that glyph to the cell's pixel
//! position, in queue order, one blit per change.

use crate::error::Result;
use crate::glyph_cache::GlyphCache;
use crate::surface::{FontMetrics, FontSpec, GlyphSource, PixelRect, Surface};
use glyphgrid_core::{ColorPairTable, Grid};

/// Frame statistics returned after each flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells blitted.
    pub cells_drawn: u32,
    /// Glyphs rendered into the cache during this frame.
    pub glyph_misses: u32,
}

/// Pending-change consumer.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    frames: u64,
    last: FrameStats,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flushes that drew at least one cell.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Stats of the most recent flush.
    #[must_use]
    pub fn last_frame(&self) -> FrameStats {
        self.last
    }

    /// Draw every pending change of `grid` to `surface`.
    ///
    /// An empty pending set touches nothing. If a glyph cannot be produced,
    /// the failing change and every change after it are put back on the grid
    /// (unless the cell was rewritten meanwhile) and the error is returned;
    /// changes before it stay drawn.
    pub fn flush<G, S>(
        &mut self,
        grid: &mut Grid,
        cache: &mut GlyphCache,
        font: &FontSpec,
        pairs: &ColorPairTable,
        source: &G,
        surface: &mut S,
    ) -> Result<FrameStats>
    where
        G: GlyphSource + ?Sized,
        S: Surface + ?Sized,
    {
        let changes = grid.take_pending_changes();
        if changes.is_empty() {
            self.last = FrameStats::default();
            return Ok(self.last);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("flush", changes = changes.len()).entered();

        let metrics = cache.metrics();
        let misses_before = cache.stats().misses;
        let mut stats = FrameStats::default();

        for (i, change) in changes.iter().enumerate() {
            let slot = match cache.get_or_render(change.ch, change.attrs, font, pairs, source) {
                Ok(slot) => slot,
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        row = change.row,
                        col = change.col,
                        requeued = changes.len() - i,
                        %err,
                        "flush aborted"
                    );
                    grid.restore_pending(changes[i..].iter().copied());
                    return Err(err.into());
                }
            };
            let (x, y) = metrics.cell_origin(change.row, change.col);
            cache.draw(slot, surface, x, y);
            stats.cells_drawn += 1;
        }

        stats.glyph_misses = u32::try_from(cache.stats().misses - misses_before).unwrap_or(u32::MAX);
        self.frames += 1;
        self.last = stats;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            cells = stats.cells_drawn,
            misses = stats.glyph_misses,
            "flush complete"
        );

        Ok(stats)
    }

    /// Paint the whole surface with the background of pair 0.
    pub fn paint_background<S>(surface: &mut S, pairs: &ColorPairTable)
    where
        S: Surface + ?Sized,
    {
        let (width, height) = surface.size();
        surface.fill_rect(
            PixelRect::new(0, 0, width, height),
            pairs.default_pair().bg,
        );
    }

    /// Paint the cells of a `new_rows` x `new_cols` grid that were not part of
    /// the `old_rows` x `old_cols` grid with the background of pair 0.
    pub fn paint_exposed<S>(
        surface: &mut S,
        pairs: &ColorPairTable,
        metrics: FontMetrics,
        old: (u16, u16),
        new: (u16, u16),
    ) where
        S: Surface + ?Sized,
    {
        let bg = pairs.default_pair().bg;
        let (old_w, old_h) = metrics.grid_size(old.0, old.1);
        let (new_w, new_h) = metrics.grid_size(new.0, new.1);
        // Strip to the right of the old area, full new height.
        if new_w > old_w {
            surface.fill_rect(PixelRect::new(old_w, 0, new_w - old_w, new_h), bg);
        }
        // Strip below the old area, up to the old width.
        if new_h > old_h {
            let width = old_w.min(new_w);
            if width > 0 {
                surface.fill_rect(PixelRect::new(0, old_h, width, new_h - old_h), bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::glyph_cache::GlyphCacheError;
    use crate::procedural::ProceduralGlyphSource;
    use crate::surface::PixelSurface;
    use glyphgrid_core::{AttrWord, Color, color_pair};

    struct Fixture {
        grid: Grid,
        cache: GlyphCache,
        font: FontSpec,
        pairs: ColorPairTable,
        source: ProceduralGlyphSource,
        surface: PixelSurface,
        renderer: Renderer,
    }

    impl Fixture {
        fn new(rows: u16, cols: u16) -> Self {
            let metrics = FontMetrics::new(4, 6);
            let (w, h) = metrics.grid_size(rows, cols);
            Self {
                grid: Grid::new(rows, cols),
                cache: GlyphCache::new(metrics),
                font: FontSpec::new("mono", 4),
                pairs: ColorPairTable::new(),
                source: ProceduralGlyphSource::new(),
                surface: PixelSurface::new(w, h),
                renderer: Renderer::new(),
            }
        }

        fn flush(&mut self) -> Result<FrameStats> {
            self.renderer.flush(
                &mut self.grid,
                &mut self.cache,
                &self.font,
                &self.pairs,
                &self.source,
                &mut self.surface,
            )
        }
    }

    #[test]
    fn flush_draws_each_change_once_and_empties_pending() {
        let mut fx = Fixture::new(3, 3);
        fx.grid.write_str("AB", AttrWord::NORMAL).expect("write");
        let stats = fx.flush().expect("flush");
        assert_eq!(stats, FrameStats { cells_drawn: 2, glyph_misses: 2 });
        assert_eq!(fx.grid.pending_len(), 0);
        assert_eq!(fx.cache.len(), 2);
        assert_eq!(fx.surface.blit_count(), 2);
        assert_eq!(fx.grid.cursor(), (0, 2));
    }

    #[test]
    fn second_flush_touches_nothing() {
        let mut fx = Fixture::new(2, 2);
        fx.grid.write_str("hi", AttrWord::NORMAL).expect("write");
        fx.flush().expect("flush");
        fx.surface.reset_counters();
        let stats = fx.flush().expect("flush");
        assert_eq!(stats, FrameStats::default());
        assert_eq!(fx.surface.write_count(), 0);
        assert_eq!(fx.renderer.frames(), 1);
    }

    #[test]
    fn repeated_glyphs_hit_the_cache() {
        let mut fx = Fixture::new(1, 4);
        fx.grid.write_str("aaaa", AttrWord::NORMAL).expect("write");
        let stats = fx.flush().expect("flush");
        assert_eq!(stats.cells_drawn, 4);
        assert_eq!(stats.glyph_misses, 1);
    }

    #[test]
    fn glyph_lands_at_cell_origin() {
        let mut fx = Fixture::new(2, 3);
        fx.pairs.define(2, Color::YELLOW, Color::MAGENTA);
        fx.grid
            .write_str_at(1, 2, " ", color_pair(2) | AttrWord::BOLD)
            .expect("write");
        fx.flush().expect("flush");
        // Cell (1, 2) starts at x = 8, y = 6 with 4x6 cells.
        assert_eq!(fx.surface.pixel(8, 6), Some(Color::MAGENTA.to_rgba()));
        assert_eq!(fx.surface.pixel(11, 11), Some(Color::MAGENTA.to_rgba()));
        assert_eq!(fx.surface.pixel(7, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn failure_requeues_failing_and_later_changes() {
        let mut fx = Fixture::new(1, 3);
        fx.grid.write_char('a', AttrWord::NORMAL).expect("write");
        fx.grid.write_char('b', color_pair(4)).expect("write");
        fx.grid.write_char('c', AttrWord::NORMAL).expect("write");
        let err = fx.flush().expect_err("pair 4 undefined");
        assert_eq!(err, RenderError::Glyph(GlyphCacheError::UndefinedPair(4)));
        let left: Vec<char> = fx.grid.pending().iter().map(|c| c.ch).collect();
        assert_eq!(left, vec!['b', 'c']);
        assert_eq!(fx.surface.blit_count(), 1);

        // Defining the pair lets the retry deliver the rest.
        fx.pairs.define(4, Color::GREEN, Color::BLACK);
        let stats = fx.flush().expect("flush");
        assert_eq!(stats.cells_drawn, 2);
        assert_eq!(fx.grid.pending_len(), 0);
    }

    #[test]
    fn paint_background_uses_pair_zero() {
        let mut surface = PixelSurface::new(5, 5);
        Renderer::paint_background(&mut surface, &ColorPairTable::new());
        assert_eq!(surface.pixel(4, 4), Some(Color::BLACK.to_rgba()));
        assert_eq!(surface.fill_count(), 1);
    }

    #[test]
    fn paint_exposed_fills_only_new_cells() {
        let metrics = FontMetrics::new(2, 2);
        let mut surface = PixelSurface::new(6, 6);
        Renderer::paint_exposed(&mut surface, &ColorPairTable::new(), metrics, (2, 2), (3, 3));
        let black = Some(Color::BLACK.to_rgba());
        let blank = Some([0, 0, 0, 0]);
        assert_eq!(surface.pixel(3, 3), blank);
        assert_eq!(surface.pixel(4, 0), black);
        assert_eq!(surface.pixel(0, 4), black);
        assert_eq!(surface.pixel(5, 5), black);

        surface.reset_counters();
        Renderer::paint_exposed(&mut surface, &ColorPairTable::new(), metrics, (3, 3), (2, 2));
        assert_eq!(surface.write_count(), 0);
    }
}
