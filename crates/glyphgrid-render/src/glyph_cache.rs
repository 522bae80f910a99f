//! Paged glyph cache.
//!
//! Each distinct `(character, attribute word)` is rendered once into a page:
//! a raster strip one cell high holding a fixed number of cell-sized slots.
//! Entries are never evicted and slots never move; the cache only grows, one
//! page at a time, until [`GlyphCache::reset`] discards everything (font or
//! colour-pair change).

use crate::surface::{FontMetrics, FontSpec, GlyphSource, PixelRect, Raster, Surface};
use glyphgrid_core::{AttrWord, ColorPairTable};
use std::collections::HashMap;
use std::fmt;

/// Default number of glyph slots per page.
pub const DEFAULT_GLYPHS_PER_PAGE: u16 = 256;

/// Cache key: a character with the exact attribute word it was drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub ch: char,
    pub attrs: AttrWord,
}

/// Where a cached glyph lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphSlot {
    /// Page index.
    pub page: usize,
    /// Left edge of the slot within the page, in pixels.
    pub x_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub pages: usize,
    pub glyphs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphCacheError {
    /// The attribute word names a colour pair that was never defined.
    UndefinedPair(u8),
    /// The glyph source returned a raster of the wrong size.
    InvalidRaster {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

impl fmt::Display for GlyphCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedPair(index) => write!(f, "colour pair {index} is not defined"),
            Self::InvalidRaster { expected, actual } => write!(
                f,
                "invalid raster: got {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for GlyphCacheError {}

#[derive(Debug)]
pub struct GlyphCache {
    metrics: FontMetrics,
    glyphs_per_page: u16,
    pages: Vec<Raster>,
    // Next free slot in the last page.
    next_slot: u16,
    entries: HashMap<GlyphKey, GlyphSlot>,
    stats: GlyphCacheStats,
}

impl GlyphCache {
    /// Empty cache for cells of size `metrics`, with the default page capacity.
    #[must_use]
    pub fn new(metrics: FontMetrics) -> Self {
        Self::with_page_capacity(metrics, DEFAULT_GLYPHS_PER_PAGE)
    }

    /// Empty cache whose pages hold `glyphs_per_page` glyphs (at least one).
    #[must_use]
    pub fn with_page_capacity(metrics: FontMetrics, glyphs_per_page: u16) -> Self {
        Self {
            metrics,
            glyphs_per_page: glyphs_per_page.max(1),
            pages: Vec::new(),
            next_slot: 0,
            entries: HashMap::new(),
            stats: GlyphCacheStats::default(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    #[must_use]
    pub fn glyphs_per_page(&self) -> u16 {
        self.glyphs_per_page
    }

    #[must_use]
    pub fn stats(&self) -> GlyphCacheStats {
        self.stats
    }

    /// Number of cached glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Raster> {
        self.pages.get(index)
    }

    /// Slot of an already cached glyph. Does not touch the stats.
    #[must_use]
    pub fn get(&self, ch: char, attrs: AttrWord) -> Option<GlyphSlot> {
        self.entries.get(&GlyphKey { ch, attrs }).copied()
    }

    /// Slot for `(ch, attrs)`, rendering it on a miss.
    ///
    /// The glyph is drawn with the colours of the pair named by `attrs`
    /// (swapped under reverse video) in the bold face of `font` when `attrs`
    /// is bold. Nothing is recorded when the pair is undefined or the source
    /// returns a raster of the wrong size.
    pub fn get_or_render<G>(
        &mut self,
        ch: char,
        attrs: AttrWord,
        font: &FontSpec,
        pairs: &ColorPairTable,
        source: &G,
    ) -> Result<GlyphSlot, GlyphCacheError>
    where
        G: GlyphSource + ?Sized,
    {
        let key = GlyphKey { ch, attrs };
        if let Some(slot) = self.entries.get(&key) {
            self.stats.hits += 1;
            return Ok(*slot);
        }
        self.stats.misses += 1;

        let index = attrs.pair_number();
        let pair = pairs
            .resolve(index)
            .map_err(|_| GlyphCacheError::UndefinedPair(index))?;
        let colors = if attrs.is_reverse() {
            pair.swapped()
        } else {
            pair
        };
        let face = if attrs.is_bold() {
            font.bolded()
        } else {
            font.regular()
        };

        let raster = source.rasterize(ch, &face, self.metrics, colors);
        let expected = (
            u32::from(self.metrics.char_width),
            u32::from(self.metrics.char_height),
        );
        if raster.dims() != expected {
            return Err(GlyphCacheError::InvalidRaster {
                expected,
                actual: raster.dims(),
            });
        }

        let slot = self.alloc_slot();
        if let Some(page) = self.pages.get_mut(slot.page) {
            page.copy_from(&raster, raster.bounds(), slot.x_offset, 0);
        }
        self.entries.insert(key, slot);
        self.stats.glyphs = self.entries.len();
        Ok(slot)
    }

    /// Blit a cached glyph to `surface` with its top-left at `(dest_x, dest_y)`.
    pub fn draw<S>(&self, slot: GlyphSlot, surface: &mut S, dest_x: u32, dest_y: u32)
    where
        S: Surface + ?Sized,
    {
        if let Some(page) = self.pages.get(slot.page) {
            let src = PixelRect::new(
                slot.x_offset,
                0,
                u32::from(self.metrics.char_width),
                u32::from(self.metrics.char_height),
            );
            surface.blit(page, src, dest_x, dest_y);
        }
    }

    /// Drop every page and entry, switching to cells of size `metrics`.
    pub fn reset(&mut self, metrics: FontMetrics) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            glyphs = self.entries.len(),
            pages = self.pages.len(),
            "glyph cache reset"
        );

        self.metrics = metrics;
        self.pages.clear();
        self.next_slot = 0;
        self.entries.clear();
        self.stats.pages = 0;
        self.stats.glyphs = 0;
    }

    fn alloc_slot(&mut self) -> GlyphSlot {
        if self.pages.is_empty() || self.next_slot >= self.glyphs_per_page {
            let width = u32::from(self.glyphs_per_page) * u32::from(self.metrics.char_width);
            self.pages.push(Raster::new(width, u32::from(self.metrics.char_height)));
            self.next_slot = 0;
            self.stats.pages = self.pages.len();

            #[cfg(feature = "tracing")]
            tracing::debug!(page = self.pages.len() - 1, width, "glyph page allocated");
        }
        let slot = GlyphSlot {
            page: self.pages.len() - 1,
            x_offset: u32::from(self.next_slot) * u32::from(self.metrics.char_width),
        };
        self.next_slot += 1;
        slot
    }
}
