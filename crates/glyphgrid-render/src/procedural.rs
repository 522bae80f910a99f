//! Deterministic procedural glyphs.
//!
//! Stands in for a real font rasterizer in headless hosts, tests and
//! benches: every non-blank character gets a stable pattern derived from its
//! code point, framed by a one-pixel border so coverage is easy to assert on.

use crate::surface::{FontMetrics, FontSpec, GlyphSource, Raster};
use glyphgrid_core::ColorPair;

/// [`GlyphSource`] that draws hash patterns instead of font outlines.
///
/// The advance of every character is `round(size_px * 0.6)`, so all faces are
/// monospace. Bold faces thicken each stroke by one pixel to the right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProceduralGlyphSource;

impl ProceduralGlyphSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GlyphSource for ProceduralGlyphSource {
    fn measure(&self, _ch: char, font: &FontSpec) -> u16 {
        let advance = (u32::from(font.size_px) * 3 + 2) / 5;
        u16::try_from(advance).unwrap_or(u16::MAX)
    }

    fn rasterize(&self, ch: char, font: &FontSpec, metrics: FontMetrics, colors: ColorPair) -> Raster {
        let w = u32::from(metrics.char_width);
        let h = u32::from(metrics.char_height);
        let mut raster = Raster::filled(w, h, colors.bg);
        if ch.is_whitespace() || ch.is_control() || w == 0 || h == 0 {
            return raster;
        }

        let codepoint = ch as u32;
        let seed = codepoint.wrapping_mul(0x9E37_79B9) ^ (w << 16) ^ h;
        for y in 0..h {
            for x in 0..w {
                let border = x == 0 || y == 0 || x + 1 == w || y + 1 == h;
                let hash_bit = (seed >> ((x + y * 7) & 31)) & 1 == 1;
                let stripe = (x * 3 + y).wrapping_add(seed) % 11 == 0;
                let dot = (x + y * 5).wrapping_add(seed) % 17 == 0;
                if border || (hash_bit && stripe) || dot {
                    raster.set_pixel(x, y, colors.fg);
                    if font.bold {
                        raster.set_pixel(x + 1, y, colors.fg);
                    }
                }
            }
        }
        raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgrid_core::Color;

    fn colors() -> ColorPair {
        ColorPair::new(Color::WHITE, Color::BLACK)
    }

    #[test]
    fn advance_is_sixty_percent_of_size() {
        let src = ProceduralGlyphSource::new();
        assert_eq!(src.measure('m', &FontSpec::new("mono", 10)), 6);
        assert_eq!(src.measure('i', &FontSpec::new("mono", 14)), 8);
        let metrics = FontMetrics::measure(&src, &FontSpec::new("mono", 14));
        assert_eq!(metrics, FontMetrics::new(8, 16));
    }

    #[test]
    fn blank_glyph_is_pure_background() {
        let src = ProceduralGlyphSource::new();
        let m = FontMetrics::new(4, 6);
        let r = src.rasterize(' ', &FontSpec::new("mono", 4), m, colors());
        assert_eq!(r.dims(), (4, 6));
        assert!(
            r.pixels()
                .chunks_exact(4)
                .all(|px| *px == Color::BLACK.to_rgba())
        );
    }

    #[test]
    fn visible_glyph_has_foreground_border() {
        let src = ProceduralGlyphSource::new();
        let m = FontMetrics::new(5, 7);
        let r = src.rasterize('A', &FontSpec::new("mono", 5), m, colors());
        assert_eq!(r.pixel(0, 0), Some(Color::WHITE.to_rgba()));
        assert_eq!(r.pixel(4, 6), Some(Color::WHITE.to_rgba()));
    }

    #[test]
    fn rasterization_is_deterministic() {
        let src = ProceduralGlyphSource::new();
        let m = FontMetrics::new(8, 16);
        let font = FontSpec::new("mono", 14);
        assert_eq!(
            src.rasterize('q', &font, m, colors()),
            src.rasterize('q', &font, m, colors())
        );
    }

    #[test]
    fn bold_covers_more_than_regular() {
        let src = ProceduralGlyphSource::new();
        let m = FontMetrics::new(8, 16);
        let font = FontSpec::new("mono", 14);
        let fg = Color::WHITE.to_rgba();
        let count = |r: &Raster| r.pixels().chunks_exact(4).filter(|px| **px == fg).count();
        let regular = src.rasterize('g', &font, m, colors());
        let bold = src.rasterize('g', &font.bolded(), m, colors());
        // The left border always has background to its right somewhere.
        assert!(count(&bold) > count(&regular));
    }
}
