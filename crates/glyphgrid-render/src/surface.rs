//! Pixel-side collaborators: rasters, surfaces, glyph sources and fonts.
//!
//! Everything here works in whole pixels with `u32` coordinates. Drawing
//! operations clip against both source and destination instead of failing,
//! the way a 2D canvas context does.

use glyphgrid_core::{Color, ColorPair};

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub const fn area(self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }
}

// ── Raster ──────────────────────────────────────────────────────────────

/// Row-major RGBA8 bitmap.
///
/// The pixel buffer always holds exactly `width * height` pixels; the
/// constructors are the only way to pick a size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Transparent black raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; byte_len(width, height)],
        }
    }

    /// Raster filled with an opaque colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let rgba = color.to_rgba();
        let mut pixels = Vec::with_capacity(byte_len(width, height));
        for _ in 0..(width as usize) * (height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap an existing buffer; `None` unless it holds exactly `width * height` pixels.
    #[must_use]
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == byte_len(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn bytes_len(&self) -> usize {
        self.pixels.len()
    }

    #[must_use]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// RGBA value at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[i..i + BYTES_PER_PIXEL]);
        Some(out)
    }

    /// Set one pixel; out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&color.to_rgba());
        }
    }

    /// Fill `rect`, clipped to this raster.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        let Some(rect) = self.clip(rect) else {
            return;
        };
        let rgba = color.to_rgba();
        for y in rect.y..rect.y + rect.height {
            let start = self.offset(rect.x, y);
            let end = start + (rect.width as usize) * BYTES_PER_PIXEL;
            for px in self.pixels[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
                px.copy_from_slice(&rgba);
            }
        }
    }

    /// Copy `src_rect` of `src` to `(dest_x, dest_y)`.
    ///
    /// The copied area is clipped against both rasters. Returns the number of
    /// pixels actually copied.
    pub fn copy_from(&mut self, src: &Raster, src_rect: PixelRect, dest_x: u32, dest_y: u32) -> u64 {
        let Some(src_rect) = src.clip(src_rect) else {
            return 0;
        };
        let width = src_rect.width.min(self.width.saturating_sub(dest_x));
        let height = src_rect.height.min(self.height.saturating_sub(dest_y));
        if width == 0 || height == 0 {
            return 0;
        }
        let row_bytes = (width as usize) * BYTES_PER_PIXEL;
        for row in 0..height {
            let s = src.offset(src_rect.x, src_rect.y + row);
            let d = self.offset(dest_x, dest_y + row);
            self.pixels[d..d + row_bytes].copy_from_slice(&src.pixels[s..s + row_bytes]);
        }
        u64::from(width) * u64::from(height)
    }

    /// New raster of the given size holding this raster's overlapping pixels.
    /// Pixels outside the overlap are transparent.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut out = Self::new(width, height);
        out.copy_from(self, self.bounds(), 0, 0);
        out
    }

    fn clip(&self, rect: PixelRect) -> Option<PixelRect> {
        if rect.x >= self.width || rect.y >= self.height {
            return None;
        }
        let clipped = PixelRect {
            x: rect.x,
            y: rect.y,
            width: rect.width.min(self.width - rect.x),
            height: rect.height.min(self.height - rect.y),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * BYTES_PER_PIXEL
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * BYTES_PER_PIXEL
}

// ── Fonts ───────────────────────────────────────────────────────────────

/// Font selection handed to a [`GlyphSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub family: String,
    pub size_px: u16,
    pub bold: bool,
}

impl FontSpec {
    #[must_use]
    pub fn new(family: impl Into<String>, size_px: u16) -> Self {
        Self {
            family: family.into(),
            size_px,
            bold: false,
        }
    }

    /// The bold face of this font.
    #[must_use]
    pub fn bolded(&self) -> Self {
        Self {
            bold: true,
            ..self.clone()
        }
    }

    /// The regular face of this font.
    #[must_use]
    pub fn regular(&self) -> Self {
        Self {
            bold: false,
            ..self.clone()
        }
    }
}

/// Size of one character cell in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontMetrics {
    pub char_width: u16,
    pub char_height: u16,
}

impl FontMetrics {
    #[must_use]
    pub const fn new(char_width: u16, char_height: u16) -> Self {
        Self {
            char_width,
            char_height,
        }
    }

    /// Derive cell metrics for `font`: height is the pixel size plus two,
    /// width is the advance of `'m'` in the bold face.
    ///
    /// Both dimensions are at least one pixel.
    #[must_use]
    pub fn measure<G>(source: &G, font: &FontSpec) -> Self
    where
        G: GlyphSource + ?Sized,
    {
        let width = source.measure('m', &font.bolded());
        Self {
            char_width: width.max(1),
            char_height: font.size_px.saturating_add(2).max(1),
        }
    }

    /// Top-left pixel of the cell at `(row, col)`.
    #[must_use]
    pub const fn cell_origin(self, row: u16, col: u16) -> (u32, u32) {
        (
            (col as u32) * (self.char_width as u32),
            (row as u32) * (self.char_height as u32),
        )
    }

    /// Pixel rectangle covered by the cell at `(row, col)`.
    #[must_use]
    pub const fn cell_rect(self, row: u16, col: u16) -> PixelRect {
        let (x, y) = self.cell_origin(row, col);
        PixelRect::new(x, y, self.char_width as u32, self.char_height as u32)
    }

    /// Pixel size of a `rows` x `cols` grid as `(width, height)`.
    #[must_use]
    pub const fn grid_size(self, rows: u16, cols: u16) -> (u32, u32) {
        (
            (cols as u32) * (self.char_width as u32),
            (rows as u32) * (self.char_height as u32),
        )
    }

    /// Whole cells that fit in `(px_width, px_height)`, as `(rows, cols)`.
    #[must_use]
    pub fn cells_in(self, px_width: u32, px_height: u32) -> (u16, u16) {
        let rows = px_height / u32::from(self.char_height.max(1));
        let cols = px_width / u32::from(self.char_width.max(1));
        (
            u16::try_from(rows).unwrap_or(u16::MAX),
            u16::try_from(cols).unwrap_or(u16::MAX),
        )
    }
}

// ── Collaborator traits ─────────────────────────────────────────────────

/// Destination for rendered pixels.
pub trait Surface {
    /// Current size as `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize, keeping the pixels of the overlapping area.
    fn resize(&mut self, width: u32, height: u32);

    /// Fill a rectangle with an opaque colour.
    fn fill_rect(&mut self, rect: PixelRect, color: Color);

    /// Copy `src_rect` of `src` to `(dest_x, dest_y)`.
    fn blit(&mut self, src: &Raster, src_rect: PixelRect, dest_x: u32, dest_y: u32);
}

/// Produces cell-sized glyph images.
pub trait GlyphSource {
    /// Horizontal advance of `ch` in `font`, in pixels.
    fn measure(&self, ch: char, font: &FontSpec) -> u16;

    /// Render `ch` into a `metrics`-sized raster: background filled with
    /// `colors.bg`, the glyph drawn in `colors.fg`.
    fn rasterize(&self, ch: char, font: &FontSpec, metrics: FontMetrics, colors: ColorPair) -> Raster;
}

// ── In-memory surface ───────────────────────────────────────────────────

/// CPU-side RGBA8 [`Surface`] with write counters.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    raster: Raster,
    blits: u64,
    fills: u64,
}

impl PixelSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
            blits: 0,
            fills: 0,
        }
    }

    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.raster.pixel(x, y)
    }

    /// Number of `blit` calls so far.
    #[must_use]
    pub const fn blit_count(&self) -> u64 {
        self.blits
    }

    /// Number of `fill_rect` calls so far.
    #[must_use]
    pub const fn fill_count(&self) -> u64 {
        self.fills
    }

    /// Total drawing calls (blits plus fills).
    #[must_use]
    pub const fn write_count(&self) -> u64 {
        self.blits + self.fills
    }

    pub fn reset_counters(&mut self) {
        self.blits = 0;
        self.fills = 0;
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        self.raster.dims()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.raster.dims() != (width, height) {
            self.raster = self.raster.resized(width, height);
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        self.fills += 1;
        self.raster.fill_rect(rect, color);
    }

    fn blit(&mut self, src: &Raster, src_rect: PixelRect, dest_x: u32, dest_y: u32) {
        self.blits += 1;
        self.raster.copy_from(src, src_rect, dest_x, dest_y);
    }
}
