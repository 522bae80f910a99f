//! Errors surfaced by the pixel frontend.

use crate::glyph_cache::GlyphCacheError;
use std::fmt;

/// Failure of a screen, renderer or session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Grid or colour-pair failure.
    Core(glyphgrid_core::Error),
    /// Glyph could not be produced or cached.
    Glyph(GlyphCacheError),
    /// Invalid configuration.
    Config(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(err) => write!(f, "{err}"),
            Self::Glyph(err) => write!(f, "glyph cache: {err}"),
            Self::Config(msg) => write!(f, "invalid screen config: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(err) => Some(err),
            Self::Glyph(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<glyphgrid_core::Error> for RenderError {
    fn from(err: glyphgrid_core::Error) -> Self {
        Self::Core(err)
    }
}

impl From<GlyphCacheError> for RenderError {
    fn from(err: GlyphCacheError) -> Self {
        Self::Glyph(err)
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
