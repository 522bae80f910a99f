//! Screen configuration.
//!
//! Every field has a default, so a JSON document only needs the keys it wants
//! to change:
//!
//! ```json
//! { "rows": 30, "cols": 100, "font_size": 16, "raw": true }
//! ```

use crate::error::{RenderError, Result};
use crate::glyph_cache::DEFAULT_GLYPHS_PER_PAGE;
use crate::surface::FontSpec;
use glyphgrid_core::ColorPair;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Height in cells.
    pub rows: u16,
    /// Width in cells.
    pub cols: u16,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: u16,
    /// Only take keyboard input while focused. Recorded for hosts; the
    /// engine does not bind input itself.
    pub require_focus: bool,
    /// Suppress the host's default key handling unless a subscriber allows it.
    pub raw: bool,
    /// Follow the available height on layout changes.
    pub auto_height: bool,
    /// Follow the available width on layout changes.
    pub auto_width: bool,
    pub min_height: u16,
    pub min_width: u16,
    pub glyphs_per_page: u16,
    pub empty_char: char,
    /// Colours of pair 0.
    pub default_pair: ColorPair,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            font_family: "monospace".to_string(),
            font_size: 14,
            require_focus: false,
            raw: false,
            auto_height: false,
            auto_width: false,
            min_height: 1,
            min_width: 1,
            glyphs_per_page: DEFAULT_GLYPHS_PER_PAGE,
            empty_char: ' ',
            default_pair: ColorPair::default(),
        }
    }
}

impl ScreenConfig {
    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|err| RenderError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|err| RenderError::Config(err.to_string()))
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.font_size == 0 {
            return Err(RenderError::Config("font_size must be positive".to_string()));
        }
        if self.font_family.trim().is_empty() {
            return Err(RenderError::Config("font_family is empty".to_string()));
        }
        if self.glyphs_per_page == 0 {
            return Err(RenderError::Config(
                "glyphs_per_page must be positive".to_string(),
            ));
        }
        if self.min_height == 0 || self.min_width == 0 {
            return Err(RenderError::Config(
                "min_height and min_width must be at least 1".to_string(),
            ));
        }
        if self.empty_char.is_control() {
            return Err(RenderError::Config(format!(
                "empty_char {:?} is a control character",
                self.empty_char
            )));
        }
        Ok(())
    }

    /// Regular face described by this config.
    #[must_use]
    pub fn font(&self) -> FontSpec {
        FontSpec::new(self.font_family.clone(), self.font_size)
    }
}
