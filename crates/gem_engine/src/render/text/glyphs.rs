//! Glyph sources for the engraving rasterizer
//!
//! A [`GlyphSource`] turns `(family, char, size)` into a coverage bitmap with
//! placement metrics. [`FontLibrary`] serves TrueType/OpenType faces through
//! `fontdue`; when a family is unknown it falls back to the default family,
//! and when no font is loaded at all it draws with the built-in [`BlockFace`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use fontdue::{Font, FontSettings};

use crate::core::config::AssetConfig;

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Errors that can occur during font operations
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// Failed to parse font data
    #[error("Failed to load font '{family}': {reason}")]
    LoadError {
        /// Family the font was registered under
        family: String,
        /// Parser message
        reason: String,
    },

    /// Failed to read a font file
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),
}

/// A rasterized glyph
///
/// Coverage is row-major, top row first. `xmin` is the offset from the pen
/// position to the left edge; `ymin` the offset from the baseline up to the
/// bottom edge (same conventions as `fontdue::Metrics`).
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels
    pub width: usize,
    /// Bitmap height in pixels
    pub height: usize,
    /// Left bearing
    pub xmin: i32,
    /// Bottom offset above the baseline
    pub ymin: i32,
    /// Pen advance after this glyph
    pub advance: f32,
    /// Per-pixel coverage (0-255)
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    /// Glyph with no ink, only an advance
    pub fn blank(advance: f32) -> Self {
        Self {
            width: 0,
            height: 0,
            xmin: 0,
            ymin: 0,
            advance,
            coverage: Vec::new(),
        }
    }

    /// Coverage at `(x, y)` in bitmap space
    ///
    /// Pixels outside the bitmap, or missing from a short coverage buffer,
    /// read as zero.
    pub fn coverage_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage.get(y * self.width + x).copied().unwrap_or(0)
    }
}

/// Source of glyph bitmaps
pub trait GlyphSource {
    /// Rasterize `ch` of `family` at `px` pixels per em
    fn glyph(&self, family: &str, ch: char, px: f32) -> GlyphBitmap;
}

/// Built-in fallback face
///
/// Draws every visible character as a 5x7 cell pattern derived from its code
/// point. It is not meant to be legible, only deterministic and distinct per
/// character so engraving works without a font file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl BlockFace {
    const COLUMNS: usize = 5;
    const ROWS: usize = 7;
    const MAX_CELL: usize = 512;

    fn pattern(ch: char) -> u64 {
        // Fibonacci hashing spreads neighbouring code points apart; the left
        // stroke keeps every visible glyph inked.
        let hashed = u64::from(ch).wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 16;
        let left_stroke = (0..Self::ROWS).fold(0u64, |acc, row| acc | 1 << (row * Self::COLUMNS));
        hashed | left_stroke
    }
}

impl GlyphSource for BlockFace {
    fn glyph(&self, _family: &str, ch: char, px: f32) -> GlyphBitmap {
        let cell = ((px / 8.0).round() as usize).clamp(1, Self::MAX_CELL);
        let advance = (cell * (Self::COLUMNS + 1)) as f32;
        if ch.is_whitespace() || ch.is_control() {
            return GlyphBitmap::blank(advance);
        }

        let width = cell * Self::COLUMNS;
        let height = cell * Self::ROWS;
        let bits = Self::pattern(ch);
        let mut coverage = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                let bit = (y / cell) * Self::COLUMNS + x / cell;
                if (bits >> bit) & 1 == 1 {
                    coverage[y * width + x] = 255;
                }
            }
        }

        GlyphBitmap {
            width,
            height,
            xmin: 0,
            ymin: 0,
            advance,
            coverage,
        }
    }
}

/// Font faces keyed by family name
pub struct FontLibrary {
    fonts: BTreeMap<String, Font>,
    default_family: Option<String>,
    fallback: BlockFace,
}

impl FontLibrary {
    /// Create an empty library (renders with [`BlockFace`])
    pub fn new() -> Self {
        Self {
            fonts: BTreeMap::new(),
            default_family: None,
            fallback: BlockFace,
        }
    }

    /// Load every font listed in the asset configuration
    ///
    /// Relative paths resolve against `root`.
    pub fn from_config(assets: &AssetConfig, root: &Path) -> FontResult<Self> {
        let mut library = Self::new();
        for (family, path) in &assets.fonts {
            library.load_file(family, &root.join(path))?;
        }
        if let Some(family) = &assets.default_font_family {
            library.set_default_family(family);
        }
        Ok(library)
    }

    /// Register a font from raw TTF/OTF bytes
    ///
    /// The first registered family becomes the default.
    pub fn add_font(&mut self, family: &str, font_data: &[u8]) -> FontResult<()> {
        let font = Font::from_bytes(font_data, FontSettings::default()).map_err(|e| {
            FontError::LoadError {
                family: family.to_string(),
                reason: format!("fontdue error: {}", e),
            }
        })?;
        log::info!("Loaded font family '{}'", family);
        self.fonts.insert(family.to_string(), font);
        if self.default_family.is_none() {
            self.default_family = Some(family.to_string());
        }
        Ok(())
    }

    /// Register a font from a file
    pub fn load_file(&mut self, family: &str, path: &Path) -> FontResult<()> {
        log::debug!("Loading font '{}' from {:?}", family, path);
        let data = std::fs::read(path)?;
        self.add_font(family, &data)
    }

    /// Family used when a requested one is unknown
    pub fn set_default_family(&mut self, family: &str) {
        if self.fonts.contains_key(family) {
            self.default_family = Some(family.to_string());
        } else {
            log::warn!("Default font family '{}' is not loaded; keeping {:?}", family, self.default_family);
        }
    }

    /// Registered family names
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    fn font_for(&self, family: &str) -> Option<&Font> {
        self.fonts.get(family).or_else(|| {
            self.default_family
                .as_ref()
                .and_then(|default| self.fonts.get(default))
        })
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .field("default_family", &self.default_family)
            .finish()
    }
}

impl GlyphSource for FontLibrary {
    fn glyph(&self, family: &str, ch: char, px: f32) -> GlyphBitmap {
        match self.font_for(family) {
            Some(font) => {
                let (metrics, coverage) = font.rasterize(ch, px);
                GlyphBitmap {
                    width: metrics.width,
                    height: metrics.height,
                    xmin: metrics.xmin,
                    ymin: metrics.ymin,
                    advance: metrics.advance_width,
                    coverage,
                }
            }
            None => self.fallback.glyph(family, ch, px),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_face_is_deterministic_and_distinct() {
        let face = BlockFace;
        let a = face.glyph("serif", 'A', 48.0);
        assert_eq!(a, face.glyph("serif", 'A', 48.0));
        assert_ne!(a.coverage, face.glyph("serif", 'B', 48.0).coverage);
        assert_eq!((a.width, a.height), (30, 42));
        assert!(a.coverage.iter().any(|&c| c == 255));
    }

    #[test]
    fn test_block_face_whitespace_has_advance_only() {
        let space = BlockFace.glyph("serif", ' ', 48.0);
        assert_eq!(space.width, 0);
        assert!(space.coverage.is_empty());
        assert!(space.advance > 0.0);
    }

    #[test]
    fn test_block_face_scales_with_size() {
        let small = BlockFace.glyph("serif", 'x', 16.0);
        let large = BlockFace.glyph("serif", 'x', 64.0);
        assert!(large.width > small.width);
        assert!(large.advance > small.advance);
    }

    #[test]
    fn test_block_face_size_is_bounded() {
        let huge = BlockFace.glyph("serif", 'W', 1e30);
        assert_eq!(huge.width, BlockFace::MAX_CELL * 5);
        assert_eq!(huge.coverage.len(), huge.width * huge.height);

        let nan = BlockFace.glyph("serif", 'W', f32::NAN);
        assert_eq!((nan.width, nan.height), (5, 7));
    }

    #[test]
    fn test_coverage_outside_buffer_reads_zero() {
        let glyph = GlyphBitmap {
            width: 4,
            height: 4,
            xmin: 0,
            ymin: 0,
            advance: 4.0,
            coverage: vec![255; 6],
        };
        assert_eq!(glyph.coverage_at(1, 1), 255);
        assert_eq!(glyph.coverage_at(3, 3), 0);
        assert_eq!(glyph.coverage_at(9, 0), 0);
        assert_eq!(glyph.coverage_at(0, 9), 0);
    }

    #[test]
    fn test_empty_library_falls_back_to_block_face() {
        let library = FontLibrary::new();
        assert_eq!(library.families().count(), 0);
        assert_eq!(library.glyph("serif", 'Q', 24.0), BlockFace.glyph("serif", 'Q', 24.0));
    }

    #[test]
    fn test_invalid_font_data_is_rejected() {
        let mut library = FontLibrary::new();
        let err = library.add_font("broken", b"not a font").unwrap_err();
        assert!(matches!(err, FontError::LoadError { .. }));
        assert_eq!(library.families().count(), 0);
    }

    #[test]
    fn test_missing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = FontLibrary::new();
        let err = library.load_file("serif", &dir.path().join("missing.ttf")).unwrap_err();
        assert!(matches!(err, FontError::Io(_)));
    }
}
