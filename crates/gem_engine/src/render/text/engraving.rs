//! Engraving rasterizer
//!
//! Renders [`EngravingState`] into a single-channel depth raster that the
//! material factory binds to engravable metal. Luminance encodes carve depth:
//! the raster is cleared to a neutral baseline, glyph pixels are darkened by
//! `depth * depth_scale`, and deep engravings get a lighter one-pixel offset
//! duplicate composited with a lighten blend to read as a carved edge.
//!
//! Text is laid out in a frame rotated 90 degrees counter-clockwise relative
//! to the raster, matching the UV orientation of the ring band. A frame point
//! `(fx, fy)` measured from the raster centre lands at raster pixel
//! `(cx + fy, cy - fx)`.

use std::path::Path;
use std::sync::Arc;

use image::{GrayImage, ImageResult, Luma};

use super::glyphs::{GlyphBitmap, GlyphSource};
use crate::core::config::EngravingConfig;
use crate::render::material::TextureHandle;
use crate::scene::snapshot::EngravingState;

/// Texture slot the engraving raster is published under
pub const ENGRAVING_TEXTURE_ID: u32 = 0;

/// Cap height as a fraction of the em size, used to centre lines optically
const CAP_HEIGHT_RATIO: f32 = 0.7;

/// Raster geometry and depth encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterParams {
    /// Raster width in pixels
    pub width: u32,
    /// Raster height in pixels
    pub height: u32,
    /// Neutral luminance
    pub baseline: u8,
    /// Luminance drop per unit depth
    pub depth_scale: f32,
    /// Depth above which the edge highlight is drawn
    pub highlight_threshold: f32,
    /// Line advance as a multiple of the font size
    pub line_height_factor: f32,
}

impl From<&EngravingConfig> for RasterParams {
    fn from(config: &EngravingConfig) -> Self {
        Self {
            width: config.raster_width,
            height: config.raster_height,
            baseline: config.baseline_luminance,
            depth_scale: config.depth_scale,
            highlight_threshold: config.highlight_depth_threshold,
            line_height_factor: config.line_height_factor,
        }
    }
}

/// One published engraving raster
///
/// Rasters are immutable; every change produces a new one with a higher
/// generation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngravingRaster {
    image: GrayImage,
    generation: u64,
    active: bool,
}

impl EngravingRaster {
    /// Pixel data
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Generation of this raster
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the raster carries any engraving (i.e. is not the baseline)
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Texture handle to bind, only while active
    pub fn texture(&self) -> Option<TextureHandle> {
        self.active.then_some(TextureHandle {
            id: ENGRAVING_TEXTURE_ID,
            generation: self.generation,
        })
    }

    /// Write the raster to an image file (format from the extension)
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.image.save(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blend {
    Over,
    Lighten,
}

/// A glyph bitmap positioned in the text frame
struct PlacedGlyph {
    bitmap: GlyphBitmap,
    left: i32,
    top: i32,
}

/// Text to depth-raster renderer
pub struct EngravingRasterizer {
    params: RasterParams,
    glyphs: Box<dyn GlyphSource>,
    current: Arc<EngravingRaster>,
    last_state: Option<EngravingState>,
}

impl EngravingRasterizer {
    /// Create a rasterizer holding the baseline raster
    pub fn new(params: RasterParams, glyphs: Box<dyn GlyphSource>) -> Self {
        let baseline = EngravingRaster {
            image: GrayImage::from_pixel(params.width, params.height, Luma([params.baseline])),
            generation: 0,
            active: false,
        };
        Self {
            params,
            glyphs,
            current: Arc::new(baseline),
            last_state: None,
        }
    }

    /// Raster parameters
    pub fn params(&self) -> &RasterParams {
        &self.params
    }

    /// The current raster
    pub fn current(&self) -> &Arc<EngravingRaster> {
        &self.current
    }

    /// Texture to bind on engravable metal, if the raster is active
    pub fn active_texture(&self) -> Option<TextureHandle> {
        self.current.texture()
    }

    /// Re-render for `state` if it differs from the last rendered state
    ///
    /// Returns whether a new raster was published. The previous raster is
    /// replaced wholesale, never patched.
    pub fn update(&mut self, state: &EngravingState) -> bool {
        if self.last_state.as_ref() == Some(state) {
            return false;
        }

        let (image, active) = self.render(state);
        let generation = self.current.generation + 1;
        self.current = Arc::new(EngravingRaster {
            image,
            generation,
            active,
        });
        self.last_state = Some(state.clone());
        log::debug!(
            "Engraving raster regenerated (generation {}, active: {}, {} chars)",
            generation,
            active,
            state.text.chars().count()
        );
        true
    }

    /// Render `state` into a fresh image
    ///
    /// Pure: identical states give bit-identical images. Returns the image
    /// and whether it differs from the baseline by construction.
    pub fn render(&self, state: &EngravingState) -> (GrayImage, bool) {
        let params = &self.params;
        let mut image = GrayImage::from_pixel(params.width, params.height, Luma([params.baseline]));
        if !state.has_visible_text() {
            return (image, false);
        }

        let glyph_luminance = carve_luminance(params.baseline, state.depth, params.depth_scale);
        let placed = self.layout(state);
        for glyph in &placed {
            stamp(&mut image, glyph, glyph_luminance, Blend::Over, 0);
        }

        if state.depth > params.highlight_threshold {
            let highlight = ((u16::from(glyph_luminance) + u16::from(params.baseline)) / 2) as u8;
            for glyph in &placed {
                stamp(&mut image, glyph, highlight, Blend::Lighten, 1);
            }
        }

        (image, true)
    }

    fn layout(&self, state: &EngravingState) -> Vec<PlacedGlyph> {
        // Nothing larger than the raster can land on it
        let font_size = state.font_size.min(self.params.width.max(self.params.height) as f32);
        let lines: Vec<&str> = state.text.split('\n').collect();
        let line_height = font_size * self.params.line_height_factor;
        let first_centre = state.pos_y - line_height * (lines.len() - 1) as f32 / 2.0;

        let mut placed = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let glyphs: Vec<GlyphBitmap> = line
                .chars()
                .filter(|&c| c != '\r')
                .map(|c| self.glyphs.glyph(&state.font_family, c, font_size))
                .collect();
            let line_width: f32 = glyphs.iter().map(|g| g.advance).sum();

            let centre_y = first_centre + line_height * index as f32;
            let baseline = (centre_y + font_size * CAP_HEIGHT_RATIO / 2.0).round() as i32;
            let mut pen = state.pos_x - line_width / 2.0;

            for bitmap in glyphs {
                let advance = bitmap.advance;
                if bitmap.width > 0 && bitmap.height > 0 {
                    let left = (pen.round() as i32).saturating_add(bitmap.xmin);
                    let top = baseline
                        .saturating_sub(bitmap.ymin)
                        .saturating_sub(bitmap.height as i32);
                    placed.push(PlacedGlyph { bitmap, left, top });
                }
                pen += advance;
            }
        }
        placed
    }
}

impl std::fmt::Debug for EngravingRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngravingRasterizer")
            .field("params", &self.params)
            .field("generation", &self.current.generation)
            .field("active", &self.current.active)
            .finish_non_exhaustive()
    }
}

fn carve_luminance(baseline: u8, depth: f32, depth_scale: f32) -> u8 {
    (f32::from(baseline) - depth * depth_scale).round().clamp(0.0, 255.0) as u8
}

fn mix(dst: u8, src: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(dst) * (255 - a) + u32::from(src) * a + 127) / 255) as u8
}

fn stamp(image: &mut GrayImage, glyph: &PlacedGlyph, luminance: u8, blend: Blend, offset: i32) {
    let (width, height) = (image.width() as i32, image.height() as i32);
    let (cx, cy) = (width / 2, height / 2);
    let bitmap = &glyph.bitmap;

    for gy in 0..bitmap.height {
        for gx in 0..bitmap.width {
            let alpha = bitmap.coverage_at(gx, gy);
            if alpha == 0 {
                continue;
            }
            let fx = glyph.left.saturating_add(gx as i32).saturating_add(offset);
            let fy = glyph.top.saturating_add(gy as i32).saturating_add(offset);
            let (rx, ry) = (cx.saturating_add(fy), cy.saturating_sub(fx));
            if rx < 0 || ry < 0 || rx >= width || ry >= height {
                continue;
            }

            let pixel = image.get_pixel_mut(rx as u32, ry as u32);
            let mixed = mix(pixel[0], luminance, alpha);
            pixel[0] = match blend {
                Blend::Over => mixed,
                Blend::Lighten => pixel[0].max(mixed),
            };
        }
    }
}
