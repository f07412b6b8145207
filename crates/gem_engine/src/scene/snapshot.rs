//! Scene snapshot: the single externally observable configuration state
//!
//! Snapshots are immutable once published. The configuration channel builds
//! the next snapshot by copying the current one and replacing exactly one
//! field, so a reader never sees a half-applied update.

use serde::{Deserialize, Serialize};

/// Engraving text and layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngravingState {
    /// Free-form text, lines separated by `\n`
    pub text: String,
    /// Glyph size in raster pixels
    pub font_size: f32,
    /// Font family name
    pub font_family: String,
    /// Carving depth; luminance drops by `depth * depth_scale`
    pub depth: f32,
    /// Horizontal anchor offset from the raster centre, in the rotated frame
    pub pos_x: f32,
    /// Vertical anchor offset from the raster centre, in the rotated frame
    pub pos_y: f32,
}

impl Default for EngravingState {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 48.0,
            font_family: "serif".to_string(),
            depth: 0.6,
            pos_x: 0.0,
            pos_y: 0.0,
        }
    }
}

impl EngravingState {
    /// Whether rendering this state produces anything besides the baseline
    pub fn has_visible_text(&self) -> bool {
        self.text.chars().any(|c| !c.is_whitespace()) && self.font_size > 0.0
    }

    /// Whether every layout field lies within `limits`
    pub fn is_within(&self, limits: &EngravingLimits) -> bool {
        limits.accepts_font_size(self.font_size)
            && limits.accepts_depth(self.depth)
            && limits.accepts_offset(self.pos_x)
            && limits.accepts_offset(self.pos_y)
            && !self.font_family.trim().is_empty()
    }
}

/// Accepted ranges for engraving layout values
///
/// Glyphs larger than the raster, or anchored further than one raster size
/// from its centre, can never land on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngravingLimits {
    /// Largest accepted font size
    pub max_font_size: f32,
    /// Largest accepted anchor offset in either direction
    pub max_offset: f32,
}

impl EngravingLimits {
    /// Limits for a raster of `width` x `height` pixels
    pub fn for_raster(width: u32, height: u32) -> Self {
        let extent = width.max(height) as f32;
        Self {
            max_font_size: extent,
            max_offset: extent,
        }
    }

    /// Font size in `[0, max_font_size]`
    pub fn accepts_font_size(&self, size: f32) -> bool {
        (0.0..=self.max_font_size).contains(&size)
    }

    /// Finite, non-negative depth
    pub fn accepts_depth(&self, depth: f32) -> bool {
        depth.is_finite() && depth >= 0.0
    }

    /// Offset in `[-max_offset, max_offset]`
    pub fn accepts_offset(&self, offset: f32) -> bool {
        (-self.max_offset..=self.max_offset).contains(&offset)
    }
}

impl Default for EngravingLimits {
    fn default() -> Self {
        Self::for_raster(1024, 1024)
    }
}

/// Partial update of the engraving layout; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngravingStyle {
    /// New font size
    pub font_size: Option<f32>,
    /// New font family
    pub font_family: Option<String>,
    /// New depth
    pub depth: Option<f32>,
    /// New horizontal anchor
    pub pos_x: Option<f32>,
    /// New vertical anchor
    pub pos_y: Option<f32>,
}

impl EngravingStyle {
    /// Whether every present field is within `limits`
    pub fn is_within(&self, limits: &EngravingLimits) -> bool {
        self.font_size.map_or(true, |s| limits.accepts_font_size(s))
            && self.depth.map_or(true, |d| limits.accepts_depth(d))
            && self.pos_x.map_or(true, |x| limits.accepts_offset(x))
            && self.pos_y.map_or(true, |y| limits.accepts_offset(y))
            && self.font_family.as_deref().map_or(true, |f| !f.trim().is_empty())
    }

    /// Apply onto an engraving state
    pub fn apply_to(&self, state: &mut EngravingState) {
        if let Some(size) = self.font_size {
            state.font_size = size;
        }
        if let Some(family) = &self.font_family {
            state.font_family = family.clone();
        }
        if let Some(depth) = self.depth {
            state.depth = depth;
        }
        if let Some(x) = self.pos_x {
            state.pos_x = x;
        }
        if let Some(y) = self.pos_y {
            state.pos_y = y;
        }
    }
}

/// Which snapshot field an update touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotField {
    /// `model_variant`
    ModelVariant,
    /// `metal_finish`
    MetalFinish,
    /// `gem_variant`
    GemVariant,
    /// `engraving`
    Engraving,
    /// `camera`
    Camera,
}

/// The authoritative configuration state of the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Selected model variant id
    pub model_variant: String,
    /// Selected metal finish id (canonical, never an alias)
    pub metal_finish: String,
    /// Selected gem variant id
    pub gem_variant: String,
    /// Engraving text and layout
    pub engraving: EngravingState,
    /// Camera control value in `[0, 1]`
    pub camera: f32,
    /// Incremented on every published update
    pub revision: u64,
}
