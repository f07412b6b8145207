//! Material type definitions
//!
//! A material is either a reflective metal or a refractive gem. The
//! refraction shading itself is done by the renderer's refractive surface;
//! this crate only produces its parameters.

use super::{TextureBindings, TextureHandle};
use crate::core::catalog::Color;
use crate::foundation::collections::MaterialKey;
use crate::scene::classifier::GemKind;

/// Parameters of a metallic surface
#[derive(Debug, Clone, PartialEq)]
pub struct MetalParams {
    /// Base color
    pub color: Color,
    /// Effective roughness (after any engraving multiplier)
    pub roughness: f32,
    /// Metallic factor
    pub metalness: f32,
    /// Environment reflection intensity
    pub env_intensity: f32,
    /// Render both faces
    pub double_sided: bool,
    /// Scene environment reflected by the metal, once loaded
    pub environment: Option<String>,
}

impl Default for MetalParams {
    fn default() -> Self {
        Self {
            color: Color::rgb(0.8, 0.8, 0.8),
            roughness: 0.5,
            metalness: 1.0,
            env_intensity: 1.0,
            double_sided: true,
            environment: None,
        }
    }
}

/// Parameters of a refractive gem surface
#[derive(Debug, Clone, PartialEq)]
pub struct RefractiveParams {
    /// Gem kind the mesh was classified as
    pub kind: GemKind,
    /// Internal refraction bounces
    pub bounces: u32,
    /// Index of refraction
    pub ior: f32,
    /// Fresnel strength
    pub fresnel: f32,
    /// Chromatic aberration strength
    pub aberration: f32,
    /// Tint color
    pub color: Color,
    /// Fast chromatic aberration approximation
    pub fast_chroma: bool,
    /// Tone mapping enabled
    pub tone_mapped: bool,
    /// Environment map the refraction samples
    pub environment_map_id: String,
    /// Whether that environment map is loaded and bound
    pub environment_bound: bool,
}

/// Enumeration of supported material types
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialType {
    /// Reflective metal
    Metal(MetalParams),
    /// Refractive gem
    Refractive(RefractiveParams),
}

/// Stable identity of a cached material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) MaterialKey);

/// Material resource
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material type and parameters
    pub material_type: MaterialType,
    /// Texture bindings for this material
    pub textures: TextureBindings,
    /// Optional name for debugging
    pub name: Option<String>,
    /// Incremented every time parameters or bindings change
    pub revision: u64,
}

impl Material {
    /// Create a metal material
    pub fn metal(params: MetalParams) -> Self {
        Self {
            material_type: MaterialType::Metal(params),
            textures: TextureBindings::default(),
            name: None,
            revision: 0,
        }
    }

    /// Set the material name for debugging
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Metal parameters, if this is a metal
    pub fn as_metal(&self) -> Option<&MetalParams> {
        match &self.material_type {
            MaterialType::Metal(params) => Some(params),
            MaterialType::Refractive(_) => None,
        }
    }

    /// Refractive parameters, if this is a gem
    pub fn as_refractive(&self) -> Option<&RefractiveParams> {
        match &self.material_type {
            MaterialType::Refractive(params) => Some(params),
            MaterialType::Metal(_) => None,
        }
    }

    /// Texture currently bound, if any
    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.textures.texture
    }
}
