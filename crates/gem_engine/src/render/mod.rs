//! # Rendering Interface
//!
//! The configurator does not draw anything itself. Composition produces a
//! [`RenderList`]: an ordered, immutable list of geometry, world transform and
//! a frozen copy of each material's parameters, which is handed to a host
//! supplied [`Renderer`] together with the [`Camera`].
//!
//! ## Design Goals
//!
//! - **Isolation**: renderers only ever see render lists, never the live
//!   material cache
//! - **Stable identity**: each item carries its [`MaterialHandle`], so a
//!   renderer can keep GPU resources keyed by handle and update them when the
//!   parameters' revision changes

pub mod camera;
pub mod material;
pub mod text;

pub use camera::Camera;
pub use material::{Material, MaterialHandle, MaterialType, TextureHandle};
pub use text::{EngravingRaster, EngravingRasterizer};

use std::sync::Arc;

use crate::assets::Geometry;
use crate::foundation::collections::MeshId;
use crate::foundation::math::Mat4;

/// One drawable mesh
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Mesh identity in the mounted arena
    pub mesh: MeshId,
    /// Mesh display name
    pub name: String,
    /// Geometry to draw
    pub geometry: Arc<Geometry>,
    /// Model-to-world transform
    pub transform: Mat4,
    /// Stable material identity
    pub material: MaterialHandle,
    /// Material parameters at composition time
    pub params: Material,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct RenderList {
    /// Drawables in arena order
    pub items: Vec<RenderItem>,
    /// Current engraving raster (bound through `TextureHandle`s in items)
    pub engraving: Arc<EngravingRaster>,
    /// Snapshot revision this list was composed from
    pub revision: u64,
}

impl RenderList {
    /// Number of drawables
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose material carries the engraving raster
    pub fn engraved(&self) -> impl Iterator<Item = &RenderItem> {
        self.items.iter().filter(|item| item.params.bound_texture().is_some())
    }
}

/// Consumer of composed frames
pub trait Renderer {
    /// Draw a frame
    fn render(&mut self, list: &RenderList, camera: &Camera);
}
