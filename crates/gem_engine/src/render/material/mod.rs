//! Material resources: parameter types, handles and texture bindings

pub mod material_type;
pub mod texture_manager;

pub use material_type::{
    Material, MaterialHandle, MaterialType, MetalParams, RefractiveParams,
};
pub use texture_manager::{ChannelBindings, TextureBindings, TextureHandle};
