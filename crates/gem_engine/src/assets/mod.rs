//! Asset management system
//!
//! Decoding and fetching assets is the job of an [`AssetLoader`]
//! implementation supplied by the host. Loads are asynchronous and may fail;
//! the runtime awaits them without blocking message handling.

pub mod environment;
pub mod file_loader;
pub mod materials;
pub mod mesh;

pub use environment::{EnvironmentMap, EnvironmentStore};
pub use file_loader::FileAssetLoader;
pub use materials::{MaterialCache, MaterialFactory, MaterialOptions};
pub use mesh::{Geometry, MeshArena, MeshHierarchy, MeshNode, MountedMesh};

use futures::future::LocalBoxFuture;
use thiserror::Error;

/// Future returned by asset loaders
pub type AssetFuture<T> = LocalBoxFuture<'static, Result<T, AssetError>>;

/// Source of decoded meshes and environment maps
pub trait AssetLoader {
    /// Fetch and decode a mesh hierarchy
    fn load(&self, url: &str) -> AssetFuture<MeshHierarchy>;

    /// Fetch and decode an environment map
    fn load_environment(&self, url: &str) -> AssetFuture<EnvironmentMap>;
}

/// Asset errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Asset could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transport failure
    #[error("Fetch failed: {0}")]
    Fetch(String),
}
