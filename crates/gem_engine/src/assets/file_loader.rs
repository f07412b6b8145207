//! File-backed asset loader
//!
//! Reads mesh hierarchies from RON manifests and environment maps from image
//! files (Radiance `.hdr` or PNG) under a root directory. Remote URLs are
//! rejected; network fetch belongs to the embedding host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use serde::Deserialize;

use super::{AssetError, AssetFuture, AssetLoader, EnvironmentMap, Geometry, MeshHierarchy, MeshNode};
use crate::foundation::math::{Quat, Quaternion, Transform, Vec3};

/// Node description inside a mesh manifest
#[derive(Debug, Deserialize)]
struct ManifestNode {
    name: String,
    #[serde(default)]
    parent: Option<usize>,
    #[serde(default)]
    geometry: Option<String>,
    #[serde(default)]
    vertex_count: usize,
    #[serde(default)]
    translation: [f32; 3],
    /// Quaternion as (x, y, z, w)
    #[serde(default = "identity_rotation")]
    rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    scale: [f32; 3],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Top-level mesh manifest
#[derive(Debug, Deserialize)]
struct MeshManifest {
    nodes: Vec<ManifestNode>,
}

impl MeshManifest {
    fn into_hierarchy(self) -> MeshHierarchy {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| {
                let [x, y, z, w] = node.rotation;
                let transform = Transform {
                    position: Vec3::from(node.translation),
                    rotation: Quat::new_normalize(Quaternion::new(w, x, y, z)),
                    scale: Vec3::from(node.scale),
                };
                MeshNode {
                    geometry: node.geometry.map(|name| {
                        Arc::new(Geometry {
                            name,
                            vertex_count: node.vertex_count,
                        })
                    }),
                    name: node.name,
                    parent: node.parent,
                    local_transform: transform,
                }
            })
            .collect();
        MeshHierarchy::new(nodes)
    }
}

/// Loads assets from the local filesystem
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    /// Create a loader resolving relative URLs against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, AssetError> {
        if url.contains("://") {
            return Err(AssetError::Fetch(format!(
                "remote URL '{url}' cannot be served from disk"
            )));
        }
        let path = Path::new(url);
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        if full.exists() {
            Ok(full)
        } else {
            Err(AssetError::NotFound(full.display().to_string()))
        }
    }

    fn read_hierarchy(&self, url: &str) -> Result<MeshHierarchy, AssetError> {
        let path = self.resolve(url)?;
        log::debug!("Loading mesh manifest from: {:?}", path);
        let contents = std::fs::read_to_string(&path)?;
        let manifest: MeshManifest = ron::from_str(&contents)
            .map_err(|e| AssetError::Decode(format!("{}: {e}", path.display())))?;
        Ok(manifest.into_hierarchy())
    }

    fn read_environment(&self, url: &str) -> Result<EnvironmentMap, AssetError> {
        let path = self.resolve(url)?;
        log::debug!("Loading environment map from: {:?}", path);
        let image = image::open(&path)
            .map_err(|e| AssetError::Decode(format!("Failed to load image: {e}")))?
            .to_rgb32f();
        let (width, height) = image.dimensions();
        log::info!("Loaded environment {}x{} from {:?}", width, height, path);
        Ok(EnvironmentMap {
            width,
            height,
            texels: Arc::from(image.into_raw()),
        })
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, url: &str) -> AssetFuture<MeshHierarchy> {
        let result = self.read_hierarchy(url);
        async move { result }.boxed_local()
    }

    fn load_environment(&self, url: &str) -> AssetFuture<EnvironmentMap> {
        let result = self.read_environment(url);
        async move { result }.boxed_local()
    }
}
