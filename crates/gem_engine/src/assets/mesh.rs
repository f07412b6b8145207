//! Decoded mesh hierarchies and the flat arena they are mounted into
//!
//! Loaders hand back a [`MeshHierarchy`]: a flat, parent-before-child list of
//! nodes. Mounting turns it into a [`MeshArena`] addressed by opaque
//! [`MeshId`]s, so materials and roles live in id-indexed side tables and no
//! node ever owns another.

use std::sync::Arc;

use super::AssetError;
use crate::foundation::collections::{MeshId, SlotMap};
use crate::foundation::math::Transform;

/// Opaque GPU-side geometry produced by the asset decoder
#[derive(Debug, PartialEq)]
pub struct Geometry {
    /// Decoder-assigned name (used in logs)
    pub name: String,
    /// Number of vertices
    pub vertex_count: usize,
}

/// One decoded node
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Display name used for classification
    pub name: String,
    /// Index of the parent node in the same hierarchy (must precede this node)
    pub parent: Option<usize>,
    /// Geometry drawn at this node; `None` for pure transform nodes
    pub geometry: Option<Arc<Geometry>>,
    /// Transform relative to the parent
    pub local_transform: Transform,
}

impl MeshNode {
    /// Create a root node with geometry
    pub fn mesh(name: impl Into<String>, geometry: Arc<Geometry>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            geometry: Some(geometry),
            local_transform: Transform::identity(),
        }
    }

    /// Create a root node without geometry
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            geometry: None,
            local_transform: Transform::identity(),
        }
    }

    /// Attach to a parent by index
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.local_transform = transform;
        self
    }
}

/// A decoded model as returned by an asset loader
#[derive(Debug, Clone, Default)]
pub struct MeshHierarchy {
    /// Nodes, parents before children
    pub nodes: Vec<MeshNode>,
}

impl MeshHierarchy {
    /// Create a hierarchy from nodes
    pub fn new(nodes: Vec<MeshNode>) -> Self {
        Self { nodes }
    }
}

/// A mounted node
#[derive(Debug, Clone)]
pub struct MountedMesh {
    /// Display name
    pub name: String,
    /// Parent node, if any
    pub parent: Option<MeshId>,
    /// Geometry, if any
    pub geometry: Option<Arc<Geometry>>,
    /// Transform relative to the model root
    pub model_transform: Transform,
}

/// Flat arena of mounted nodes
#[derive(Debug, Default)]
pub struct MeshArena {
    nodes: SlotMap<MeshId, MountedMesh>,
    order: Vec<MeshId>,
}

impl MeshArena {
    /// Mount a decoded hierarchy
    ///
    /// Fails if a node references a parent that does not precede it.
    pub fn mount(hierarchy: MeshHierarchy) -> Result<Self, AssetError> {
        let mut nodes = SlotMap::with_capacity_and_key(hierarchy.nodes.len());
        let mut order: Vec<MeshId> = Vec::with_capacity(hierarchy.nodes.len());

        for (index, node) in hierarchy.nodes.into_iter().enumerate() {
            let (parent, model_transform) = match node.parent {
                Some(parent_index) if parent_index < index => {
                    let parent_id = order[parent_index];
                    let parent_node: &MountedMesh = &nodes[parent_id];
                    (
                        Some(parent_id),
                        parent_node.model_transform.combine(&node.local_transform),
                    )
                }
                Some(parent_index) => {
                    return Err(AssetError::Decode(format!(
                        "node {index} ('{}') references parent {parent_index} which does not precede it",
                        node.name
                    )));
                }
                None => (None, node.local_transform),
            };

            let id = nodes.insert(MountedMesh {
                name: node.name,
                parent,
                geometry: node.geometry,
                model_transform,
            });
            order.push(id);
        }

        Ok(Self { nodes, order })
    }

    /// Node by id
    pub fn get(&self, id: MeshId) -> Option<&MountedMesh> {
        self.nodes.get(id)
    }

    /// Iterate nodes in hierarchy order
    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &MountedMesh)> {
        self.order.iter().map(move |&id| (id, &self.nodes[id]))
    }

    /// Number of mounted nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
