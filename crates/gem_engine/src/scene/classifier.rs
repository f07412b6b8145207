//! Mesh classification
//!
//! Maps a mesh display name to the role that decides which material it gets.
//! Matching is a case-insensitive substring test against a priority-ordered
//! keyword table: gemstones first, then decorative parts, and everything else
//! is metal. The function is total and stateless.

use std::fmt;

use crate::assets::mesh::{MeshArena, MountedMesh};
use crate::foundation::collections::{GenerationTag, MeshId, SecondaryMap};

/// Gemstone kind recognised from a mesh name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GemKind {
    /// Diamond
    Diamond,
    /// Ruby
    Ruby,
    /// Emerald
    Emerald,
    /// Sapphire
    Sapphire,
}

impl fmt::Display for GemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Diamond => "diamond",
            Self::Ruby => "ruby",
            Self::Emerald => "emerald",
            Self::Sapphire => "sapphire",
        };
        f.write_str(name)
    }
}

/// Material role of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshRole {
    /// Refractive gemstone
    Gem(GemKind),
    /// Engravable metal body
    Metal,
    /// Metal trim that never carries the engraving
    Decorative,
    /// Node without geometry; receives no material
    Unclassified,
}

impl MeshRole {
    /// Whether meshes with this role are drawn
    pub fn is_renderable(self) -> bool {
        !matches!(self, Self::Unclassified)
    }
}

const ROLE_KEYWORDS: &[(&str, MeshRole)] = &[
    ("diamond", MeshRole::Gem(GemKind::Diamond)),
    ("ruby", MeshRole::Gem(GemKind::Ruby)),
    ("emerald", MeshRole::Gem(GemKind::Emerald)),
    ("sapphire", MeshRole::Gem(GemKind::Sapphire)),
    ("demos", MeshRole::Decorative),
];

/// Classify a mesh by its display name
///
/// Never returns [`MeshRole::Unclassified`]; unmatched names (including the
/// empty string) are [`MeshRole::Metal`].
pub fn classify(name: &str) -> MeshRole {
    let name = name.to_lowercase();
    ROLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| name.contains(keyword))
        .map_or(MeshRole::Metal, |&(_, role)| role)
}

/// A mounted model with a role for every node
///
/// Roles are computed once when the model is mounted and discarded with it.
#[derive(Debug)]
pub struct ClassifiedScene {
    arena: MeshArena,
    roles: SecondaryMap<MeshId, MeshRole>,
    generation: GenerationTag,
}

impl ClassifiedScene {
    /// Classify every node of a freshly mounted arena
    ///
    /// Nodes without geometry are [`MeshRole::Unclassified`]; all others are
    /// classified by name.
    pub fn new(arena: MeshArena, generation: GenerationTag) -> Self {
        let mut roles = SecondaryMap::with_capacity(arena.len());
        for (id, node) in arena.iter() {
            let role = match node.geometry {
                Some(_) => classify(&node.name),
                None => MeshRole::Unclassified,
            };
            log::debug!("Mesh '{}' classified as {:?}", node.name, role);
            roles.insert(id, role);
        }
        Self {
            arena,
            roles,
            generation,
        }
    }

    /// The mounted arena
    pub fn arena(&self) -> &MeshArena {
        &self.arena
    }

    /// Mount generation this scene belongs to
    pub fn generation(&self) -> GenerationTag {
        self.generation
    }

    /// Role of a node (`Unclassified` for unknown ids)
    pub fn role(&self, id: MeshId) -> MeshRole {
        self.roles.get(id).copied().unwrap_or(MeshRole::Unclassified)
    }

    /// Renderable nodes in arena order
    pub fn renderable(&self) -> impl Iterator<Item = (MeshId, &MountedMesh, MeshRole)> {
        self.arena
            .iter()
            .map(move |(id, node)| (id, node, self.role(id)))
            .filter(|(_, _, role)| role.is_renderable())
    }

    /// Number of nodes with `role`
    pub fn count(&self, role: MeshRole) -> usize {
        self.roles.values().filter(|&&r| r == role).count()
    }
}
