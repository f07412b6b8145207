//! Per-mesh material cache
//!
//! Each mounted mesh owns at most one cached material for the lifetime of a
//! model mount. Reconfiguration mutates that material in place; a fresh
//! allocation only happens the first time a mesh is seen or after the cache
//! is reset for a new model.

use super::{MaterialFactory, MaterialOptions};
use crate::foundation::collections::{GenerationTag, MaterialKey, MeshId, SecondaryMap, SlotMap};
use crate::render::material::{Material, MaterialHandle};
use crate::scene::classifier::MeshRole;

/// Which mesh a cached material belongs to and the role it was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialRecord {
    /// Owning mesh
    pub owner: MeshId,
    /// Role the material currently reflects
    pub role: MeshRole,
    /// Handle into the cache
    pub handle: MaterialHandle,
}

/// Material storage keyed by mesh identity
#[derive(Debug, Default)]
pub struct MaterialCache {
    materials: SlotMap<MaterialKey, Material>,
    records: SecondaryMap<MeshId, MaterialRecord>,
    allocations: u64,
    generation: GenerationTag,
}

impl MaterialCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the cache to a model mount
    ///
    /// Mesh ids from different arenas can collide, so the cache drops every
    /// entry when the mount generation changes.
    pub fn prepare(&mut self, generation: GenerationTag) {
        if generation != self.generation {
            log::debug!(
                "Material cache reset for mount {:?} (was {:?}, {} materials)",
                generation,
                self.generation,
                self.materials.len()
            );
            self.clear();
            self.generation = generation;
        }
    }

    /// Return the material for `mesh`, creating it on first use
    ///
    /// Repeated calls for the same mesh return the same handle; the material
    /// behind it is updated in place to reflect `role` and `options`.
    pub fn resolve(
        &mut self,
        factory: &MaterialFactory,
        mesh: MeshId,
        name: &str,
        role: MeshRole,
        options: &MaterialOptions<'_>,
    ) -> MaterialHandle {
        if let Some(record) = self.records.get_mut(mesh) {
            if let Some(material) = self.materials.get_mut(record.handle.0) {
                if factory.apply(material, role, options) {
                    log::trace!("Material for '{}' updated to revision {}", name, material.revision);
                }
                record.role = role;
                return record.handle;
            }
        }

        let material = factory.build(name, role, options);
        let handle = MaterialHandle(self.materials.insert(material));
        self.allocations += 1;
        self.records.insert(
            mesh,
            MaterialRecord {
                owner: mesh,
                role,
                handle,
            },
        );
        log::trace!("Allocated material for '{}' ({:?})", name, role);
        handle
    }

    /// Material behind a handle
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    /// Cache record for a mesh
    pub fn record(&self, mesh: MeshId) -> Option<&MaterialRecord> {
        self.records.get(mesh)
    }

    /// Drop every material
    pub fn clear(&mut self) {
        self.materials.clear();
        self.records.clear();
    }

    /// Number of live materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the cache holds no materials
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Total number of materials ever allocated by this cache
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Mount generation the cache currently serves
    pub fn generation(&self) -> GenerationTag {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::mesh::{Geometry, MeshArena, MeshHierarchy, MeshNode};
    use crate::core::catalog::Catalog;
    use crate::render::material::TextureHandle;
    use crate::scene::classifier::GemKind;
    use std::sync::Arc;

    fn arena() -> MeshArena {
        let geometry = Arc::new(Geometry {
            name: "g".to_string(),
            vertex_count: 3,
        });
        MeshArena::mount(MeshHierarchy::new(vec![
            MeshNode::mesh("band", geometry.clone()),
            MeshNode::mesh("diamond", geometry),
        ]))
        .unwrap()
    }

    fn options<'a>(catalog: &'a Catalog, finish: &str) -> MaterialOptions<'a> {
        MaterialOptions {
            finish: catalog.finish(finish).unwrap(),
            gem: catalog.gem("real-diamond").unwrap(),
            scene_environment: None,
            gem_environment_loaded: false,
            engraving: None,
        }
    }

    #[test]
    fn test_same_mesh_same_handle_single_allocation() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let arena = arena();
        let (band, _) = arena.iter().next().unwrap();

        let mut cache = MaterialCache::new();
        let first = cache.resolve(&factory, band, "band", MeshRole::Metal, &options(&catalog, "925-silver"));
        let second =
            cache.resolve(&factory, band, "band", MeshRole::Metal, &options(&catalog, "18k-solid-gold"));
        let third =
            cache.resolve(&factory, band, "band", MeshRole::Metal, &options(&catalog, "stainless-steel"));

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(cache.allocations(), 1);
        assert_eq!(cache.len(), 1);

        let metal = cache.get(third).unwrap().as_metal().unwrap();
        assert_eq!(metal.color, catalog.finish("stainless-steel").unwrap().color);
        assert_eq!(cache.get(third).unwrap().revision, 2);
    }

    #[test]
    fn test_distinct_meshes_get_distinct_materials() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let arena = arena();
        let ids: Vec<_> = arena.iter().map(|(id, _)| id).collect();

        let mut cache = MaterialCache::new();
        let opts = options(&catalog, "925-silver");
        let band = cache.resolve(&factory, ids[0], "band", MeshRole::Metal, &opts);
        let gem = cache.resolve(&factory, ids[1], "diamond", MeshRole::Gem(GemKind::Diamond), &opts);

        assert_ne!(band, gem);
        assert!(cache.get(gem).unwrap().as_refractive().is_some());
        assert_eq!(cache.record(ids[1]).unwrap().role, MeshRole::Gem(GemKind::Diamond));
        assert_eq!(cache.record(ids[1]).unwrap().owner, ids[1]);
    }

    #[test]
    fn test_engraving_toggle_keeps_handle() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let arena = arena();
        let (band, _) = arena.iter().next().unwrap();
        let mut cache = MaterialCache::new();

        let mut opts = options(&catalog, "925-silver");
        let plain = cache.resolve(&factory, band, "band", MeshRole::Metal, &opts);
        opts.engraving = Some(TextureHandle { id: 0, generation: 3 });
        let engraved = cache.resolve(&factory, band, "band", MeshRole::Metal, &opts);

        assert_eq!(plain, engraved);
        assert_eq!(
            cache.get(engraved).unwrap().bound_texture(),
            Some(TextureHandle { id: 0, generation: 3 })
        );
        assert_eq!(cache.allocations(), 1);
    }

    #[test]
    fn test_prepare_resets_on_new_mount() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let arena = arena();
        let (band, _) = arena.iter().next().unwrap();
        let mut cache = MaterialCache::new();
        let opts = options(&catalog, "925-silver");

        cache.prepare(GenerationTag(1));
        cache.resolve(&factory, band, "band", MeshRole::Metal, &opts);
        cache.prepare(GenerationTag(1));
        assert_eq!(cache.len(), 1);

        cache.prepare(GenerationTag(2));
        assert!(cache.is_empty());
        assert!(cache.record(band).is_none());
        cache.resolve(&factory, band, "band", MeshRole::Metal, &opts);
        assert_eq!(cache.allocations(), 2);
        assert_eq!(cache.generation(), GenerationTag(2));
    }
}
