//! Role-driven material construction and in-place update
//!
//! `MaterialFactory` knows how each mesh role maps onto material parameters.
//! It never decides *whether* a material is created; the cache does that and
//! calls [`MaterialFactory::apply`] for both fresh and existing materials, so
//! construction and reconfiguration share one code path.

use crate::core::catalog::{GemVariant, MetalFinish};
use crate::render::material::{
    ChannelBindings, Material, MaterialType, MetalParams, RefractiveParams, TextureHandle,
};
use crate::scene::classifier::{GemKind, MeshRole};

/// Everything a material depends on besides its mesh role
#[derive(Debug, Clone, Copy)]
pub struct MaterialOptions<'a> {
    /// Active metal finish
    pub finish: &'a MetalFinish,
    /// Active gem variant
    pub gem: &'a GemVariant,
    /// Scene environment id, if loaded
    pub scene_environment: Option<&'a str>,
    /// Whether the active gem's environment map is loaded
    pub gem_environment_loaded: bool,
    /// Active (non-baseline) engraving raster, if any
    pub engraving: Option<TextureHandle>,
}

/// Builds and updates materials from roles and options
#[derive(Debug, Clone)]
pub struct MaterialFactory {
    engraving_roughness_multiplier: f32,
}

impl MaterialFactory {
    /// Create a factory
    ///
    /// `engraving_roughness_multiplier` scales metal roughness while the
    /// engraving raster is bound.
    pub fn new(engraving_roughness_multiplier: f32) -> Self {
        Self {
            engraving_roughness_multiplier,
        }
    }

    /// Build a new material for `role`
    pub fn build(&self, name: &str, role: MeshRole, options: &MaterialOptions<'_>) -> Material {
        let mut material = Material::metal(MetalParams::default()).with_name(name);
        self.apply(&mut material, role, options);
        material.revision = 0;
        material
    }

    /// Update `material` in place to reflect `role` and `options`
    ///
    /// Returns whether anything changed; the revision is bumped if so.
    pub fn apply(&self, material: &mut Material, role: MeshRole, options: &MaterialOptions<'_>) -> bool {
        let before_type = material.material_type.clone();
        let before_textures = material.textures;

        match role {
            MeshRole::Gem(kind) => self.apply_gem(material, kind, options),
            MeshRole::Metal => self.apply_metal(material, true, options),
            MeshRole::Decorative | MeshRole::Unclassified => {
                self.apply_metal(material, false, options);
            }
        }

        let changed =
            material.material_type != before_type || material.textures != before_textures;
        if changed {
            material.revision += 1;
        }
        changed
    }

    fn apply_metal(&self, material: &mut Material, engravable: bool, options: &MaterialOptions<'_>) {
        let finish = options.finish;
        if !matches!(material.material_type, MaterialType::Metal(_)) {
            material.material_type = MaterialType::Metal(MetalParams::default());
        }
        let MaterialType::Metal(params) = &mut material.material_type else {
            return;
        };

        params.color = finish.color;
        params.metalness = 1.0;
        params.env_intensity = 1.0;
        params.double_sided = true;
        params.environment = options.scene_environment.map(str::to_string);

        match options.engraving.filter(|_| engravable) {
            Some(texture) => {
                material
                    .textures
                    .bind(texture, ChannelBindings::DIFFUSE | ChannelBindings::ROUGHNESS);
                params.roughness =
                    (finish.roughness * self.engraving_roughness_multiplier).clamp(0.0, 1.0);
            }
            None => {
                material.textures.clear();
                params.roughness = finish.roughness;
            }
        }
    }

    fn apply_gem(&self, material: &mut Material, kind: GemKind, options: &MaterialOptions<'_>) {
        let gem = options.gem;
        let next = RefractiveParams {
            kind,
            bounces: gem.bounces,
            ior: gem.ior,
            fresnel: gem.fresnel,
            aberration: gem.aberration,
            color: gem.color,
            fast_chroma: gem.fast_chroma,
            tone_mapped: gem.tone_mapped,
            environment_map_id: gem.environment_map_id.clone(),
            environment_bound: options.gem_environment_loaded,
        };

        match &mut material.material_type {
            MaterialType::Refractive(params) => *params = next,
            other => *other = MaterialType::Refractive(next),
        }
        material.textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use approx::assert_relative_eq;

    fn options<'a>(catalog: &'a Catalog, finish: &str, gem: &str) -> MaterialOptions<'a> {
        MaterialOptions {
            finish: catalog.finish(finish).unwrap(),
            gem: catalog.gem(gem).unwrap(),
            scene_environment: Some("studio"),
            gem_environment_loaded: true,
            engraving: None,
        }
    }

    #[test]
    fn test_metal_uses_finish() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let material = factory.build("band", MeshRole::Metal, &options(&catalog, "925-silver", "ruby"));

        let metal = material.as_metal().unwrap();
        assert_eq!(metal.color, catalog.finish("925-silver").unwrap().color);
        assert_relative_eq!(metal.roughness, 0.2);
        assert_relative_eq!(metal.metalness, 1.0);
        assert_eq!(metal.environment.as_deref(), Some("studio"));
        assert_eq!(material.revision, 0);
    }

    #[test]
    fn test_gem_uses_variant_and_its_environment() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let material = factory.build(
            "stone",
            MeshRole::Gem(GemKind::Ruby),
            &options(&catalog, "925-silver", "ruby"),
        );

        let gem = material.as_refractive().unwrap();
        assert_relative_eq!(gem.ior, 1.77);
        assert_eq!(gem.bounces, 3);
        assert_eq!(gem.environment_map_id, "ruby-studio");
        assert!(gem.environment_bound);
        assert_eq!(gem.kind, GemKind::Ruby);
    }

    #[test]
    fn test_engraving_binds_and_unbinds_on_metal() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let texture = TextureHandle { id: 0, generation: 7 };

        let mut opts = options(&catalog, "14k-gold-plating", "real-diamond");
        let mut material = factory.build("band", MeshRole::Metal, &opts);

        opts.engraving = Some(texture);
        assert!(factory.apply(&mut material, MeshRole::Metal, &opts));
        assert_eq!(material.bound_texture(), Some(texture));
        assert!(material.textures.drives(ChannelBindings::DIFFUSE));
        assert!(material.textures.drives(ChannelBindings::ROUGHNESS));
        assert_eq!(material.textures.channels, ChannelBindings::all());
        assert_relative_eq!(material.as_metal().unwrap().roughness, 0.375);

        opts.engraving = None;
        assert!(factory.apply(&mut material, MeshRole::Metal, &opts));
        assert_eq!(material.bound_texture(), None);
        assert!(material.textures.channels.is_empty());
        assert_relative_eq!(material.as_metal().unwrap().roughness, 0.25);
        assert_eq!(material.revision, 2);
    }

    #[test]
    fn test_decorative_never_carries_engraving() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let mut opts = options(&catalog, "18k-solid-gold", "real-diamond");
        opts.engraving = Some(TextureHandle { id: 0, generation: 1 });

        let material = factory.build("trim", MeshRole::Decorative, &opts);
        assert_eq!(material.bound_texture(), None);
        assert_relative_eq!(material.as_metal().unwrap().roughness, 0.05);
    }

    #[test]
    fn test_roughness_multiplier_is_clamped() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(10.0);
        let mut opts = options(&catalog, "stainless-steel", "real-diamond");
        opts.engraving = Some(TextureHandle { id: 0, generation: 1 });

        let material = factory.build("band", MeshRole::Metal, &opts);
        assert_relative_eq!(material.as_metal().unwrap().roughness, 1.0);
    }

    #[test]
    fn test_unchanged_options_do_not_bump_revision() {
        let catalog = Catalog::default();
        let factory = MaterialFactory::new(1.5);
        let opts = options(&catalog, "925-silver", "real-diamond");
        let mut material = factory.build("band", MeshRole::Metal, &opts);
        assert!(!factory.apply(&mut material, MeshRole::Metal, &opts));
        assert_eq!(material.revision, 0);
    }
}
