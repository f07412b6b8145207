//! Scene composition
//!
//! Turns a published snapshot and the classified scene into a render list.
//! Composition is a function of its explicit inputs: the snapshot, the scene,
//! and the context (catalog, material cache, loaded environments, current
//! engraving raster, camera bounds). It holds no state of its own.

use std::sync::Arc;

use crate::assets::{EnvironmentStore, MaterialCache, MaterialFactory, MaterialOptions};
use crate::core::catalog::{Catalog, CatalogKind};
use crate::error::ConfiguratorError;
use crate::render::{Camera, EngravingRaster, RenderItem, RenderList};

use super::classifier::ClassifiedScene;
use super::interpolator::{interpolate, CameraBounds};
use super::snapshot::SceneSnapshot;

/// Everything composition reads besides the snapshot and the scene
pub struct CompositionContext<'a> {
    /// Product catalog
    pub catalog: &'a Catalog,
    /// Role-to-material mapping
    pub factory: &'a MaterialFactory,
    /// Per-mesh materials, updated in place
    pub cache: &'a mut MaterialCache,
    /// Loaded environment maps
    pub environments: &'a EnvironmentStore,
    /// Current engraving raster
    pub engraving: &'a Arc<EngravingRaster>,
    /// Camera control endpoints
    pub bounds: &'a CameraBounds,
}

/// A composed frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Drawables
    pub list: RenderList,
    /// Camera to draw them with
    pub camera: Camera,
}

/// Compose `snapshot` against `scene`
///
/// Every renderable mesh gets its cached material (created on first sight,
/// updated in place afterwards) and a world transform derived from the
/// camera control.
pub fn compose(
    snapshot: &SceneSnapshot,
    scene: &ClassifiedScene,
    ctx: CompositionContext<'_>,
) -> Result<Frame, ConfiguratorError> {
    let catalog = ctx.catalog;
    let finish = catalog
        .finish(&snapshot.metal_finish)
        .ok_or_else(|| ConfiguratorError::Validation {
            field: CatalogKind::Metal.as_str(),
            key: snapshot.metal_finish.clone(),
        })?;
    let gem = catalog
        .gem(&snapshot.gem_variant)
        .ok_or_else(|| ConfiguratorError::Validation {
            field: CatalogKind::Gem.as_str(),
            key: snapshot.gem_variant.clone(),
        })?;

    let scene_environment = catalog.scene_environment.as_str();
    let options = MaterialOptions {
        finish,
        gem,
        scene_environment: ctx
            .environments
            .is_loaded(scene_environment)
            .then_some(scene_environment),
        gem_environment_loaded: ctx.environments.is_loaded(&gem.environment_map_id),
        engraving: ctx.engraving.texture(),
    };

    let view = interpolate(snapshot.camera, ctx.bounds);
    let group = view.group_transform(ctx.bounds).to_matrix();

    ctx.cache.prepare(scene.generation());
    let mut items = Vec::with_capacity(scene.arena().len());
    for (id, node, role) in scene.renderable() {
        let Some(geometry) = node.geometry.clone() else {
            continue;
        };
        let handle = ctx.cache.resolve(ctx.factory, id, &node.name, role, &options);
        let Some(params) = ctx.cache.get(handle).cloned() else {
            continue;
        };
        items.push(RenderItem {
            mesh: id,
            name: node.name.clone(),
            geometry,
            transform: group * node.model_transform.to_matrix(),
            material: handle,
            params,
        });
    }

    log::debug!(
        "Composed {} items for model '{}' (revision {})",
        items.len(),
        snapshot.model_variant,
        snapshot.revision
    );

    Ok(Frame {
        list: RenderList {
            items,
            engraving: Arc::clone(ctx.engraving),
            revision: snapshot.revision,
        },
        camera: Camera::from_view(&view, ctx.bounds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{EnvironmentMap, Geometry, MeshArena, MeshHierarchy, MeshNode};
    use crate::core::config::EngravingConfig;
    use crate::foundation::collections::GenerationTag;
    use crate::render::text::{BlockFace, EngravingRasterizer, RasterParams};
    use crate::scene::classifier::{GemKind, MeshRole};
    use crate::scene::snapshot::EngravingState;
    use approx::assert_relative_eq;

    struct Fixture {
        catalog: Catalog,
        factory: MaterialFactory,
        cache: MaterialCache,
        environments: EnvironmentStore,
        rasterizer: EngravingRasterizer,
        bounds: CameraBounds,
        scene: ClassifiedScene,
    }

    impl Fixture {
        fn new() -> Self {
            let geometry = Arc::new(Geometry {
                name: "g".to_string(),
                vertex_count: 3,
            });
            let arena = MeshArena::mount(MeshHierarchy::new(vec![
                MeshNode::group("Root"),
                MeshNode::mesh("Band", geometry.clone()).with_parent(0),
                MeshNode::mesh("Ruby_Center", geometry.clone()).with_parent(0),
                MeshNode::mesh("Demos_Trim", geometry).with_parent(0),
            ]))
            .unwrap();
            let config = EngravingConfig::default().with_raster_size(64, 64);
            Self {
                catalog: Catalog::default(),
                factory: MaterialFactory::new(config.roughness_multiplier),
                cache: MaterialCache::new(),
                environments: EnvironmentStore::new(),
                rasterizer: EngravingRasterizer::new(RasterParams::from(&config), Box::new(BlockFace)),
                bounds: CameraBounds::default(),
                scene: ClassifiedScene::new(arena, GenerationTag(1)),
            }
        }

        fn compose(&mut self, snapshot: &SceneSnapshot) -> Frame {
            compose(
                snapshot,
                &self.scene,
                CompositionContext {
                    catalog: &self.catalog,
                    factory: &self.factory,
                    cache: &mut self.cache,
                    environments: &self.environments,
                    engraving: self.rasterizer.current(),
                    bounds: &self.bounds,
                },
            )
            .unwrap()
        }
    }

    fn snapshot() -> SceneSnapshot {
        SceneSnapshot {
            model_variant: "minimal".to_string(),
            metal_finish: "925-silver".to_string(),
            gem_variant: "ruby".to_string(),
            engraving: EngravingState::default(),
            camera: 0.0,
            revision: 1,
        }
    }

    #[test]
    fn test_compose_skips_groups_and_keeps_order() {
        let mut fixture = Fixture::new();
        let frame = fixture.compose(&snapshot());
        let names: Vec<_> = frame.list.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Band", "Ruby_Center", "Demos_Trim"]);
        assert_eq!(frame.list.revision, 1);
    }

    #[test]
    fn test_compose_is_deterministic_and_reuses_handles() {
        let mut fixture = Fixture::new();
        let first = fixture.compose(&snapshot());
        let second = fixture.compose(&snapshot());

        for (a, b) in first.list.items.iter().zip(&second.list.items) {
            assert_eq!(a.material, b.material);
            assert_eq!(a.params, b.params);
            assert_eq!(a.transform, b.transform);
        }
        assert_eq!(first.camera, second.camera);
        assert_eq!(fixture.cache.allocations(), 3);
    }

    #[test]
    fn test_gem_environment_binds_once_loaded() {
        let mut fixture = Fixture::new();
        let frame = fixture.compose(&snapshot());
        let gem = &frame.list.items[1].params;
        assert_eq!(gem.as_refractive().unwrap().kind, GemKind::Ruby);
        assert!(!gem.as_refractive().unwrap().environment_bound);

        fixture.environments.begin_fetch("ruby-studio");
        fixture
            .environments
            .complete("ruby-studio", EnvironmentMap::solid([1.0, 1.0, 1.0]));
        let frame = fixture.compose(&snapshot());
        assert!(frame.list.items[1].params.as_refractive().unwrap().environment_bound);
        assert_eq!(frame.list.items[0].params.as_metal().unwrap().environment, None);
    }

    #[test]
    fn test_engraving_reaches_only_metal() {
        let mut fixture = Fixture::new();
        let mut state = snapshot();
        state.engraving.text = "Forever".to_string();
        fixture.rasterizer.update(&state.engraving);

        let frame = fixture.compose(&state);
        let engraved: Vec<_> = frame.list.engraved().map(|i| i.name.as_str()).collect();
        assert_eq!(engraved, ["Band"]);
        assert_eq!(fixture.scene.role(frame.list.items[2].mesh), MeshRole::Decorative);
    }

    #[test]
    fn test_camera_control_moves_camera_and_group() {
        let mut fixture = Fixture::new();
        let far = fixture.compose(&snapshot());
        let near = fixture.compose(&SceneSnapshot {
            camera: 1.0,
            ..snapshot()
        });

        assert_relative_eq!(far.camera.position.z, 5.0);
        assert_relative_eq!(near.camera.position.z, 1.5);
        assert_relative_eq!(far.list.items[0].transform[(1, 3)], -0.5);
        assert_relative_eq!(near.list.items[0].transform[(1, 3)], 0.0);
        assert_relative_eq!(near.list.items[0].transform[(0, 0)], 50.0);
    }

    #[test]
    fn test_unknown_finish_in_snapshot_is_rejected() {
        let mut fixture = Fixture::new();
        let result = compose(
            &SceneSnapshot {
                metal_finish: "bronze".to_string(),
                ..snapshot()
            },
            &fixture.scene,
            CompositionContext {
                catalog: &fixture.catalog,
                factory: &fixture.factory,
                cache: &mut fixture.cache,
                environments: &fixture.environments,
                engraving: fixture.rasterizer.current(),
                bounds: &fixture.bounds,
            },
        );
        assert!(matches!(result, Err(ConfiguratorError::Validation { .. })));
    }
}
