//! Configurator runtime
//!
//! [`Configurator`] is the single cooperative apply loop. It owns the
//! configuration channel, material cache, engraving rasterizer and the
//! mounted scene, and it is the only place asset fetches are started and
//! resolved. Fetches are futures polled alongside inbound messages, so a slow
//! model download never blocks message handling.
//!
//! Recompute rules after each published snapshot:
//!
//! | field changed | work |
//! |---|---|
//! | model variant | fetch the model (tagged with a new generation) |
//! | gem variant | fetch its environment map if not loaded |
//! | engraving | regenerate the raster |
//! | any | recompose against the mounted model |

use std::sync::Arc;

use futures::channel::mpsc;
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{select, FutureExt, Stream, StreamExt};

use crate::assets::{
    AssetError, AssetLoader, EnvironmentMap, EnvironmentStore, MaterialCache, MaterialFactory, MeshArena,
    MeshHierarchy,
};
use crate::core::catalog::{Catalog, CatalogKind};
use crate::core::config::{ConfigError, ConfiguratorConfig};
use crate::error::{ConfiguratorError, ErrorReporter, LogReporter};
use crate::events::{
    initial_snapshot, parse_message, ConfigurationChannel, HostMessage, HostSink, InboundEnvelope,
    OutboundMessage, Recipient, SnapshotUpdate,
};
use crate::foundation::collections::{GenerationCounter, GenerationTag};
use crate::render::text::{EngravingRasterizer, GlyphSource, RasterParams};
use crate::render::Renderer;
use crate::scene::interpolator::CameraBounds;
use crate::scene::scene_composer::{compose, CompositionContext, Frame};
use crate::scene::snapshot::{SceneSnapshot, SnapshotField};
use crate::scene::ClassifiedScene;

/// Outcome of an asset fetch
enum FetchResult {
    Model {
        tag: GenerationTag,
        variant: String,
        result: Result<MeshHierarchy, AssetError>,
    },
    Environment {
        id: String,
        result: Result<EnvironmentMap, AssetError>,
    },
}

/// The currently mounted model
struct MountedModel {
    variant: String,
    scene: ClassifiedScene,
}

/// The configurator runtime
pub struct Configurator<L, R, S> {
    catalog: Arc<Catalog>,
    loader: L,
    renderer: R,
    sink: S,
    reporter: Box<dyn ErrorReporter>,

    channel: ConfigurationChannel,
    updates: mpsc::UnboundedReceiver<SnapshotUpdate>,

    factory: MaterialFactory,
    cache: MaterialCache,
    environments: EnvironmentStore,
    rasterizer: EngravingRasterizer,
    bounds: CameraBounds,

    model_generations: GenerationCounter,
    pending_model: Option<(GenerationTag, String)>,
    mounted: Option<MountedModel>,
    fetches: FuturesUnordered<LocalBoxFuture<'static, FetchResult>>,

    last_frame: Option<Frame>,
    started: bool,
}

impl<L: AssetLoader, R: Renderer, S: HostSink> Configurator<L, R, S> {
    /// Build a runtime from a validated configuration
    pub fn new(
        config: ConfiguratorConfig,
        glyphs: Box<dyn GlyphSource>,
        loader: L,
        renderer: R,
        sink: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let catalog = Arc::new(config.resolved_catalog()?);
        let initial = initial_snapshot(&catalog, &config.defaults, config.engraving.defaults.clone());
        let mut channel = ConfigurationChannel::new(
            Arc::clone(&catalog),
            initial,
            config.engraving.reset_on_model_change,
        )
        .with_engraving_limits(config.engraving.limits());
        let updates = channel.subscribe();

        log::info!(
            "Configurator created: {} models, {} finishes, {} gems",
            catalog.models.len(),
            catalog.finishes.len(),
            catalog.gems.len()
        );

        Ok(Self {
            catalog,
            loader,
            renderer,
            sink,
            reporter: Box::new(LogReporter),
            channel,
            updates,
            factory: MaterialFactory::new(config.engraving.roughness_multiplier),
            cache: MaterialCache::new(),
            environments: EnvironmentStore::new(),
            rasterizer: EngravingRasterizer::new(RasterParams::from(&config.engraving), glyphs),
            bounds: config.camera,
            model_generations: GenerationCounter::new(),
            pending_model: None,
            mounted: None,
            fetches: FuturesUnordered::new(),
            last_frame: None,
            started: false,
        })
    }

    /// Replace the error reporter
    pub fn with_reporter(mut self, reporter: Box<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Announce readiness and start loading the initial selection
    ///
    /// Called automatically by [`Configurator::run`]; calling it again has no
    /// effect.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let snapshot = Arc::clone(self.channel.snapshot());
        let scene_environment = self.catalog.scene_environment.clone();
        self.ensure_environment(&scene_environment);
        self.on_update(&snapshot, SnapshotField::GemVariant);
        self.on_update(&snapshot, SnapshotField::Engraving);
        self.on_update(&snapshot, SnapshotField::ModelVariant);

        log::info!("Configurator ready");
        self.sink.post(Recipient::Host, &OutboundMessage::Ready);
    }

    /// Handle one inbound host message
    pub fn handle_message(&mut self, envelope: InboundEnvelope) {
        match parse_message(&envelope.payload) {
            Ok(HostMessage::Command(command)) => {
                log::debug!("Applying {:?} from {:?}", command, envelope.origin);
                self.channel.submit(command, self.reporter.as_mut());
                self.process_updates();
            }
            Ok(HostMessage::GetEngravingText) => {
                let text = self.channel.snapshot().engraving.text.clone();
                self.sink.post(
                    Recipient::Sender(envelope.origin),
                    &OutboundMessage::CurrentEngravingText { text },
                );
            }
            Ok(HostMessage::Unknown(kind)) => {
                log::debug!("Ignoring message of unknown type '{}'", kind);
            }
            Err(error) => self.reporter.report(error),
        }
    }

    /// Resolve every fetch that has already completed, without waiting
    ///
    /// Returns the number of fetches resolved.
    pub fn pump(&mut self) -> usize {
        let mut resolved = 0;
        while let Some(Some(result)) = self.fetches.next().now_or_never() {
            self.handle_fetch(result);
            resolved += 1;
        }
        resolved
    }

    /// Run until `inbound` ends, then finish outstanding fetches
    pub async fn run<St>(&mut self, inbound: St)
    where
        St: Stream<Item = InboundEnvelope> + Unpin,
    {
        self.start();
        let mut inbound = inbound.fuse();

        loop {
            select! {
                envelope = inbound.next() => match envelope {
                    Some(envelope) => self.handle_message(envelope),
                    None => break,
                },
                result = self.fetches.select_next_some() => self.handle_fetch(result),
                complete => break,
            }
        }

        while let Some(result) = self.fetches.next().await {
            self.handle_fetch(result);
        }
        log::info!("Inbound stream closed; configurator stopped");
    }

    fn process_updates(&mut self) {
        let mut changed = false;
        while let Ok(Some(update)) = self.updates.try_next() {
            self.on_update(&update.snapshot, update.field);
            changed = true;
        }
        if changed {
            self.recompose();
        }
    }

    fn on_update(&mut self, snapshot: &SceneSnapshot, field: SnapshotField) {
        match field {
            SnapshotField::ModelVariant => self.request_model(&snapshot.model_variant),
            SnapshotField::GemVariant => {
                if let Some(gem) = self.catalog.gem(&snapshot.gem_variant) {
                    let environment = gem.environment_map_id.clone();
                    self.ensure_environment(&environment);
                }
            }
            SnapshotField::Engraving => {
                self.rasterizer.update(&snapshot.engraving);
            }
            SnapshotField::MetalFinish | SnapshotField::Camera => {}
        }
    }

    fn request_model(&mut self, variant: &str) {
        let already_requested = match &self.pending_model {
            Some((_, pending)) => pending == variant,
            None => self.mounted.as_ref().is_some_and(|m| m.variant == variant),
        };
        if already_requested {
            return;
        }

        let Some(model) = self.catalog.model(variant) else {
            self.reporter.report(ConfiguratorError::Validation {
                field: CatalogKind::Model.as_str(),
                key: variant.to_string(),
            });
            return;
        };

        let tag = self.model_generations.advance();
        let variant = variant.to_string();
        log::info!("Fetching model '{}' from {} ({:?})", variant, model.url, tag);
        self.pending_model = Some((tag, variant.clone()));

        let load = self.loader.load(&model.url);
        self.fetches.push(
            async move {
                FetchResult::Model {
                    tag,
                    variant,
                    result: load.await,
                }
            }
            .boxed_local(),
        );
    }

    fn ensure_environment(&mut self, id: &str) {
        let Some(source) = self.catalog.environment(id) else {
            self.reporter.report(ConfiguratorError::Validation {
                field: CatalogKind::Environment.as_str(),
                key: id.to_string(),
            });
            return;
        };
        if !self.environments.begin_fetch(id) {
            return;
        }

        log::debug!("Fetching environment '{}' from {}", id, source.url);
        let id = id.to_string();
        let load = self.loader.load_environment(&source.url);
        self.fetches.push(
            async move {
                FetchResult::Environment {
                    id,
                    result: load.await,
                }
            }
            .boxed_local(),
        );
    }

    fn handle_fetch(&mut self, fetch: FetchResult) {
        match fetch {
            FetchResult::Model { tag, variant, result } => {
                if !self.model_generations.is_current(tag) {
                    self.reporter.report(ConfiguratorError::StaleResponse {
                        tag,
                        current: self.model_generations.current(),
                    });
                    return;
                }
                self.pending_model = None;

                match result.and_then(MeshArena::mount) {
                    Ok(arena) => {
                        let scene = ClassifiedScene::new(arena, tag);
                        log::info!(
                            "Mounted model '{}': {} nodes, {} renderable",
                            variant,
                            scene.arena().len(),
                            scene.renderable().count()
                        );
                        self.cache.prepare(tag);
                        self.mounted = Some(MountedModel { variant, scene });
                        self.recompose();
                    }
                    Err(error) => {
                        log::warn!("Model '{}' failed to load; keeping the current model", variant);
                        self.reporter.report(error.into());
                    }
                }
            }
            FetchResult::Environment { id, result } => match result {
                Ok(map) => {
                    log::info!("Environment '{}' loaded ({}x{})", id, map.width, map.height);
                    self.environments.complete(&id, map);
                    self.recompose();
                }
                Err(error) => {
                    self.environments.fail(&id);
                    self.reporter.report(error.into());
                }
            },
        }
    }

    fn recompose(&mut self) {
        let Some(mounted) = &self.mounted else {
            return;
        };

        let snapshot = Arc::clone(self.channel.snapshot());
        let frame = compose(
            &snapshot,
            &mounted.scene,
            CompositionContext {
                catalog: &self.catalog,
                factory: &self.factory,
                cache: &mut self.cache,
                environments: &self.environments,
                engraving: self.rasterizer.current(),
                bounds: &self.bounds,
            },
        );

        match frame {
            Ok(frame) => {
                self.renderer.render(&frame.list, &frame.camera);
                self.last_frame = Some(frame);
            }
            Err(error) => self.reporter.report(error),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> &Arc<SceneSnapshot> {
        self.channel.snapshot()
    }

    /// Most recently composed frame
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Variant id of the mounted model
    pub fn mounted_model(&self) -> Option<&str> {
        self.mounted.as_ref().map(|m| m.variant.as_str())
    }

    /// Whether a model fetch is outstanding
    pub fn is_model_pending(&self) -> bool {
        self.pending_model.is_some()
    }

    /// Number of fetches not yet resolved
    pub fn pending_fetches(&self) -> usize {
        self.fetches.len()
    }

    /// Material cache
    pub fn material_cache(&self) -> &MaterialCache {
        &self.cache
    }

    /// Engraving rasterizer
    pub fn rasterizer(&self) -> &EngravingRasterizer {
        &self.rasterizer
    }

    /// Loaded environments
    pub fn environments(&self) -> &EnvironmentStore {
        &self.environments
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Host sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
