//! Pipeline scenarios
//!
//! Drive a [`Configurator`] end to end with a scripted asset loader whose
//! fetches resolve only when a test says so, a renderer that records frames
//! and a sink that records outbound messages.

mod fetch_ordering;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::FutureExt;

use crate::assets::{AssetError, AssetFuture, AssetLoader, EnvironmentMap, Geometry, MeshHierarchy, MeshNode};
use crate::core::catalog::Catalog;
use crate::core::config::{ConfiguratorConfig, EngravingConfig};
use crate::events::{HostSink, InboundEnvelope, OutboundMessage, Recipient, SenderId};
use crate::render::text::BlockFace;
use crate::render::{Camera, RenderList, Renderer};
use crate::{Configurator, ConfiguratorError};

type Pending<T> = Vec<(String, oneshot::Sender<Result<T, AssetError>>)>;

#[derive(Default)]
struct LoaderState {
    models: Pending<MeshHierarchy>,
    environments: Pending<EnvironmentMap>,
    requested: Vec<String>,
    immediate: HashMap<String, MeshHierarchy>,
}

/// Asset loader whose responses are released by the test
#[derive(Clone, Default)]
pub(crate) struct ScriptedLoader {
    state: Rc<RefCell<LoaderState>>,
}

impl ScriptedLoader {
    /// Loader answering every request at once from a fixed table
    pub(crate) fn immediate(models: impl IntoIterator<Item = (String, MeshHierarchy)>) -> Self {
        let loader = Self::default();
        loader.state.borrow_mut().immediate = models.into_iter().collect();
        loader
    }

    /// Release the oldest outstanding model request for `url`
    pub(crate) fn resolve_model(&self, url: &str, result: Result<MeshHierarchy, AssetError>) {
        let sender = {
            let mut state = self.state.borrow_mut();
            let index = state
                .models
                .iter()
                .position(|(pending, _)| pending == url)
                .unwrap_or_else(|| panic!("no pending model request for {url}"));
            state.models.remove(index).1
        };
        let _ = sender.send(result);
    }

    /// Release every outstanding environment request with a solid map
    pub(crate) fn resolve_environments(&self) {
        let pending = std::mem::take(&mut self.state.borrow_mut().environments);
        for (_, sender) in pending {
            let _ = sender.send(Ok(EnvironmentMap::solid([0.5, 0.5, 0.5])));
        }
    }

    /// Every URL requested so far, in order
    pub(crate) fn requested(&self) -> Vec<String> {
        self.state.borrow().requested.clone()
    }

    /// Number of model requests not yet released
    pub(crate) fn pending_models(&self) -> usize {
        self.state.borrow().models.len()
    }
}

impl AssetLoader for ScriptedLoader {
    fn load(&self, url: &str) -> AssetFuture<MeshHierarchy> {
        let mut state = self.state.borrow_mut();
        state.requested.push(url.to_string());
        if let Some(hierarchy) = state.immediate.get(url) {
            let hierarchy = hierarchy.clone();
            return async move { Ok(hierarchy) }.boxed_local();
        }

        let (tx, rx) = oneshot::channel();
        state.models.push((url.to_string(), tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(AssetError::Fetch("request dropped".to_string())))
        }
        .boxed_local()
    }

    fn load_environment(&self, url: &str) -> AssetFuture<EnvironmentMap> {
        let mut state = self.state.borrow_mut();
        state.requested.push(url.to_string());
        if !state.immediate.is_empty() {
            return async { Ok(EnvironmentMap::solid([1.0, 1.0, 1.0])) }.boxed_local();
        }

        let (tx, rx) = oneshot::channel();
        state.environments.push((url.to_string(), tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(AssetError::Fetch("request dropped".to_string())))
        }
        .boxed_local()
    }
}

/// Renderer that keeps every frame
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) frames: Vec<(RenderList, Camera)>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, list: &RenderList, camera: &Camera) {
        self.frames.push((list.clone(), camera.clone()));
    }
}

/// Sink that keeps every outbound message
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) messages: Vec<(Recipient, OutboundMessage)>,
}

impl HostSink for RecordingSink {
    fn post(&mut self, recipient: Recipient, message: &OutboundMessage) {
        self.messages.push((recipient, message.clone()));
    }
}

pub(crate) type TestConfigurator = Configurator<ScriptedLoader, RecordingRenderer, RecordingSink>;

/// A configurator plus handles on everything it talks to
pub(crate) struct Harness {
    pub(crate) configurator: TestConfigurator,
    pub(crate) loader: ScriptedLoader,
    pub(crate) errors: Rc<RefCell<Vec<ConfiguratorError>>>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_loader(ScriptedLoader::default())
    }

    pub(crate) fn with_loader(loader: ScriptedLoader) -> Self {
        let config = ConfiguratorConfig::default()
            .with_engraving(EngravingConfig::default().with_raster_size(96, 96));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        let configurator = Configurator::new(
            config,
            Box::new(BlockFace),
            loader.clone(),
            RecordingRenderer::default(),
            RecordingSink::default(),
        )
        .unwrap()
        .with_reporter(Box::new(move |error: ConfiguratorError| sink.borrow_mut().push(error)));

        Self {
            configurator,
            loader,
            errors,
        }
    }

    /// Send a JSON message from sender 1
    pub(crate) fn send(&mut self, json: &str) {
        self.send_from(SenderId(1), json);
    }

    pub(crate) fn send_from(&mut self, origin: SenderId, json: &str) {
        self.configurator
            .handle_message(InboundEnvelope::new(origin, json));
    }

    /// Release a model request and let the runtime observe it
    pub(crate) fn deliver_model(&mut self, variant: &str, hierarchy: MeshHierarchy) {
        let url = model_url(variant);
        self.loader.resolve_model(&url, Ok(hierarchy));
        self.configurator.pump();
    }

    /// Release environment requests and let the runtime observe them
    pub(crate) fn deliver_environments(&mut self) {
        self.loader.resolve_environments();
        self.configurator.pump();
    }

    /// Start and mount `minimal` with every environment loaded
    pub(crate) fn started() -> Self {
        let mut harness = Self::new();
        harness.configurator.start();
        harness.deliver_model("minimal", ring_hierarchy());
        harness.deliver_environments();
        harness
    }

    pub(crate) fn frames(&self) -> &[(RenderList, Camera)] {
        &self.configurator.renderer().frames
    }

    pub(crate) fn last_list(&self) -> &RenderList {
        &self.frames().last().expect("no frame rendered").0
    }

    pub(crate) fn outbound(&self) -> &[(Recipient, OutboundMessage)] {
        &self.configurator.sink().messages
    }
}

pub(crate) fn model_url(variant: &str) -> String {
    Catalog::default()
        .model(variant)
        .map(|m| m.url.clone())
        .unwrap_or_else(|| panic!("unknown variant {variant}"))
}

fn geometry(name: &str) -> Arc<Geometry> {
    Arc::new(Geometry {
        name: name.to_string(),
        vertex_count: 24,
    })
}

/// A small ring: band, centre stone, side stone and decorative trim
pub(crate) fn ring_hierarchy() -> MeshHierarchy {
    MeshHierarchy::new(vec![
        MeshNode::group("Scene"),
        MeshNode::mesh("Band", geometry("band")).with_parent(0),
        MeshNode::mesh("Diamond_Center", geometry("center")).with_parent(0),
        MeshNode::mesh("Demos_Accent", geometry("accent")).with_parent(0),
        MeshNode::mesh("ruby_side", geometry("side")).with_parent(0),
    ])
}

/// A heart pendant: body and bail, no stones
pub(crate) fn heart_hierarchy() -> MeshHierarchy {
    MeshHierarchy::new(vec![
        MeshNode::group("Root"),
        MeshNode::mesh("Heart_Body", geometry("heart")).with_parent(0),
        MeshNode::mesh("Bail", geometry("bail")).with_parent(0),
    ])
}
