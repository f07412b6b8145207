//! # Gem Engine
//!
//! A live, message-driven product configurator core for jewellery: it turns
//! a loaded mesh hierarchy into metal, gemstone and engraved materials, keeps
//! those materials stable while the customer reconfigures, and talks to an
//! untrusted embedding host over a small JSON protocol.
//!
//! ## Features
//!
//! - **Mesh Classification**: mesh names map to gem, metal or decorative roles
//! - **Stable Materials**: one material per mesh, updated in place
//! - **Engraving**: text rendered into a depth raster bound to metal surfaces
//! - **Camera Control**: eased zoom slider driving camera and model transforms
//! - **Async Assets**: model and environment fetches never block messages
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gem_engine::prelude::*;
//! use futures::{executor::block_on, stream};
//!
//! struct NullRenderer;
//! impl Renderer for NullRenderer {
//!     fn render(&mut self, list: &RenderList, _camera: &Camera) {
//!         println!("{} items", list.len());
//!     }
//! }
//!
//! struct PrintSink;
//! impl HostSink for PrintSink {
//!     fn post(&mut self, _to: Recipient, message: &OutboundMessage) {
//!         println!("{:?}", message);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfiguratorConfig::default();
//!     let mut configurator = Configurator::new(
//!         config,
//!         Box::new(FontLibrary::new()),
//!         FileAssetLoader::new("assets"),
//!         NullRenderer,
//!         PrintSink,
//!     )?;
//!     let inbound = stream::iter(vec![InboundEnvelope::new(
//!         SenderId(1),
//!         r#"{"type":"changeEngravingText","text":"Forever"}"#,
//!     )]);
//!     block_on(configurator.run(inbound));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]

pub mod assets;
pub mod config;
pub mod core;
pub mod events;
pub mod foundation;
pub mod render;
pub mod scene;

mod engine;
mod error;

#[cfg(test)]
mod tests;

pub use engine::Configurator;
pub use error::{ConfiguratorError, ErrorReporter, LogReporter};

/// Common imports for configurator users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, AssetFuture, AssetLoader, EnvironmentMap, FileAssetLoader, MeshHierarchy},
        core::{
            catalog::Catalog,
            config::{Config, ConfiguratorConfig},
        },
        events::{HostSink, InboundEnvelope, OutboundMessage, Recipient, SenderId},
        render::{text::FontLibrary, Camera, RenderList, Renderer},
        scene::snapshot::SceneSnapshot,
        Configurator, ConfiguratorError, ErrorReporter,
    };
}
