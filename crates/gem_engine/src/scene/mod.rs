//! Scene state and composition
//!
//! ## Architecture
//!
//! ```text
//! MeshArena ──classify──▶ ClassifiedScene ─┐
//!                                          ├─compose──▶ RenderList ──▶ Renderer
//! ConfigurationChannel ──▶ SceneSnapshot ──┘
//! ```
//!
//! - [`classifier`]: mesh name to material role
//! - [`snapshot`]: the published configuration state
//! - [`interpolator`]: camera control to camera/object transforms
//! - [`scene_composer`]: snapshot + scene to render list

pub mod classifier;
pub mod interpolator;
pub mod scene_composer;
pub mod snapshot;

pub use classifier::{classify, ClassifiedScene, GemKind, MeshRole};
pub use interpolator::{interpolate, CameraBounds, EndpointPair, InterpolatedView};
pub use scene_composer::{compose, CompositionContext, Frame};
pub use snapshot::{EngravingLimits, EngravingState, EngravingStyle, SceneSnapshot, SnapshotField};
