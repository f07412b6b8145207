//! # Core Module
//!
//! Configuration and the product catalog shared by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: unified configuration for the configurator runtime
//! - **Catalog**: model variants, metal finishes, gem variants, environments

pub mod catalog;
pub mod config;

pub use catalog::{Catalog, CatalogKind, Color, EnvironmentSource, GemVariant, MetalFinish, ModelVariant};
pub use config::{
    AssetConfig, Config, ConfigError, ConfiguratorConfig, EngineConfig, EngravingConfig,
    SelectionDefaults,
};
