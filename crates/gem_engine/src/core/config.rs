//! # Unified Configuration System
//!
//! All configuration for the configurator runtime in one place: logging,
//! the product catalog, startup selections, engraving raster parameters,
//! camera interpolation bounds and asset locations.
//!
//! ## Design Goals
//!
//! - **Centralized**: every tunable constant lives here, with defaults
//! - **Serializable**: loads from TOML or RON through [`Config`]
//! - **Type Safe**: strong typing with `validate()` before use

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use crate::config::{Config, ConfigError};
use crate::core::catalog::Catalog;
use crate::scene::interpolator::CameraBounds;
use crate::scene::snapshot::{EngravingLimits, EngravingState};

/// # Engine Configuration
///
/// Process-level behavior: logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default log level (overridden by `RUST_LOG`)
    pub log_level: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Startup Selections
///
/// What the snapshot holds before the host sends any message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDefaults {
    /// Initial model variant id
    pub model: String,
    /// Initial metal finish id
    pub metal: String,
    /// Initial gem variant id
    pub gem: String,
    /// Initial camera control value in `[0, 1]`
    pub camera: f32,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            model: "minimal".to_string(),
            metal: "18k-white-gold".to_string(),
            gem: "real-diamond".to_string(),
            camera: 0.0,
        }
    }
}

/// # Engraving Configuration
///
/// Raster geometry and the depth encoding used by the engraving rasterizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngravingConfig {
    /// Raster width in pixels
    pub raster_width: u32,
    /// Raster height in pixels
    pub raster_height: u32,
    /// Neutral "no effect" luminance the raster is cleared to
    pub baseline_luminance: u8,
    /// Luminance drop per unit of depth
    pub depth_scale: f32,
    /// Depth above which the carved-edge highlight is composited
    pub highlight_depth_threshold: f32,
    /// Line advance as a multiple of the font size
    pub line_height_factor: f32,
    /// Roughness multiplier applied to metal while the engraving is bound
    pub roughness_multiplier: f32,
    /// Clear the engraving text when the model variant changes
    pub reset_on_model_change: bool,
    /// Engraving state before any message arrives
    pub defaults: EngravingState,
}

impl EngravingConfig {
    /// Set raster size
    pub fn with_raster_size(mut self, width: u32, height: u32) -> Self {
        self.raster_width = width;
        self.raster_height = height;
        self
    }

    /// Layout limits for styles applied to this raster
    pub fn limits(&self) -> EngravingLimits {
        EngravingLimits::for_raster(self.raster_width, self.raster_height)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.raster_width == 0 || self.raster_height == 0 {
            return Err("Engraving raster dimensions must be non-zero".to_string());
        }
        if !self.defaults.is_within(&self.limits()) {
            return Err(format!(
                "Default engraving {:?} does not fit a {}x{} raster",
                self.defaults, self.raster_width, self.raster_height
            ));
        }
        if !self.depth_scale.is_finite() || self.depth_scale < 0.0 {
            return Err(format!("Invalid engraving depth scale {}", self.depth_scale));
        }
        if !self.line_height_factor.is_finite() || self.line_height_factor <= 0.0 {
            return Err(format!("Invalid line height factor {}", self.line_height_factor));
        }
        if !self.roughness_multiplier.is_finite() || self.roughness_multiplier < 0.0 {
            return Err(format!(
                "Invalid engraving roughness multiplier {}",
                self.roughness_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for EngravingConfig {
    fn default() -> Self {
        Self {
            raster_width: 1024,
            raster_height: 1024,
            baseline_luminance: 128,
            depth_scale: 100.0,
            highlight_depth_threshold: 0.3,
            line_height_factor: 1.2,
            roughness_multiplier: 1.5,
            reset_on_model_change: true,
            defaults: EngravingState::default(),
        }
    }
}

/// # Asset Configuration
///
/// Font files for the engraving rasterizer, keyed by family name, and
/// per-entry URL replacements for the catalog (e.g. local copies of the
/// remote models).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Font family name -> TTF/OTF path
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
    /// Family used when an unknown family is requested
    #[serde(default)]
    pub default_font_family: Option<String>,
    /// Model variant id -> URL replacing the catalog's
    #[serde(default)]
    pub models: BTreeMap<String, String>,
    /// Environment id -> URL replacing the catalog's
    #[serde(default)]
    pub environments: BTreeMap<String, String>,
}

impl AssetConfig {
    /// Register a font file for a family
    pub fn with_font(mut self, family: impl Into<String>, path: impl Into<String>) -> Self {
        self.fonts.insert(family.into(), path.into());
        self
    }

    /// Fetch a model variant from `url` instead of the catalog entry
    pub fn with_model_url(mut self, model: impl Into<String>, url: impl Into<String>) -> Self {
        self.models.insert(model.into(), url.into());
        self
    }
}

/// # Complete Configurator Configuration
///
/// Top-level configuration the runtime is built from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// Engine core configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Product catalog
    #[serde(default)]
    pub catalog: Catalog,
    /// Startup selections
    #[serde(default)]
    pub defaults: SelectionDefaults,
    /// Engraving raster configuration
    #[serde(default)]
    pub engraving: EngravingConfig,
    /// Camera interpolation bounds
    #[serde(default)]
    pub camera: CameraBounds,
    /// Asset locations
    #[serde(default)]
    pub assets: AssetConfig,
}

impl ConfiguratorConfig {
    /// Replace the engraving configuration
    pub fn with_engraving(mut self, engraving: EngravingConfig) -> Self {
        self.engraving = engraving;
        self
    }

    /// Replace the catalog
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Catalog with the asset URL replacements applied
    pub fn resolved_catalog(&self) -> Result<Catalog, ConfigError> {
        let mut catalog = self.catalog.clone();
        catalog
            .relocate(&self.assets.models, &self.assets.environments)
            .map_err(ConfigError::Invalid)?;
        Ok(catalog)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolved_catalog()?;
        self.catalog.validate().map_err(ConfigError::Invalid)?;
        self.engraving.validate().map_err(ConfigError::Invalid)?;
        self.camera.validate().map_err(ConfigError::Invalid)?;

        let defaults = &self.defaults;
        if self.catalog.model(&defaults.model).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default model '{}' is not in the catalog",
                defaults.model
            )));
        }
        if self.catalog.finish(&defaults.metal).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default metal '{}' is not in the catalog",
                defaults.metal
            )));
        }
        if self.catalog.gem(&defaults.gem).is_none() {
            return Err(ConfigError::Invalid(format!(
                "default gem '{}' is not in the catalog",
                defaults.gem
            )));
        }
        if !(0.0..=1.0).contains(&defaults.camera) {
            return Err(ConfigError::Invalid(format!(
                "default camera value {} outside [0, 1]",
                defaults.camera
            )));
        }
        Ok(())
    }
}

impl Config for ConfiguratorConfig {}
