//! # Product Catalog
//!
//! Model variants, metal finishes, gem variants and environment maps known
//! to the configurator. Catalogs are fixed at startup; the configuration
//! channel validates every inbound selection against them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Linear RGB color parsed from a `#RRGGBB` hex string
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel (0-1)
    pub r: f32,
    /// Green channel (0-1)
    pub g: f32,
    /// Blue channel (0-1)
    pub b: f32,
}

impl Color {
    /// Create a color from 0-1 components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn parse(text: &str) -> Result<Self, String> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(format!("expected 6 hex digits, got '{text}'"));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("invalid hex color '{text}': {e}"))
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(f, "#{:02X}{:02X}{:02X}", to_byte(self.r), to_byte(self.g), to_byte(self.b))
    }
}

/// A loadable product model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVariant {
    /// Catalog key, e.g. `minimal`
    pub id: String,
    /// Where the mesh hierarchy is fetched from
    pub url: String,
}

/// Named metal appearance preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetalFinish {
    /// Catalog key, e.g. `18k-solid-gold`
    pub id: String,
    /// Base color
    pub color: Color,
    /// Roughness (0 = mirror, 1 = fully rough)
    pub roughness: f32,
}

/// Named refractive material preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GemVariant {
    /// Catalog key, e.g. `real-diamond`
    pub id: String,
    /// Internal refraction bounces
    pub bounces: u32,
    /// Index of refraction
    pub ior: f32,
    /// Fresnel reflection strength
    pub fresnel: f32,
    /// Chromatic aberration strength
    pub aberration: f32,
    /// Tint color
    pub color: Color,
    /// Use the fast chromatic aberration approximation
    pub fast_chroma: bool,
    /// Whether output is tone mapped
    pub tone_mapped: bool,
    /// Environment map sampled by the refraction, see [`EnvironmentSource`]
    pub environment_map_id: String,
}

/// A pre-baked environment map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSource {
    /// Environment key referenced by gem variants
    pub id: String,
    /// Where the environment map is fetched from
    pub url: String,
}

/// Which catalog a lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Model variants
    Model,
    /// Metal finishes
    Metal,
    /// Gem variants
    Gem,
    /// Environment maps
    Environment,
}

impl CatalogKind {
    /// Human-readable catalog name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Metal => "metal finish",
            Self::Gem => "gem variant",
            Self::Environment => "environment",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every selectable entry, fixed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Model variants
    pub models: Vec<ModelVariant>,
    /// Metal finishes
    pub finishes: Vec<MetalFinish>,
    /// Gem variants
    pub gems: Vec<GemVariant>,
    /// Environment maps referenced by gems and the scene
    pub environments: Vec<EnvironmentSource>,
    /// Environment used for metal reflections
    pub scene_environment: String,
    /// Legacy finish names accepted by `materialChange` (alias -> finish id)
    #[serde(default)]
    pub metal_aliases: BTreeMap<String, String>,
}

const HEART_URL: &str =
    "https://cdn.shopify.com/3d/models/6bce9a7ae62786dd/new_gold_heart_for_website.glb";
const SMALL_DIAMOND_URL: &str =
    "https://cdn.shopify.com/3d/models/c1ba46f8c661e88e/smaller_diamond_for_website.glb";
const STUDIO_HDR_URL: &str =
    "https://cdn.shopify.com/s/files/1/0754/1676/4731/files/custom5.hdr?v=1752937460";
const PHOTO_STUDIO_HDR_URL: &str = "https://cdn.shopify.com/s/files/1/0754/1676/4731/files/brown_photostudio_04_1k.hdr?v=1753809331";

impl Default for Catalog {
    fn default() -> Self {
        let model = |id: &str, url: &str| ModelVariant {
            id: id.to_string(),
            url: url.to_string(),
        };
        let finish = |id: &str, hex: u32, roughness: f32| MetalFinish {
            id: id.to_string(),
            color: Color::from_hex(hex),
            roughness,
        };
        let diamond = |id: &str, environment: &str| GemVariant {
            id: id.to_string(),
            bounces: 2,
            ior: 2.4,
            fresnel: 0.0,
            aberration: 0.0,
            color: Color::from_hex(0xFFFFFF),
            fast_chroma: true,
            tone_mapped: false,
            environment_map_id: environment.to_string(),
        };
        let environment = |id: &str, url: &str| EnvironmentSource {
            id: id.to_string(),
            url: url.to_string(),
        };

        Self {
            models: vec![
                model("loving", HEART_URL),
                model("minimal", SMALL_DIAMOND_URL),
                model("special", HEART_URL),
            ],
            finishes: vec![
                finish("14k-gold-plating", 0xF8E685, 0.25),
                finish("18k-gold-plating", 0xFFC328, 0.15),
                finish("18k-solid-gold", 0xFFB800, 0.05),
                finish("925-silver", 0xC0C0C0, 0.2),
                finish("stainless-steel", 0xC0C0C0, 0.3),
                finish("18k-white-gold", 0xFFCF00, 0.1),
            ],
            gems: vec![
                diamond("real-diamond", "studio"),
                diamond("demi-diamond", "photo-studio"),
                GemVariant {
                    id: "ruby".to_string(),
                    bounces: 3,
                    ior: 1.77,
                    fresnel: 0.1,
                    aberration: 0.01,
                    color: Color::from_hex(0xE0115F),
                    fast_chroma: true,
                    tone_mapped: false,
                    environment_map_id: "ruby-studio".to_string(),
                },
                GemVariant {
                    id: "emerald".to_string(),
                    bounces: 3,
                    ior: 1.58,
                    fresnel: 0.1,
                    aberration: 0.01,
                    color: Color::from_hex(0x50C878),
                    fast_chroma: true,
                    tone_mapped: false,
                    environment_map_id: "emerald-studio".to_string(),
                },
            ],
            environments: vec![
                environment("studio", STUDIO_HDR_URL),
                environment("photo-studio", PHOTO_STUDIO_HDR_URL),
                environment("ruby-studio", "environments/ruby_studio.hdr"),
                environment("emerald-studio", "environments/emerald_studio.hdr"),
            ],
            scene_environment: "studio".to_string(),
            metal_aliases: BTreeMap::from([
                ("gold".to_string(), "18k-solid-gold".to_string()),
                ("silver".to_string(), "925-silver".to_string()),
            ]),
        }
    }
}

impl Catalog {
    /// Look up a model variant
    pub fn model(&self, id: &str) -> Option<&ModelVariant> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up a metal finish, resolving legacy aliases first
    pub fn finish(&self, id: &str) -> Option<&MetalFinish> {
        let id = self.canonical_finish_id(id);
        self.finishes.iter().find(|f| f.id == id)
    }

    /// Map a legacy alias to its finish id; other ids pass through unchanged
    pub fn canonical_finish_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.metal_aliases.get(id).map_or(id, String::as_str)
    }

    /// Look up a gem variant
    pub fn gem(&self, id: &str) -> Option<&GemVariant> {
        self.gems.iter().find(|g| g.id == id)
    }

    /// Look up an environment map source
    pub fn environment(&self, id: &str) -> Option<&EnvironmentSource> {
        self.environments.iter().find(|e| e.id == id)
    }

    /// Replace model and environment URLs by id
    ///
    /// Fails without changing anything if an id is not in the catalog.
    pub fn relocate(
        &mut self,
        models: &BTreeMap<String, String>,
        environments: &BTreeMap<String, String>,
    ) -> Result<(), String> {
        if let Some(id) = models.keys().find(|id| self.model(id).is_none()) {
            return Err(format!("asset URL given for unknown model '{id}'"));
        }
        if let Some(id) = environments.keys().find(|id| self.environment(id).is_none()) {
            return Err(format!("asset URL given for unknown environment '{id}'"));
        }

        for model in &mut self.models {
            if let Some(url) = models.get(&model.id) {
                log::debug!("Model '{}' relocated to {}", model.id, url);
                model.url = url.clone();
            }
        }
        for environment in &mut self.environments {
            if let Some(url) = environments.get(&environment.id) {
                log::debug!("Environment '{}' relocated to {}", environment.id, url);
                environment.url = url.clone();
            }
        }
        Ok(())
    }

    /// Check internal consistency of the catalog
    pub fn validate(&self) -> Result<(), String> {
        if self.models.is_empty() {
            return Err("catalog has no model variants".to_string());
        }
        if self.finishes.is_empty() {
            return Err("catalog has no metal finishes".to_string());
        }
        if self.gems.is_empty() {
            return Err("catalog has no gem variants".to_string());
        }

        for finish in &self.finishes {
            if !(0.0..=1.0).contains(&finish.roughness) {
                return Err(format!(
                    "finish '{}' roughness {} outside [0, 1]",
                    finish.id, finish.roughness
                ));
            }
        }

        for gem in &self.gems {
            if !gem.ior.is_finite() || gem.ior < 1.0 {
                return Err(format!("gem '{}' has invalid ior {}", gem.id, gem.ior));
            }
            if self.environment(&gem.environment_map_id).is_none() {
                return Err(format!(
                    "gem '{}' references unknown environment '{}'",
                    gem.id, gem.environment_map_id
                ));
            }
        }

        if self.environment(&self.scene_environment).is_none() {
            return Err(format!(
                "scene environment '{}' is not in the catalog",
                self.scene_environment
            ));
        }

        for (alias, target) in &self.metal_aliases {
            if !self.finishes.iter().any(|f| &f.id == target) {
                return Err(format!("alias '{alias}' points at unknown finish '{target}'"));
            }
        }

        Ok(())
    }
}
