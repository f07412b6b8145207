//! Text rendering for engravings
//!
//! # Architecture
//!
//! - [`GlyphSource`]: rasterizes single glyphs; [`FontLibrary`] wraps
//!   `fontdue` faces keyed by family, [`BlockFace`] is the built-in fallback
//! - [`EngravingRasterizer`]: lays out multi-line text and encodes carve depth
//!   into a grayscale raster
//!
//! # Example
//!
//! ```no_run
//! use gem_engine::core::config::EngravingConfig;
//! use gem_engine::render::text::{EngravingRasterizer, FontLibrary, RasterParams};
//! use gem_engine::scene::snapshot::EngravingState;
//!
//! let config = EngravingConfig::default();
//! let mut fonts = FontLibrary::new();
//! fonts.load_file("serif", "resources/fonts/serif.ttf".as_ref())?;
//!
//! let mut rasterizer = EngravingRasterizer::new(RasterParams::from(&config), Box::new(fonts));
//! rasterizer.update(&EngravingState { text: "Forever".into(), ..Default::default() });
//! rasterizer.current().save("engraving.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod engraving;
mod glyphs;

pub use engraving::{EngravingRaster, EngravingRasterizer, RasterParams, ENGRAVING_TEXTURE_ID};
pub use glyphs::{BlockFace, FontError, FontLibrary, FontResult, GlyphBitmap, GlyphSource};
