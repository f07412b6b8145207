//! Material creation and caching subsystem
//!
//! The factory maps mesh roles to material parameters; the cache owns one
//! material per mesh and updates it in place on every reconfiguration.

pub mod material_cache;
pub mod material_factory;

pub use material_cache::{MaterialCache, MaterialRecord};
pub use material_factory::{MaterialFactory, MaterialOptions};
