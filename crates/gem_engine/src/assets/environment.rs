//! Environment maps and the per-id store that caches them

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A decoded equirectangular HDR environment
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Linear RGB texels, row-major
    pub texels: Arc<[f32]>,
}

impl EnvironmentMap {
    /// A 1x1 environment of a single color (useful as a placeholder)
    pub fn solid(rgb: [f32; 3]) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: Arc::from(rgb.to_vec()),
        }
    }
}

/// Loaded environments keyed by catalog id
///
/// Tracks in-flight requests so each environment is fetched at most once.
#[derive(Debug, Default)]
pub struct EnvironmentStore {
    loaded: HashMap<String, Arc<EnvironmentMap>>,
    pending: HashSet<String>,
}

impl EnvironmentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded environment by id
    pub fn get(&self, id: &str) -> Option<&Arc<EnvironmentMap>> {
        self.loaded.get(id)
    }

    /// Whether the environment is loaded
    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.contains_key(id)
    }

    /// Mark a fetch as started; returns `false` if it is loaded or already in flight
    pub fn begin_fetch(&mut self, id: &str) -> bool {
        if self.loaded.contains_key(id) || self.pending.contains(id) {
            return false;
        }
        self.pending.insert(id.to_string());
        true
    }

    /// Store a fetched environment
    pub fn complete(&mut self, id: &str, map: EnvironmentMap) {
        self.pending.remove(id);
        self.loaded.insert(id.to_string(), Arc::new(map));
    }

    /// Forget a failed fetch so it can be retried on the next request
    pub fn fail(&mut self, id: &str) {
        self.pending.remove(id);
    }
}
