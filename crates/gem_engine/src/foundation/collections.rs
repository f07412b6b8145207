//! Specialized collection types

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    /// Opaque identity of a mesh node inside a mounted model
    pub struct MeshId;

    /// Opaque identity of a cached material
    pub struct MaterialKey;
}

/// Monotonically increasing tag used to discard stale asynchronous responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GenerationTag(pub u64);

/// Issues generation tags and answers whether a tag is still current
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: GenerationTag,
}

impl GenerationCounter {
    /// Create a counter with no tag issued yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new tag, superseding every earlier one
    pub fn advance(&mut self) -> GenerationTag {
        self.current = GenerationTag(self.current.0 + 1);
        self.current
    }

    /// The most recently issued tag
    pub fn current(&self) -> GenerationTag {
        self.current
    }

    /// Whether `tag` is the most recently issued one
    pub fn is_current(&self, tag: GenerationTag) -> bool {
        self.current == tag
    }
}
