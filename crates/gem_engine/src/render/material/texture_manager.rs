//! Texture handles and channel bindings for the material system

use bitflags::bitflags;

/// Handle for a raster texture resource
///
/// The generation changes every time the underlying raster is replaced, so a
/// renderer can tell a rebound texture from a stale upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    /// Texture slot
    pub id: u32,
    /// Content generation
    pub generation: u64,
}

bitflags! {
    /// Material channels a texture can drive
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelBindings: u8 {
        /// Base color / diffuse
        const DIFFUSE = 0b0000_0001;
        /// Roughness
        const ROUGHNESS = 0b0000_0010;
    }
}

/// Texture bound to a material and the channels it feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureBindings {
    /// Bound texture, if any
    pub texture: Option<TextureHandle>,
    /// Channels sourced from `texture`
    pub channels: ChannelBindings,
}

impl TextureBindings {
    /// Bind `texture` to `channels`, replacing any previous binding
    pub fn bind(&mut self, texture: TextureHandle, channels: ChannelBindings) {
        self.texture = Some(texture);
        self.channels = channels;
    }

    /// Remove every binding
    pub fn clear(&mut self) {
        self.texture = None;
        self.channels = ChannelBindings::empty();
    }

    /// Whether `channel` is sourced from a texture
    pub fn drives(&self, channel: ChannelBindings) -> bool {
        self.texture.is_some() && self.channels.contains(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_clear() {
        let mut bindings = TextureBindings::default();
        let handle = TextureHandle { id: 1, generation: 4 };
        bindings.bind(handle, ChannelBindings::ROUGHNESS);
        assert!(bindings.drives(ChannelBindings::ROUGHNESS));
        assert!(!bindings.drives(ChannelBindings::DIFFUSE));

        bindings.clear();
        assert_eq!(bindings, TextureBindings::default());
        assert!(!bindings.drives(ChannelBindings::DIFFUSE));
    }
}
