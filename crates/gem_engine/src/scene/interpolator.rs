//! Parametric camera/object interpolation
//!
//! A normalized `[0, 1]` control (the zoom slider) is eased with a symmetric
//! quadratic curve and mapped affinely onto configured endpoint pairs. The
//! mapping is pure: identical input always yields identical output.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Transform, Vec3};

/// Start/end values an output moves between
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndpointPair {
    /// Value at `t = 0`
    pub start: f32,
    /// Value at `t = 1`
    pub end: f32,
}

impl EndpointPair {
    /// Create a new pair
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Value at eased parameter `e`
    pub fn at(self, e: f32) -> f32 {
        utils::lerp(self.start, self.end, e)
    }
}

/// Configured endpoints for the camera control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraBounds {
    /// Camera distance along +Z (far at `t = 0`, near at `t = 1`)
    pub camera_distance: EndpointPair,
    /// Vertical offset applied to the model group
    pub object_offset: EndpointPair,
    /// Uniform scale applied to the model group
    pub group_scale: f32,
    /// Vertical field of view in degrees
    pub field_of_view_deg: f32,
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            camera_distance: EndpointPair::new(5.0, 1.5),
            object_offset: EndpointPair::new(-0.5, 0.0),
            group_scale: 50.0,
            field_of_view_deg: 30.0,
        }
    }
}

impl CameraBounds {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let pairs = [self.camera_distance, self.object_offset];
        if pairs.iter().any(|p| !p.start.is_finite() || !p.end.is_finite()) {
            return Err("Camera endpoints must be finite".to_string());
        }
        if self.camera_distance.start <= 0.0 || self.camera_distance.end <= 0.0 {
            return Err("Camera distance endpoints must be positive".to_string());
        }
        if !self.group_scale.is_finite() || self.group_scale <= 0.0 {
            return Err(format!("Invalid group scale {}", self.group_scale));
        }
        if !(1.0..180.0).contains(&self.field_of_view_deg) {
            return Err(format!("Invalid field of view {}", self.field_of_view_deg));
        }
        Ok(())
    }
}

/// Interpolated outputs for one control value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedView {
    /// Camera distance from the origin along +Z
    pub camera_distance: f32,
    /// Vertical offset of the model group
    pub object_offset: f32,
}

impl InterpolatedView {
    /// Transform of the model group (offset and scale)
    pub fn group_transform(&self, bounds: &CameraBounds) -> Transform {
        Transform {
            position: Vec3::new(0.0, self.object_offset, 0.0),
            ..Transform::from_uniform_scale(bounds.group_scale)
        }
    }

    /// Camera position; only Z follows the control
    pub fn camera_position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.camera_distance)
    }
}

/// Map a control value onto camera distance and object offset
///
/// `t` is clamped to `[0, 1]` (NaN counts as 0).
pub fn interpolate(t: f32, bounds: &CameraBounds) -> InterpolatedView {
    let e = utils::ease_in_out_quad(utils::saturate(t));
    InterpolatedView {
        camera_distance: bounds.camera_distance.at(e),
        object_offset: bounds.object_offset.at(e),
    }
}
