//! # Configurator Camera
//!
//! Perspective camera looking at the model from the front. Its distance is
//! driven by the camera control through the parametric interpolator; the
//! renderer turns it into view and projection matrices.
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera sits on +Z and looks toward the origin.

use nalgebra::Point3;

use crate::foundation::math::{Mat4, Vec3};
use crate::scene::interpolator::{CameraBounds, InterpolatedView};

/// Perspective camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Viewport aspect ratio
    /// * `near` - Near plane distance (must be > 0)
    /// * `far` - Far plane distance (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    /// Camera placed according to an interpolated view
    pub fn from_view(view: &InterpolatedView, bounds: &CameraBounds) -> Self {
        Self::perspective(view.camera_position(), bounds.field_of_view_deg, 1.0, 0.1, 1000.0)
    }

    /// Update the aspect ratio for a resized viewport
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// World-to-camera transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// Perspective projection
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }
}
