// SPDX-License-Identifier: CEPL-1.0
use glam::{Mat4, Vec3};

use crate::gpu::UniformBufferObject;

/// Live-tunable camera parameters. Owned by the application and handed
/// read-only to the per-frame uniform update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Model rotation in degrees about `axis`.
    pub angle: f32,
    pub axis: Vec3,

    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,

    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub near: f32,
    pub far: f32,

    /// Polygon-mode toggle: draw with the wireframe pipeline variant.
    pub wireframe: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            axis: Vec3::Z,
            eye: Vec3::new(5.0, 5.0, 4.0),
            center: Vec3::ZERO,
            up: Vec3::Z,
            fovy: 60.0,
            near: 0.1,
            far: 50.0,
            wireframe: false,
        }
    }
}

impl CameraState {
    pub const MIN_FOVY: f32 = 1.0;
    pub const MAX_FOVY: f32 = 179.0;
    const MIN_NEAR: f32 = 1e-3;

    /// Unit look direction, falling back to a vector perpendicular to `up`
    /// when eye and center coincide.
    pub fn look_dir(&self) -> Vec3 {
        let d = self.center - self.eye;
        if d.length_squared() > f32::EPSILON {
            d.normalize()
        } else {
            self.up.try_normalize().unwrap_or(Vec3::Z).any_orthonormal_vector()
        }
    }

    pub fn model(&self) -> Mat4 {
        if self.axis.length_squared() > f32::EPSILON {
            Mat4::from_axis_angle(self.axis.normalize(), self.angle.to_radians())
        } else {
            Mat4::IDENTITY
        }
    }

    pub fn view(&self) -> Mat4 {
        let up = self.up.try_normalize().unwrap_or(Vec3::Z);
        Mat4::look_at_rh(self.eye, self.eye + self.look_dir(), up)
    }

    /// Perspective with zero-to-one depth and Y flipped for Vulkan clip space.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let fovy = self.fovy.clamp(Self::MIN_FOVY, Self::MAX_FOVY).to_radians();
        let near = self.near.max(Self::MIN_NEAR);
        let far = self.far.max(near * 2.0);

        let mut proj = Mat4::perspective_rh(fovy, aspect, near, far);
        proj.y_axis.y *= -1.0;
        proj
    }

    pub fn uniforms(&self, aspect: f32) -> UniformBufferObject {
        UniformBufferObject {
            model: self.model(),
            view: self.view(),
            proj: self.projection(aspect),
        }
    }
}
