// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::renderer::uniforms::CameraUniforms;
use glam::{Mat4, Quat, Vec3};

/// A viewpoint owned by simulation code.
///
/// The renderer only reads it when `set_camera` is called.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position.
    pub position: Vec3,
    /// Orientation. The camera looks down its local -Z axis.
    pub rotation: Quat,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Camera {
    /// A camera at `position` looking at `target`.
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let view = Mat4::look_at_rh(position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self { position, rotation }
    }

    /// The direction the camera looks in.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Builds the camera uniforms for a given projection and aspect ratio.
    pub fn uniforms(&self, projection: &Projection, aspect_ratio: f32) -> CameraUniforms {
        CameraUniforms::new(
            self.view_matrix(),
            projection.matrix(aspect_ratio),
            self.position,
            projection.near,
            projection.far,
            projection.fov_y_radians,
        )
    }
}

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y_radians: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Projection {
    /// Creates a projection from a field of view in degrees.
    pub fn from_degrees(fov_y_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_radians: fov_y_degrees.to_radians(),
            near,
            far,
        }
    }

    /// OpenGL-convention perspective matrix (clip depth in `[-1, 1]`).
    pub fn matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect_ratio, self.near, self.far)
    }
}
