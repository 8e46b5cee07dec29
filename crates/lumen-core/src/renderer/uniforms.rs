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

//! GPU uniform buffer layouts.
//!
//! Every struct here is uploaded byte for byte, so each one is `#[repr(C)]`,
//! [`bytemuck::Pod`], padded explicitly to std140 rules and size-checked at
//! compile time. `vec3` members are always followed by a 4-byte scalar or an
//! explicit padding field.

use crate::renderer::command::DrawCommand;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};
use std::mem;

/// Binding points of the uniform buffers, shared with the shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformBinding {
    /// [`CameraUniforms`].
    Camera = 0,
    /// [`LightsUniforms`].
    Lights = 1,
    /// [`FrameDataUniforms`].
    FrameData = 2,
    /// [`TransformUniforms`].
    Transform = 3,
}

impl UniformBinding {
    /// Every binding, in binding-point order.
    pub const ALL: [UniformBinding; 4] = [
        UniformBinding::Camera,
        UniformBinding::Lights,
        UniformBinding::FrameData,
        UniformBinding::Transform,
    ];

    /// The `layout(binding = N)` index.
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Size in bytes of the block bound here.
    pub const fn block_size(self) -> usize {
        match self {
            UniformBinding::Camera => mem::size_of::<CameraUniforms>(),
            UniformBinding::Lights => mem::size_of::<LightsUniforms>(),
            UniformBinding::FrameData => mem::size_of::<FrameDataUniforms>(),
            UniformBinding::Transform => mem::size_of::<TransformUniforms>(),
        }
    }
}

/// A uniform block with a fixed binding point.
pub trait UniformBlock: Pod {
    /// Where the block is bound.
    const BINDING: UniformBinding;
    /// Block name in the shaders.
    const LABEL: &'static str;

    /// The bytes to upload.
    fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Camera matrices and clip planes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct CameraUniforms {
    /// World-to-view matrix.
    pub view: [[f32; 4]; 4],
    /// View-to-clip matrix.
    pub projection: [[f32; 4]; 4],
    /// `projection * view`.
    pub view_projection: [[f32; 4]; 4],
    /// Camera position in world space.
    pub position: [f32; 3],
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding0: f32,
    /// Near and far clip distances.
    pub clip_planes: [f32; 2],
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding1: f32,
}

impl CameraUniforms {
    /// Builds the block from view and projection matrices.
    pub fn new(view: Mat4, projection: Mat4, position: Vec3, near: f32, far: f32, fov_y: f32) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            view_projection: (projection * view).to_cols_array_2d(),
            position: position.to_array(),
            _padding0: 0.0,
            clip_planes: [near, far],
            fov_y,
            _padding1: 0.0,
        }
    }
}

impl UniformBlock for CameraUniforms {
    const BINDING: UniformBinding = UniformBinding::Camera;
    const LABEL: &'static str = "Camera";
}

/// The directional light as the shaders see it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DirectionalLightData {
    /// Direction the light travels in.
    pub direction: [f32; 3],
    /// `1` if the light contributes.
    pub active: u32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding: f32,
    /// World-to-light-clip matrix used by the shadow pass.
    pub light_space: [[f32; 4]; 4],
}

/// One point light slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PointLightData {
    /// World position.
    pub position: [f32; 3],
    /// `1` if the light contributes.
    pub active: u32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Far plane of the cube shadow map.
    pub far_plane: f32,
}

/// All lights of the scene.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LightsUniforms {
    /// The single directional light.
    pub directional: DirectionalLightData,
    /// Point light slots.
    pub point_lights: [PointLightData; 4],
    /// Bit `i` is set when `point_lights[i]` is active.
    pub active_point_mask: u32,
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding: [u32; 3],
}

impl UniformBlock for LightsUniforms {
    const BINDING: UniformBinding = UniformBinding::Lights;
    const LABEL: &'static str = "Lights";
}

/// Per-frame values.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct FrameDataUniforms {
    /// Logical surface size in pixels.
    pub surface_size: [f32; 2],
    /// Framebuffer size in pixels.
    pub framebuffer_size: [f32; 2],
    /// Seconds since the renderer started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta_time: f32,
    /// Monotonic frame counter.
    pub frame_index: u32,
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding0: u32,
    /// Color the main target is cleared to.
    pub clear_color: [f32; 4],
}

impl UniformBlock for FrameDataUniforms {
    const BINDING: UniformBinding = UniformBinding::FrameData;
    const LABEL: &'static str = "FrameData";
}

/// Per-draw values, rewritten before each draw call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct TransformUniforms {
    /// Object-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the upper 3x3 of `model`, as three padded columns.
    pub normal_matrix: [[f32; 4]; 3],
    /// Color multiplier.
    pub tint: [f32; 4],
    /// [`DrawFlags`](crate::renderer::DrawFlags) bits.
    pub flags: u32,
    /// Bit `i` is set when texture slot `i` is bound.
    pub texture_mask: u32,
    /// Point light slot rendered by the current shadow pass.
    pub shadow_light_index: u32,
    /// Keeps the std140 layout aligned. Always zero.
    pub _padding: u32,
}

impl TransformUniforms {
    /// Builds the block for a draw.
    pub fn from_draw(draw: &DrawCommand) -> Self {
        let normal = Mat3::from_mat4(draw.transform).inverse().transpose();
        let pad = |c: Vec3| [c.x, c.y, c.z, 0.0];
        Self {
            model: draw.transform.to_cols_array_2d(),
            normal_matrix: [pad(normal.x_axis), pad(normal.y_axis), pad(normal.z_axis)],
            tint: draw.tint.to_array(),
            flags: draw.flags.bits(),
            texture_mask: draw.texture_mask(),
            shadow_light_index: 0,
            _padding: 0,
        }
    }
}

impl UniformBlock for TransformUniforms {
    const BINDING: UniformBinding = UniformBinding::Transform;
    const LABEL: &'static str = "Transform";
}

const _: () = assert!(mem::size_of::<CameraUniforms>() == 224);
const _: () = assert!(mem::size_of::<DirectionalLightData>() == 96);
const _: () = assert!(mem::size_of::<PointLightData>() == 32);
const _: () = assert!(mem::size_of::<LightsUniforms>() == 240);
const _: () = assert!(mem::size_of::<FrameDataUniforms>() == 48);
const _: () = assert!(mem::size_of::<TransformUniforms>() == 144);
