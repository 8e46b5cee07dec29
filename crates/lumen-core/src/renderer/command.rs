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

//! Defines the commands recorded by simulation code and executed by a backend.

use crate::renderer::handle::RenderId;
use crate::renderer::light::{DirectionalLight, PointLight};
use crate::renderer::mesh::Vertex;
use crate::renderer::texture::TextureDescriptor;
use crate::renderer::uniforms::CameraUniforms;
use bitflags::bitflags;
use glam::{Mat4, Vec4};
use std::sync::Arc;

/// Number of texture slots a single draw can bind.
pub const MAX_DRAW_TEXTURES: usize = 4;

bitflags! {
    /// Per-draw render state switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawFlags: u32 {
        /// The mesh is rendered into the shadow maps.
        const CAST_SHADOWS = 1 << 0;
        /// The mesh samples the shadow maps in the lit pass.
        const RECEIVE_SHADOWS = 1 << 1;
        /// Skip lighting, output `tint * albedo` directly.
        const UNLIT = 1 << 2;
        /// Disable back-face culling.
        const DOUBLE_SIDED = 1 << 3;
        /// Alpha-blended. Excluded from shadow passes.
        const TRANSPARENT = 1 << 4;
    }
}

/// A single mesh draw in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// Object-to-world transform.
    pub transform: Mat4,
    /// Color multiplier.
    pub tint: Vec4,
    /// Render state.
    pub flags: DrawFlags,
    /// Bound textures. [`RenderId::NULL`] leaves a slot empty.
    pub textures: [RenderId; MAX_DRAW_TEXTURES],
    /// The mesh to draw.
    pub mesh: RenderId,
}

impl DrawCommand {
    /// An untextured, white draw that casts and receives shadows.
    pub fn new(mesh: RenderId, transform: Mat4) -> Self {
        Self {
            transform,
            tint: Vec4::ONE,
            flags: DrawFlags::CAST_SHADOWS | DrawFlags::RECEIVE_SHADOWS,
            textures: [RenderId::NULL; MAX_DRAW_TEXTURES],
            mesh,
        }
    }

    /// Bitmask of the texture slots holding a non-null handle.
    pub fn texture_mask(&self) -> u32 {
        self.textures
            .iter()
            .enumerate()
            .filter(|(_, id)| !id.is_null())
            .fold(0, |mask, (slot, _)| mask | (1 << slot))
    }
}

/// A unit of work recorded during a frame and executed at the frame boundary.
///
/// Commands are executed strictly in the order they were pushed. Buffers are
/// shared through [`Arc`] so the caller may drop its copy immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Replaces the camera uniforms used by subsequent draws.
    SetCamera(CameraUniforms),
    /// Draws a mesh.
    Draw3D(DrawCommand),
    /// Creates the mesh behind a reserved handle.
    GenerateMesh {
        /// The handle reserved for the mesh.
        id: RenderId,
        /// Vertex data.
        vertices: Arc<[Vertex]>,
        /// Triangle list indices.
        indices: Arc<[u32]>,
    },
    /// Creates the texture behind a reserved handle.
    GenerateTexture {
        /// The handle reserved for the texture.
        id: RenderId,
        /// Layout and sampling state.
        descriptor: TextureDescriptor,
        /// Tightly packed texel data, already validated against `descriptor`.
        pixels: Arc<[u8]>,
    },
    /// Destroys meshes. Null or unknown handles are ignored.
    RetireMeshes(Vec<RenderId>),
    /// Destroys textures. Null or unknown handles are ignored.
    RetireTextures(Vec<RenderId>),
    /// Updates one point light slot.
    PointLight {
        /// Slot in `0..MAX_POINT_LIGHTS`.
        index: u8,
        /// New light state.
        light: PointLight,
    },
    /// Updates the directional light.
    DirectionalLight(DirectionalLight),
}

impl RenderCommand {
    /// A short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            RenderCommand::SetCamera(_) => "set_camera",
            RenderCommand::Draw3D(_) => "draw_3d",
            RenderCommand::GenerateMesh { .. } => "generate_mesh",
            RenderCommand::GenerateTexture { .. } => "generate_texture",
            RenderCommand::RetireMeshes(_) => "retire_meshes",
            RenderCommand::RetireTextures(_) => "retire_textures",
            RenderCommand::PointLight { .. } => "point_light",
            RenderCommand::DirectionalLight(_) => "directional_light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_mask_tracks_bound_slots() {
        let mut draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        assert_eq!(draw.texture_mask(), 0);
        draw.textures[0] = RenderId(3);
        draw.textures[2] = RenderId(7);
        assert_eq!(draw.texture_mask(), 0b101);
    }

    #[test]
    fn default_draw_state() {
        let draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        assert!(draw.flags.contains(DrawFlags::CAST_SHADOWS));
        assert!(!draw.flags.contains(DrawFlags::UNLIT));
        assert_eq!(draw.tint, Vec4::ONE);
    }

    #[test]
    fn commands_share_buffers() {
        let vertices: Arc<[Vertex]> = Arc::from(vec![Vertex::default(); 3]);
        let cmd = RenderCommand::GenerateMesh {
            id: RenderId(1),
            vertices: Arc::clone(&vertices),
            indices: Arc::from(vec![0, 1, 2]),
        };
        let copy = cmd.clone();
        assert_eq!(Arc::strong_count(&vertices), 3);
        assert_eq!(copy.name(), "generate_mesh");
    }
}
