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

//! Vertex layout shared by every mesh.

use crate::renderer::error::ResourceError;
use std::mem;

/// A single mesh vertex, laid out exactly as the vertex shaders read it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

/// One float attribute of [`Vertex`] as seen by the vertex shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader `layout(location = N)`.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset inside the vertex.
    pub offset: u32,
}

/// Indices of a quad built by [`Vertex::quad`]: two counter-clockwise triangles.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

impl Vertex {
    /// Size of one vertex in bytes.
    pub const STRIDE: u32 = mem::size_of::<Vertex>() as u32;

    /// Attribute layout: position at 0, normal at 1, uv at 2.
    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: mem::offset_of!(Vertex, position) as u32,
        },
        VertexAttribute {
            location: 1,
            components: 3,
            offset: mem::offset_of!(Vertex, normal) as u32,
        },
        VertexAttribute {
            location: 2,
            components: 2,
            offset: mem::offset_of!(Vertex, uv) as u32,
        },
    ];

    /// Creates a vertex.
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// A unit quad in the XY plane facing +Z, centered on the origin.
    ///
    /// Corners go bottom-left, bottom-right, top-right, top-left, so with
    /// [`QUAD_INDICES`] both triangles wind counter-clockwise when seen from +Z.
    /// This is the only quad convention in the renderer, and it matches the
    /// default OpenGL front face.
    pub fn quad(half_extent: f32) -> ([Vertex; 4], [u32; 6]) {
        let h = half_extent;
        let n = [0.0, 0.0, 1.0];
        (
            [
                Vertex::new([-h, -h, 0.0], n, [0.0, 0.0]),
                Vertex::new([h, -h, 0.0], n, [1.0, 0.0]),
                Vertex::new([h, h, 0.0], n, [1.0, 1.0]),
                Vertex::new([-h, h, 0.0], n, [0.0, 1.0]),
            ],
            QUAD_INDICES,
        )
    }
}

/// Checks that a mesh can be uploaded: non-empty, a whole number of
/// triangles, and every index inside the vertex range.
pub fn validate_mesh(vertices: &[Vertex], indices: &[u32]) -> Result<(), ResourceError> {
    if vertices.is_empty() {
        return Err(ResourceError::InvalidMesh("no vertices"));
    }
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(ResourceError::InvalidMesh(
            "index count must be a non-zero multiple of 3",
        ));
    }
    if indices.iter().any(|&i| i as usize >= vertices.len()) {
        return Err(ResourceError::InvalidMesh("index out of vertex range"));
    }
    Ok(())
}
