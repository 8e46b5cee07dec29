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

//! The narrow set of native OpenGL entry points the backend is written against.
//!
//! A platform layer implements [`GlApi`] on top of its loaded function
//! pointers. [`HeadlessGl`](super::HeadlessGl) implements it in memory.

use lumen_core::math::Extent2D;
use lumen_core::renderer::{ShaderStage, SpecializationConstant, TextureDescriptor, VertexAttribute};
use std::fmt;

/// A native object name (`GLuint`). Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlObject(pub u32);

impl fmt::Display for GlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gl#{}", self.0)
    }
}

/// What a buffer object is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`.
    Vertex,
    /// `GL_ELEMENT_ARRAY_BUFFER`.
    Index,
    /// `GL_UNIFORM_BUFFER`.
    Uniform,
}

/// Storage created for framebuffer attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTargetKind {
    /// `GL_RGBA16F` 2D color.
    Color,
    /// `GL_DEPTH_COMPONENT24` 2D depth.
    Depth,
    /// `GL_DEPTH_COMPONENT24` cube map, six layers.
    DepthCube,
}

/// Where a render target is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    /// `GL_COLOR_ATTACHMENT0`.
    Color0,
    /// `GL_DEPTH_ATTACHMENT`.
    Depth,
}

/// The source of one shader stage as handed to the driver.
#[derive(Debug, Clone, Copy)]
pub enum StageSource<'a> {
    /// GLSL text, compiled with `glCompileShader`.
    Glsl(&'a str),
    /// A SPIR-V module, loaded with `glShaderBinary` and `glSpecializeShader`.
    Binary {
        /// Module bytes.
        blob: &'a [u8],
        /// Entry point.
        entry_point: &'a str,
        /// Specialization constants.
        specializations: &'a [SpecializationConstant],
    },
}

/// Native OpenGL entry points.
///
/// Fallible calls return the driver's info log or error description as a
/// `String`.
pub trait GlApi: fmt::Debug + Send {
    /// Returns `true` once the context is lost (`GL_CONTEXT_LOST`).
    fn is_context_lost(&self) -> bool;

    /// Creates and fills a buffer object.
    fn create_buffer(&self, target: BufferTarget, data: &[u8]) -> Result<GlObject, String>;
    /// Overwrites part of a buffer (`glBufferSubData`).
    fn write_buffer(&self, buffer: GlObject, offset: usize, data: &[u8]);
    /// Binds a uniform buffer to an indexed binding point (`glBindBufferBase`).
    fn bind_uniform_buffer(&self, binding: u32, buffer: GlObject);
    /// Deletes a buffer object.
    fn delete_buffer(&self, buffer: GlObject);

    /// Creates a vertex array reading interleaved attributes from `vertex_buffer`.
    fn create_vertex_array(
        &self,
        vertex_buffer: GlObject,
        index_buffer: GlObject,
        stride: u32,
        attributes: &[VertexAttribute],
    ) -> Result<GlObject, String>;
    /// Deletes a vertex array. Its buffers are deleted separately.
    fn delete_vertex_array(&self, vertex_array: GlObject);

    /// Creates a sampled texture and uploads its texels.
    fn create_texture(&self, descriptor: &TextureDescriptor, pixels: &[u8]) -> Result<GlObject, String>;
    /// Allocates attachment storage.
    fn create_render_target(&self, kind: RenderTargetKind, size: Extent2D) -> Result<GlObject, String>;
    /// Binds a texture (or nothing) to a texture unit.
    fn bind_texture(&self, unit: u32, texture: Option<GlObject>);
    /// Deletes a texture or render target.
    fn delete_texture(&self, texture: GlObject);

    /// Creates a framebuffer from attachments. `label` is applied with `glObjectLabel`.
    fn create_framebuffer(
        &self,
        label: &str,
        attachments: &[(Attachment, GlObject)],
    ) -> Result<GlObject, String>;
    /// Binds a framebuffer, or the default framebuffer for `None`.
    fn bind_framebuffer(&self, framebuffer: Option<GlObject>);
    /// Deletes a framebuffer. Attachments are deleted separately.
    fn delete_framebuffer(&self, framebuffer: GlObject);

    /// Compiles one stage.
    fn compile_shader(&self, stage: ShaderStage, source: StageSource<'_>) -> Result<GlObject, String>;
    /// Links compiled stages into a program. `label` is applied with `glObjectLabel`.
    fn link_program(&self, label: &str, shaders: &[GlObject]) -> Result<GlObject, String>;
    /// Deletes a shader stage object.
    fn delete_shader(&self, shader: GlObject);
    /// Deletes a program.
    fn delete_program(&self, program: GlObject);
    /// Makes a program current.
    fn use_program(&self, program: GlObject);

    /// Sets the viewport to `(0, 0, size)`.
    fn viewport(&self, size: Extent2D);
    /// Clears the bound framebuffer.
    fn clear(&self, color: Option<[f32; 4]>, depth: bool);
    /// Enables or disables back-face culling.
    fn set_cull_face(&self, enabled: bool);
    /// Enables or disables alpha blending.
    fn set_blend(&self, enabled: bool);
    /// Draws indexed triangles from a vertex array.
    fn draw_elements(&self, vertex_array: GlObject, index_count: u32);
    /// Draws non-indexed triangles with no vertex input (full-screen passes).
    fn draw_arrays(&self, vertex_count: u32);
    /// Presents the default framebuffer.
    fn swap_buffers(&self);
}
