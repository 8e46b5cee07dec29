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

//! An in-memory [`GlApi`] used by tests, CI and the sandbox.
//!
//! It keeps track of every object it hands out, stores buffer contents and
//! attachment sizes, and logs draw calls, so the effects of the OpenGL
//! backend can be observed without a GPU. Shader failures and context loss
//! can be injected.

use super::api::{Attachment, BufferTarget, GlApi, GlObject, RenderTargetKind, StageSource};
use lumen_core::math::Extent2D;
use lumen_core::renderer::{ShaderStage, TextureDescriptor, UniformBinding, VertexAttribute};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    /// Label of the bound framebuffer, `None` for the default framebuffer.
    pub framebuffer: Option<String>,
    /// Label of the current program.
    pub program: Option<String>,
    /// Vertex array drawn, `None` for `draw_arrays`.
    pub vertex_array: Option<GlObject>,
    /// Index or vertex count.
    pub count: u32,
    /// Textures bound to units 0..4 at the time of the draw.
    pub textures: [Option<GlObject>; 4],
    /// Contents of the per-draw transform block at the time of the draw.
    pub transform: Option<Vec<u8>>,
}

const SPIRV_MAGIC: u32 = 0x0723_0203;
const SPIRV_HEADER_BYTES: usize = 20;

#[derive(Debug)]
enum Object {
    Buffer(Vec<u8>),
    VertexArray,
    Texture { size: (u32, u32, u32) },
    RenderTarget { kind: RenderTargetKind, size: Extent2D },
    Framebuffer { label: String, attachments: Vec<(Attachment, GlObject)> },
    Shader,
    Program { label: String },
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_name: u32,
    objects: HashMap<u32, Object>,
    uniform_bindings: HashMap<u32, GlObject>,
    texture_units: HashMap<u32, GlObject>,
    framebuffer: Option<GlObject>,
    program: Option<GlObject>,
    viewport: Extent2D,
    draws: Vec<DrawRecord>,
    presented: u64,
    context_lost: bool,
    failing_stages: Vec<(ShaderStage, String)>,
    failing_links: Vec<String>,
    failing_framebuffers: Vec<String>,
}

impl HeadlessState {
    fn allocate(&mut self, object: Object) -> GlObject {
        self.next_name += 1;
        self.objects.insert(self.next_name, object);
        GlObject(self.next_name)
    }

    fn label_of(&self, object: Option<GlObject>) -> Option<String> {
        match object.and_then(|o| self.objects.get(&o.0)) {
            Some(Object::Framebuffer { label, .. }) | Some(Object::Program { label }) => {
                Some(label.clone())
            }
            _ => None,
        }
    }

    fn record_draw(&mut self, vertex_array: Option<GlObject>, count: u32) {
        let textures = std::array::from_fn(|unit| self.texture_units.get(&(unit as u32)).copied());
        let transform = self
            .uniform_bindings
            .get(&UniformBinding::Transform.index())
            .and_then(|buffer| match self.objects.get(&buffer.0) {
                Some(Object::Buffer(data)) => Some(data.clone()),
                _ => None,
            });
        let record = DrawRecord {
            framebuffer: self.label_of(self.framebuffer),
            program: self.label_of(self.program),
            vertex_array,
            count,
            textures,
            transform,
        };
        self.draws.push(record);
    }
}

/// A [`GlApi`] that runs entirely in memory.
///
/// Cloning yields another handle to the same state, so a test can keep a
/// clone for inspection after handing one to the backend.
#[derive(Debug, Clone, Default)]
pub struct HeadlessGl {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessGl {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates losing (or restoring) the context.
    pub fn set_context_lost(&self, lost: bool) {
        self.state().context_lost = lost;
    }

    /// Makes compilation of `stage` fail for every GLSL source containing `needle`.
    pub fn fail_compilation(&self, stage: ShaderStage, needle: impl Into<String>) {
        self.state().failing_stages.push((stage, needle.into()));
    }

    /// Makes linking fail for the program labelled `label`.
    pub fn fail_link(&self, label: impl Into<String>) {
        self.state().failing_links.push(label.into());
    }

    /// Makes creation of the framebuffer labelled `label` fail as incomplete.
    pub fn fail_framebuffer(&self, label: impl Into<String>) {
        self.state().failing_framebuffers.push(label.into());
    }

    /// Current contents of the buffer bound at uniform `binding`.
    pub fn uniform_buffer_contents(&self, binding: u32) -> Option<Vec<u8>> {
        let state = self.state();
        let buffer = state.uniform_bindings.get(&binding)?;
        match state.objects.get(&buffer.0) {
            Some(Object::Buffer(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Size of the first attachment of the framebuffer labelled `label`.
    pub fn framebuffer_size(&self, label: &str) -> Option<Extent2D> {
        let state = self.state();
        state.objects.values().find_map(|object| match object {
            Object::Framebuffer {
                label: l,
                attachments,
            } if l == label => attachments.iter().find_map(|(_, target)| {
                match state.objects.get(&target.0) {
                    Some(Object::RenderTarget { size, .. }) => Some(*size),
                    _ => None,
                }
            }),
            _ => None,
        })
    }

    /// Kind of the render target attached at `attachment` on framebuffer `label`.
    pub fn attachment_kind(&self, label: &str, attachment: Attachment) -> Option<RenderTargetKind> {
        let state = self.state();
        state.objects.values().find_map(|object| match object {
            Object::Framebuffer {
                label: l,
                attachments,
            } if l == label => attachments
                .iter()
                .find(|(a, _)| *a == attachment)
                .and_then(|(_, target)| match state.objects.get(&target.0) {
                    Some(Object::RenderTarget { kind, .. }) => Some(*kind),
                    _ => None,
                }),
            _ => None,
        })
    }

    /// Width, height and depth of a sampled texture.
    pub fn texture_size(&self, texture: GlObject) -> Option<(u32, u32, u32)> {
        match self.state().objects.get(&texture.0) {
            Some(Object::Texture { size, .. }) => Some(*size),
            _ => None,
        }
    }

    /// Number of live sampled textures.
    pub fn texture_count(&self) -> usize {
        self.count(|o| matches!(o, Object::Texture { .. }))
    }

    /// Number of live vertex arrays.
    pub fn vertex_array_count(&self) -> usize {
        self.count(|o| matches!(o, Object::VertexArray))
    }

    /// Number of live programs.
    pub fn program_count(&self) -> usize {
        self.count(|o| matches!(o, Object::Program { .. }))
    }

    /// Number of live objects of any kind.
    pub fn live_objects(&self) -> usize {
        self.state().objects.len()
    }

    fn count(&self, predicate: impl Fn(&Object) -> bool) -> usize {
        self.state().objects.values().filter(|o| predicate(o)).count()
    }

    /// Draw calls issued since the last [`HeadlessGl::take_draws`].
    pub fn take_draws(&self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.state().draws)
    }

    /// Number of `swap_buffers` calls.
    pub fn presented_frames(&self) -> u64 {
        self.state().presented
    }

    /// The last viewport set.
    pub fn viewport(&self) -> Extent2D {
        self.state().viewport
    }
}

impl GlApi for HeadlessGl {
    fn is_context_lost(&self) -> bool {
        self.state().context_lost
    }

    fn create_buffer(&self, _target: BufferTarget, data: &[u8]) -> Result<GlObject, String> {
        Ok(self.state().allocate(Object::Buffer(data.to_vec())))
    }

    fn write_buffer(&self, buffer: GlObject, offset: usize, data: &[u8]) {
        let mut state = self.state();
        match state.objects.get_mut(&buffer.0) {
            Some(Object::Buffer(contents)) => {
                let end = offset + data.len();
                if contents.len() < end {
                    contents.resize(end, 0);
                }
                contents[offset..end].copy_from_slice(data);
            }
            _ => log::warn!("HeadlessGl: write to unknown buffer {buffer}"),
        }
    }

    fn bind_uniform_buffer(&self, binding: u32, buffer: GlObject) {
        self.state().uniform_bindings.insert(binding, buffer);
    }

    fn delete_buffer(&self, buffer: GlObject) {
        let mut state = self.state();
        state.objects.remove(&buffer.0);
        state.uniform_bindings.retain(|_, b| *b != buffer);
    }

    fn create_vertex_array(
        &self,
        vertex_buffer: GlObject,
        index_buffer: GlObject,
        _stride: u32,
        _attributes: &[VertexAttribute],
    ) -> Result<GlObject, String> {
        let mut state = self.state();
        for buffer in [vertex_buffer, index_buffer] {
            if !matches!(state.objects.get(&buffer.0), Some(Object::Buffer(_))) {
                return Err(format!("{buffer} is not a buffer"));
            }
        }
        Ok(state.allocate(Object::VertexArray))
    }

    fn delete_vertex_array(&self, vertex_array: GlObject) {
        self.state().objects.remove(&vertex_array.0);
    }

    fn create_texture(&self, descriptor: &TextureDescriptor, pixels: &[u8]) -> Result<GlObject, String> {
        let expected = descriptor.expected_buffer_size().map_err(|e| e.to_string())?;
        if pixels.len() != expected {
            return Err(format!("texel upload of {} bytes, expected {expected}", pixels.len()));
        }
        let size = (descriptor.width, descriptor.height, descriptor.depth);
        Ok(self.state().allocate(Object::Texture { size }))
    }

    fn create_render_target(&self, kind: RenderTargetKind, size: Extent2D) -> Result<GlObject, String> {
        if size.is_empty() {
            return Err(format!("render target of size {size}"));
        }
        Ok(self.state().allocate(Object::RenderTarget { kind, size }))
    }

    fn bind_texture(&self, unit: u32, texture: Option<GlObject>) {
        let mut state = self.state();
        match texture {
            Some(texture) => state.texture_units.insert(unit, texture),
            None => state.texture_units.remove(&unit),
        };
    }

    fn delete_texture(&self, texture: GlObject) {
        let mut state = self.state();
        state.objects.remove(&texture.0);
        state.texture_units.retain(|_, t| *t != texture);
    }

    fn create_framebuffer(
        &self,
        label: &str,
        attachments: &[(Attachment, GlObject)],
    ) -> Result<GlObject, String> {
        let mut state = self.state();
        if state.failing_framebuffers.iter().any(|l| l == label) {
            return Err(format!("framebuffer '{label}': GL_FRAMEBUFFER_INCOMPLETE"));
        }
        for (_, target) in attachments {
            if !matches!(state.objects.get(&target.0), Some(Object::RenderTarget { .. })) {
                return Err(format!("framebuffer '{label}': {target} is not a render target"));
            }
        }
        Ok(state.allocate(Object::Framebuffer {
            label: label.to_string(),
            attachments: attachments.to_vec(),
        }))
    }

    fn bind_framebuffer(&self, framebuffer: Option<GlObject>) {
        self.state().framebuffer = framebuffer;
    }

    fn delete_framebuffer(&self, framebuffer: GlObject) {
        let mut state = self.state();
        state.objects.remove(&framebuffer.0);
        if state.framebuffer == Some(framebuffer) {
            state.framebuffer = None;
        }
    }

    fn compile_shader(&self, stage: ShaderStage, source: StageSource<'_>) -> Result<GlObject, String> {
        let mut state = self.state();
        match source {
            StageSource::Glsl(text) => {
                if !text.trim_start().starts_with("#version") {
                    return Err("0:1: error: missing #version directive".to_string());
                }
                if let Some((_, needle)) = state
                    .failing_stages
                    .iter()
                    .find(|(s, needle)| *s == stage && text.contains(needle.as_str()))
                {
                    return Err(format!("0:1: error: injected failure on '{needle}'"));
                }
            }
            StageSource::Binary {
                blob, entry_point, ..
            } => {
                if blob.len() % 4 != 0 || blob.len() < SPIRV_HEADER_BYTES {
                    return Err("invalid SPIR-V module size".to_string());
                }
                if blob[..4] != SPIRV_MAGIC.to_le_bytes() {
                    return Err("invalid SPIR-V magic number".to_string());
                }
                if entry_point.is_empty() {
                    return Err(format!("{stage} stage has no entry point"));
                }
            }
        }
        Ok(state.allocate(Object::Shader))
    }

    fn link_program(&self, label: &str, shaders: &[GlObject]) -> Result<GlObject, String> {
        let mut state = self.state();
        if state.failing_links.iter().any(|l| l == label) {
            return Err(format!("error: injected link failure for '{label}'"));
        }
        if shaders
            .iter()
            .any(|s| !matches!(state.objects.get(&s.0), Some(Object::Shader)))
        {
            return Err("error: attached object is not a shader".to_string());
        }
        Ok(state.allocate(Object::Program {
            label: label.to_string(),
        }))
    }

    fn delete_shader(&self, shader: GlObject) {
        self.state().objects.remove(&shader.0);
    }

    fn delete_program(&self, program: GlObject) {
        let mut state = self.state();
        state.objects.remove(&program.0);
        if state.program == Some(program) {
            state.program = None;
        }
    }

    fn use_program(&self, program: GlObject) {
        self.state().program = Some(program);
    }

    fn viewport(&self, size: Extent2D) {
        self.state().viewport = size;
    }

    fn clear(&self, _color: Option<[f32; 4]>, _depth: bool) {}

    fn set_cull_face(&self, _enabled: bool) {}

    fn set_blend(&self, _enabled: bool) {}

    fn draw_elements(&self, vertex_array: GlObject, index_count: u32) {
        self.state().record_draw(Some(vertex_array), index_count);
    }

    fn draw_arrays(&self, vertex_count: u32) {
        self.state().record_draw(None, vertex_count);
    }

    fn swap_buffers(&self) {
        self.state().presented += 1;
    }
}
