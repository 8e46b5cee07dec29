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

//! The OpenGL implementation of [`RenderBackend`].

use super::api::{Attachment, BufferTarget, GlApi, GlObject, RenderTargetKind, StageSource};
use super::shaders::builtin_source;
use super::table::ResourceTable;
use bytemuck::Zeroable;
use lumen_core::math::Extent2D;
use lumen_core::platform::SurfaceInfo;
use lumen_core::renderer::mesh::validate_mesh;
use lumen_core::renderer::{
    BackendCapabilities, CameraUniforms, DrawCommand, DrawFlags, FrameDataUniforms,
    GraphicsBackendType, LightsUniforms, RenderBackend, RenderCommand, RenderData, RenderError,
    RenderId, ResourceError, ShaderError, ShaderProgramKind, ShaderSource, ShaderStage,
    TextureDescriptor, TransformUniforms, UniformBinding, UniformBlock, Vertex,
    MAX_DRAW_TEXTURES, MAX_POINT_LIGHTS,
};
use std::ops::Range;

/// Shader program table size.
pub const MAX_SHADER_PROGRAMS: usize = 4;
/// Uniform buffer table size.
pub const MAX_UNIFORM_BUFFERS: usize = 4;
/// Framebuffer table size.
pub const MAX_FRAMEBUFFERS: usize = 6;
/// Texture table size.
pub const MAX_TEXTURES: usize = 255;
/// Vertex array table size.
pub const MAX_VERTEX_ARRAYS: usize = 255;

/// Framebuffer slot of the offscreen scene target resolved by the post-process pass.
pub const POST_PROCESS_FRAMEBUFFER: usize = 0;
/// Framebuffer slot of the directional shadow map.
pub const DIRECTIONAL_SHADOW_FRAMEBUFFER: usize = 1;
/// First framebuffer slot of the point shadow cube maps, one per light slot.
pub const POINT_SHADOW_FRAMEBUFFER: usize = 2;
/// Framebuffer slots holding shadow maps.
pub const SHADOW_FRAMEBUFFERS: Range<usize> = DIRECTIONAL_SHADOW_FRAMEBUFFER..MAX_FRAMEBUFFERS;

/// First texture unit used for shadow maps. Units below it hold draw textures.
const SHADOW_TEXTURE_UNIT: u32 = MAX_DRAW_TEXTURES as u32;

#[derive(Debug)]
struct GlMesh {
    vertex_array: GlObject,
    vertex_buffer: GlObject,
    index_buffer: GlObject,
    index_count: u32,
}

#[derive(Debug)]
struct GlTexture {
    object: GlObject,
    descriptor: TextureDescriptor,
}

#[derive(Debug)]
struct GlFramebuffer {
    object: GlObject,
    color: Option<GlObject>,
    depth: GlObject,
    size: Extent2D,
}

/// A draw resolved against the tables when its command executed.
#[derive(Debug)]
struct ResolvedDraw {
    vertex_array: GlObject,
    index_count: u32,
    textures: [Option<GlObject>; MAX_DRAW_TEXTURES],
    flags: DrawFlags,
    transform: TransformUniforms,
    camera: CameraUniforms,
}

/// Native objects whose deletion waits for the end of the frame.
#[derive(Debug)]
enum PendingDelete {
    Mesh(GlMesh),
    Texture(GlObject),
}

/// The OpenGL backend.
///
/// Draw commands are resolved to native objects as they execute and rendered
/// in [`RenderBackend::end_frame`]: shadow passes, the Phong-BRDF main pass
/// into the offscreen target, then the post-process pass to the surface.
/// Objects of resources retired during a frame are deleted after its passes.
#[derive(Debug)]
pub struct GlBackend {
    gl: Box<dyn GlApi>,
    programs: ResourceTable<GlObject, MAX_SHADER_PROGRAMS>,
    uniform_buffers: ResourceTable<GlObject, MAX_UNIFORM_BUFFERS>,
    framebuffers: ResourceTable<GlFramebuffer, MAX_FRAMEBUFFERS>,
    textures: ResourceTable<GlTexture, MAX_TEXTURES>,
    meshes: ResourceTable<GlMesh, MAX_VERTEX_ARRAYS>,
    surface_size: Extent2D,
    framebuffer_size: Extent2D,
    shadow_map_size: u32,
    clear_color: [f32; 4],
    camera: CameraUniforms,
    lights: LightsUniforms,
    draws: Vec<ResolvedDraw>,
    pending_deletes: Vec<PendingDelete>,
    shader_errors: Vec<ShaderError>,
    initialized: bool,
    in_frame: bool,
}

impl GlBackend {
    /// Wraps a set of native entry points. Nothing is created until
    /// [`RenderBackend::init`].
    pub fn new(gl: Box<dyn GlApi>) -> Self {
        log::info!("GlBackend created (uninitialized).");
        Self {
            gl,
            programs: ResourceTable::new(),
            uniform_buffers: ResourceTable::new(),
            framebuffers: ResourceTable::new(),
            textures: ResourceTable::new(),
            meshes: ResourceTable::new(),
            surface_size: Extent2D::default(),
            framebuffer_size: Extent2D::default(),
            shadow_map_size: 0,
            clear_color: [0.0; 4],
            camera: CameraUniforms::zeroed(),
            lights: LightsUniforms::zeroed(),
            draws: Vec::new(),
            pending_deletes: Vec::new(),
            shader_errors: Vec::new(),
            initialized: false,
            in_frame: false,
        }
    }

    /// Programs that failed to build at initialization.
    pub fn shader_errors(&self) -> &[ShaderError] {
        &self.shader_errors
    }

    /// Returns `true` if `kind` built successfully.
    pub fn has_program(&self, kind: ShaderProgramKind) -> bool {
        self.programs.contains(RenderId::from_slot(kind.slot()))
    }

    /// Size of the framebuffer in `slot`, if it exists.
    pub fn framebuffer_size(&self, slot: usize) -> Option<Extent2D> {
        self.framebuffers.get(RenderId::from_slot(slot)).map(|fb| fb.size)
    }

    /// Current shadow map resolution.
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Number of live meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Changes the shadow map resolution, rebuilding every shadow framebuffer.
    ///
    /// # Errors
    ///
    /// [`ResourceError::Backend`] if a framebuffer could not be rebuilt.
    pub fn set_shadow_map_size(&mut self, size: u32) -> Result<(), ResourceError> {
        if size == self.shadow_map_size {
            return Ok(());
        }
        log::info!("GlBackend: shadow map size {} -> {}", self.shadow_map_size, size);
        self.shadow_map_size = size;
        self.create_framebuffers(SHADOW_FRAMEBUFFERS.start, SHADOW_FRAMEBUFFERS.end)
    }

    fn program(&self, kind: ShaderProgramKind) -> Option<GlObject> {
        self.programs.get(RenderId::from_slot(kind.slot())).copied()
    }

    fn framebuffer(&self, slot: usize) -> Option<&GlFramebuffer> {
        self.framebuffers.get(RenderId::from_slot(slot))
    }

    fn upload<B: UniformBlock>(&self, block: &B) {
        if let Some(buffer) = self
            .uniform_buffers
            .get(RenderId::from_slot(B::BINDING.index() as usize))
        {
            self.gl.write_buffer(*buffer, 0, block.as_bytes());
        }
    }

    fn create_uniform_buffers(&mut self) -> Result<(), RenderError> {
        for binding in UniformBinding::ALL {
            let zeroes = vec![0u8; binding.block_size()];
            let buffer = self
                .gl
                .create_buffer(BufferTarget::Uniform, &zeroes)
                .map_err(|e| {
                    RenderError::InitializationFailed(format!(
                        "Failed to create {binding:?} uniform buffer: {e}"
                    ))
                })?;
            self.gl.bind_uniform_buffer(binding.index(), buffer);
            if let Err((err, buffer)) = self
                .uniform_buffers
                .insert(RenderId::from_slot(binding.index() as usize), buffer)
            {
                self.gl.delete_buffer(buffer);
                return Err(RenderError::Resource(err));
            }
        }
        Ok(())
    }

    fn build_program(
        &self,
        kind: ShaderProgramKind,
        source: &ShaderSource,
    ) -> Result<GlObject, ShaderError> {
        let stages: Vec<(ShaderStage, StageSource<'_>)> = match source {
            ShaderSource::Glsl {
                vertex,
                geometry,
                fragment,
            } => {
                let mut stages = vec![(ShaderStage::Vertex, StageSource::Glsl(vertex))];
                if let Some(geometry) = geometry {
                    stages.push((ShaderStage::Geometry, StageSource::Glsl(geometry)));
                }
                stages.push((ShaderStage::Fragment, StageSource::Glsl(fragment)));
                stages
            }
            ShaderSource::Binary(stages) => stages
                .iter()
                .map(|s| {
                    (
                        s.stage,
                        StageSource::Binary {
                            blob: &s.blob,
                            entry_point: &s.entry_point,
                            specializations: &s.specializations,
                        },
                    )
                })
                .collect(),
        };

        let mut compiled = Vec::with_capacity(stages.len());
        for (stage, stage_source) in stages {
            match self.gl.compile_shader(stage, stage_source) {
                Ok(shader) => compiled.push(shader),
                Err(details) => {
                    compiled.into_iter().for_each(|s| self.gl.delete_shader(s));
                    return Err(ShaderError::CompilationFailed {
                        program: kind,
                        stage,
                        details,
                    });
                }
            }
        }

        let linked = self.gl.link_program(kind.label(), &compiled);
        compiled.into_iter().for_each(|s| self.gl.delete_shader(s));
        linked.map_err(|details| ShaderError::LinkFailed {
            program: kind,
            details,
        })
    }

    fn create_programs(&mut self, render_data: &RenderData) {
        self.shader_errors.clear();
        for kind in ShaderProgramKind::ALL {
            let source = render_data
                .shader_overrides
                .get(&kind)
                .cloned()
                .unwrap_or_else(|| builtin_source(kind));
            match self.build_program(kind, &source) {
                Ok(program) => {
                    if let Err((_, program)) =
                        self.programs.insert(RenderId::from_slot(kind.slot()), program)
                    {
                        self.gl.delete_program(program);
                    } else {
                        log::debug!("GlBackend: Built shader program '{kind}'.");
                    }
                }
                Err(err) => {
                    log::error!("{err}");
                    self.shader_errors.push(err);
                }
            }
        }
    }

    fn framebuffer_spec(&self, slot: usize) -> (String, Option<RenderTargetKind>, RenderTargetKind, Extent2D) {
        let shadow = Extent2D::square(self.shadow_map_size);
        match slot {
            POST_PROCESS_FRAMEBUFFER => (
                "post_process".to_string(),
                Some(RenderTargetKind::Color),
                RenderTargetKind::Depth,
                self.framebuffer_size,
            ),
            DIRECTIONAL_SHADOW_FRAMEBUFFER => (
                "directional_shadow".to_string(),
                None,
                RenderTargetKind::Depth,
                shadow,
            ),
            _ => (
                format!("point_shadow_{}", slot - POINT_SHADOW_FRAMEBUFFER),
                None,
                RenderTargetKind::DepthCube,
                shadow,
            ),
        }
    }

    fn delete_framebuffer(&self, framebuffer: GlFramebuffer) {
        self.gl.delete_framebuffer(framebuffer.object);
        if let Some(color) = framebuffer.color {
            self.gl.delete_texture(color);
        }
        self.gl.delete_texture(framebuffer.depth);
    }

    /// (Re)creates the framebuffers in slots `from_inclusive..to_exclusive`
    /// at their current target sizes.
    ///
    /// A slot whose size is empty is left without a framebuffer.
    pub fn create_framebuffers(
        &mut self,
        from_inclusive: usize,
        to_exclusive: usize,
    ) -> Result<(), ResourceError> {
        for slot in from_inclusive..to_exclusive.min(MAX_FRAMEBUFFERS) {
            let id = RenderId::from_slot(slot);
            if let Some(old) = self.framebuffers.remove(id) {
                self.delete_framebuffer(old);
            }

            let (label, color_kind, depth_kind, size) = self.framebuffer_spec(slot);
            if size.is_empty() {
                log::debug!("GlBackend: Skipping framebuffer '{label}' of empty size.");
                continue;
            }

            let color = color_kind
                .map(|kind| self.gl.create_render_target(kind, size))
                .transpose()
                .map_err(ResourceError::Backend)?;
            let depth = match self.gl.create_render_target(depth_kind, size) {
                Ok(depth) => depth,
                Err(e) => {
                    color.into_iter().for_each(|c| self.gl.delete_texture(c));
                    return Err(ResourceError::Backend(e));
                }
            };

            let mut attachments = vec![(Attachment::Depth, depth)];
            if let Some(color) = color {
                attachments.insert(0, (Attachment::Color0, color));
            }
            let object = match self.gl.create_framebuffer(&label, &attachments) {
                Ok(object) => object,
                Err(e) => {
                    attachments
                        .into_iter()
                        .for_each(|(_, target)| self.gl.delete_texture(target));
                    return Err(ResourceError::Backend(e));
                }
            };

            let framebuffer = GlFramebuffer {
                object,
                color,
                depth,
                size,
            };
            if let Err((err, framebuffer)) = self.framebuffers.insert(id, framebuffer) {
                self.delete_framebuffer(framebuffer);
                return Err(err);
            }
            log::debug!("GlBackend: Created framebuffer '{label}' ({size}).");
        }
        Ok(())
    }

    fn generate_mesh(
        &mut self,
        id: RenderId,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), ResourceError> {
        validate_mesh(vertices, indices)?;
        if id.slot().map_or(true, |slot| slot >= MAX_VERTEX_ARRAYS) || self.meshes.contains(id) {
            return Err(ResourceError::InvalidHandle);
        }

        let vertex_buffer = self
            .gl
            .create_buffer(BufferTarget::Vertex, bytemuck::cast_slice(vertices))
            .map_err(ResourceError::Backend)?;
        let index_buffer = match self
            .gl
            .create_buffer(BufferTarget::Index, bytemuck::cast_slice(indices))
        {
            Ok(buffer) => buffer,
            Err(e) => {
                self.gl.delete_buffer(vertex_buffer);
                return Err(ResourceError::Backend(e));
            }
        };
        let vertex_array = match self.gl.create_vertex_array(
            vertex_buffer,
            index_buffer,
            Vertex::STRIDE,
            &Vertex::ATTRIBUTES,
        ) {
            Ok(vao) => vao,
            Err(e) => {
                self.gl.delete_buffer(vertex_buffer);
                self.gl.delete_buffer(index_buffer);
                return Err(ResourceError::Backend(e));
            }
        };

        let mesh = GlMesh {
            vertex_array,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        };
        self.meshes
            .insert(id, mesh)
            .map_err(|(err, mesh)| {
                self.pending_deletes.push(PendingDelete::Mesh(mesh));
                err
            })?;
        log::debug!("GlBackend: Generated mesh {id} ({} indices).", indices.len());
        Ok(())
    }

    fn generate_texture(
        &mut self,
        id: RenderId,
        descriptor: &TextureDescriptor,
        pixels: &[u8],
    ) -> Result<(), ResourceError> {
        descriptor.validate_buffer(pixels.len())?;
        if id.slot().map_or(true, |slot| slot >= MAX_TEXTURES) || self.textures.contains(id) {
            return Err(ResourceError::InvalidHandle);
        }
        let object = self
            .gl
            .create_texture(descriptor, pixels)
            .map_err(ResourceError::Backend)?;
        let texture = GlTexture {
            object,
            descriptor: *descriptor,
        };
        self.textures.insert(id, texture).map_err(|(err, texture)| {
            self.pending_deletes.push(PendingDelete::Texture(texture.object));
            err
        })?;
        log::debug!(
            "GlBackend: Generated texture {id} ({}x{}x{}).",
            descriptor.width,
            descriptor.height,
            descriptor.depth
        );
        Ok(())
    }

    fn resolve_draw(&self, draw: &DrawCommand) -> Result<ResolvedDraw, ResourceError> {
        let mesh = self.meshes.get(draw.mesh).ok_or(ResourceError::InvalidHandle)?;
        let mut textures = [None; MAX_DRAW_TEXTURES];
        for (slot, id) in textures.iter_mut().zip(draw.textures) {
            if id.is_null() {
                continue;
            }
            let texture = self.textures.get(id).ok_or(ResourceError::InvalidHandle)?;
            *slot = Some(texture.object);
        }
        Ok(ResolvedDraw {
            vertex_array: mesh.vertex_array,
            index_count: mesh.index_count,
            textures,
            flags: draw.flags,
            transform: TransformUniforms::from_draw(draw),
            camera: self.camera,
        })
    }

    fn bind_shadow_maps(&self) {
        let directional = self
            .framebuffer(DIRECTIONAL_SHADOW_FRAMEBUFFER)
            .map(|fb| fb.depth);
        self.gl.bind_texture(SHADOW_TEXTURE_UNIT, directional);
        for light in 0..MAX_POINT_LIGHTS {
            let cube = self
                .framebuffer(POINT_SHADOW_FRAMEBUFFER + light)
                .map(|fb| fb.depth);
            self.gl
                .bind_texture(SHADOW_TEXTURE_UNIT + 1 + light as u32, cube);
        }
    }

    fn shadow_pass(&self, program: ShaderProgramKind, slot: usize, light_index: u32) {
        let (Some(program), Some(framebuffer)) = (self.program(program), self.framebuffer(slot))
        else {
            return;
        };
        self.gl.bind_framebuffer(Some(framebuffer.object));
        self.gl.viewport(framebuffer.size);
        self.gl.clear(None, true);
        self.gl.use_program(program);
        self.gl.set_blend(false);
        for draw in &self.draws {
            if !draw.flags.contains(DrawFlags::CAST_SHADOWS)
                || draw.flags.contains(DrawFlags::TRANSPARENT)
            {
                continue;
            }
            let transform = TransformUniforms {
                shadow_light_index: light_index,
                ..draw.transform
            };
            self.upload(&transform);
            self.gl.set_cull_face(!draw.flags.contains(DrawFlags::DOUBLE_SIDED));
            self.gl.draw_elements(draw.vertex_array, draw.index_count);
        }
    }

    fn main_pass(&self) {
        let Some(framebuffer) = self.framebuffer(POST_PROCESS_FRAMEBUFFER) else {
            return;
        };
        self.gl.bind_framebuffer(Some(framebuffer.object));
        self.gl.viewport(framebuffer.size);
        self.gl.clear(Some(self.clear_color), true);
        let Some(program) = self.program(ShaderProgramKind::PhongBrdf) else {
            log::debug!("GlBackend: phong_brdf program missing, main pass skipped.");
            return;
        };
        self.gl.use_program(program);
        self.bind_shadow_maps();

        let mut uploaded_camera: Option<CameraUniforms> = None;
        for draw in &self.draws {
            if uploaded_camera != Some(draw.camera) {
                self.upload(&draw.camera);
                uploaded_camera = Some(draw.camera);
            }
            self.upload(&draw.transform);
            for (unit, texture) in draw.textures.iter().enumerate() {
                self.gl.bind_texture(unit as u32, *texture);
            }
            self.gl.set_cull_face(!draw.flags.contains(DrawFlags::DOUBLE_SIDED));
            self.gl.set_blend(draw.flags.contains(DrawFlags::TRANSPARENT));
            self.gl.draw_elements(draw.vertex_array, draw.index_count);
        }
    }

    fn post_process_pass(&self) {
        self.gl.bind_framebuffer(None);
        self.gl.viewport(self.framebuffer_size);
        self.gl.clear(Some(self.clear_color), true);
        let (Some(program), Some(scene)) = (
            self.program(ShaderProgramKind::PostProcess),
            self.framebuffer(POST_PROCESS_FRAMEBUFFER),
        ) else {
            return;
        };
        self.gl.use_program(program);
        self.gl.set_blend(false);
        self.gl.set_cull_face(false);
        self.gl.bind_texture(0, scene.color);
        self.gl.draw_arrays(3);
    }

    fn flush_deletes(&mut self) {
        for pending in self.pending_deletes.drain(..) {
            match pending {
                PendingDelete::Mesh(mesh) => {
                    self.gl.delete_vertex_array(mesh.vertex_array);
                    self.gl.delete_buffer(mesh.vertex_buffer);
                    self.gl.delete_buffer(mesh.index_buffer);
                }
                PendingDelete::Texture(texture) => self.gl.delete_texture(texture),
            }
        }
    }

    /// Deletes every native object the backend owns.
    fn release_all(&mut self) {
        self.draws.clear();
        self.flush_deletes();
        let meshes: Vec<_> = self.meshes.drain().collect();
        for mesh in meshes {
            self.pending_deletes.push(PendingDelete::Mesh(mesh));
        }
        let textures: Vec<_> = self.textures.drain().map(|t| t.object).collect();
        for texture in textures {
            self.pending_deletes.push(PendingDelete::Texture(texture));
        }
        self.flush_deletes();
        let framebuffers: Vec<_> = self.framebuffers.drain().collect();
        for framebuffer in framebuffers {
            self.delete_framebuffer(framebuffer);
        }
        let programs: Vec<_> = self.programs.drain().collect();
        for program in programs {
            self.gl.delete_program(program);
        }
        let buffers: Vec<_> = self.uniform_buffers.drain().collect();
        for buffer in buffers {
            self.gl.delete_buffer(buffer);
        }
    }
}

impl RenderBackend for GlBackend {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::OpenGl
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            max_textures: MAX_TEXTURES,
            max_meshes: MAX_VERTEX_ARRAYS,
            max_shader_programs: MAX_SHADER_PROGRAMS,
            max_uniform_buffers: MAX_UNIFORM_BUFFERS,
            max_framebuffers: MAX_FRAMEBUFFERS,
        }
    }

    fn init(&mut self, surface: SurfaceInfo, render_data: &RenderData) -> Result<(), RenderError> {
        if self.initialized {
            return Err(RenderError::InitializationFailed(
                "GlBackend is already initialized.".to_string(),
            ));
        }
        if self.gl.is_context_lost() {
            return Err(RenderError::InitializationFailed(
                "OpenGL context is lost.".to_string(),
            ));
        }
        log::info!(
            "GlBackend: Initializing on {} ({} surface, {} framebuffer)...",
            surface.platform,
            surface.surface_size,
            surface.framebuffer_size
        );

        self.surface_size = surface.surface_size;
        self.framebuffer_size = surface.framebuffer_size;
        self.shadow_map_size = render_data.shadow_map_size;
        self.clear_color = render_data.clear_color;

        let built = self.create_uniform_buffers().and_then(|()| {
            self.create_programs(render_data);
            self.create_framebuffers(0, MAX_FRAMEBUFFERS).map_err(|e| {
                RenderError::InitializationFailed(format!("Failed to create framebuffers: {e}"))
            })
        });
        if let Err(e) = built {
            log::error!("GlBackend: {e}");
            self.release_all();
            return Err(e);
        }
        self.initialized = true;

        log::info!(
            "GlBackend: Initialized with {}/{} shader programs.",
            self.programs.len(),
            MAX_SHADER_PROGRAMS
        );
        Ok(())
    }

    fn on_resize(&mut self, surface_size: Extent2D, framebuffer_size: Extent2D) {
        log::debug!("GlBackend: Resize to {surface_size} (framebuffer {framebuffer_size}).");
        self.surface_size = surface_size;
        self.framebuffer_size = framebuffer_size;
        if !self.initialized {
            return;
        }
        if let Err(e) = self.create_framebuffers(POST_PROCESS_FRAMEBUFFER, POST_PROCESS_FRAMEBUFFER + 1) {
            log::error!("GlBackend: Failed to resize post-process framebuffer: {e}");
        }
    }

    fn begin_frame(&mut self, frame: &FrameDataUniforms) -> bool {
        if !self.initialized || self.in_frame {
            return false;
        }
        if self.gl.is_context_lost() {
            log::warn!("GlBackend: Context lost, frame skipped.");
            return false;
        }
        if self.framebuffer_size.is_empty() {
            return false;
        }
        if !self.framebuffers.contains(RenderId::from_slot(POST_PROCESS_FRAMEBUFFER)) {
            // Rebuild after a resize from an empty surface.
            if let Err(e) = self.create_framebuffers(POST_PROCESS_FRAMEBUFFER, POST_PROCESS_FRAMEBUFFER + 1) {
                log::error!("GlBackend: {e}");
                return false;
            }
        }
        self.clear_color = frame.clear_color;
        self.upload(frame);
        self.in_frame = true;
        true
    }

    fn execute(&mut self, command: &RenderCommand) -> Result<(), ResourceError> {
        match command {
            RenderCommand::SetCamera(camera) => {
                self.camera = *camera;
                Ok(())
            }
            RenderCommand::Draw3D(draw) => {
                let resolved = self.resolve_draw(draw)?;
                self.draws.push(resolved);
                Ok(())
            }
            RenderCommand::GenerateMesh {
                id,
                vertices,
                indices,
            } => self.generate_mesh(*id, vertices, indices),
            RenderCommand::GenerateTexture {
                id,
                descriptor,
                pixels,
            } => self.generate_texture(*id, descriptor, pixels),
            RenderCommand::RetireMeshes(ids) => {
                for id in ids {
                    if let Some(mesh) = self.meshes.remove(*id) {
                        self.pending_deletes.push(PendingDelete::Mesh(mesh));
                    }
                }
                Ok(())
            }
            RenderCommand::RetireTextures(ids) => {
                for id in ids {
                    if let Some(texture) = self.textures.remove(*id) {
                        self.pending_deletes.push(PendingDelete::Texture(texture.object));
                    }
                }
                Ok(())
            }
            // The frame driver owns the light state and forwards it through
            // `update_lights`.
            RenderCommand::PointLight { .. } | RenderCommand::DirectionalLight(_) => Ok(()),
        }
    }

    fn update_lights(&mut self, lights: &LightsUniforms) {
        self.lights = *lights;
        self.upload(lights);
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::InvalidState {
                operation: "end a frame",
                state: "outside of a frame",
            });
        }

        if self.lights.directional.active != 0 {
            self.shadow_pass(
                ShaderProgramKind::DirectionalShadow,
                DIRECTIONAL_SHADOW_FRAMEBUFFER,
                0,
            );
        }
        for light in 0..MAX_POINT_LIGHTS {
            if self.lights.active_point_mask & (1 << light) != 0 {
                self.shadow_pass(
                    ShaderProgramKind::PointShadow,
                    POINT_SHADOW_FRAMEBUFFER + light,
                    light as u32,
                );
            }
        }
        self.main_pass();
        self.post_process_pass();
        self.gl.swap_buffers();

        self.draws.clear();
        self.flush_deletes();
        self.in_frame = false;
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        log::info!("GlBackend: Shutting down...");
        self.release_all();
        self.initialized = false;
        self.in_frame = false;
        log::info!("GlBackend: Shut down.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::opengl::HeadlessGl;
    use lumen_core::math::Mat4;
    use lumen_core::platform::Platform;
    use lumen_core::renderer::shader::BinaryStage;
    use lumen_core::renderer::{SpecializationConstant, TextureBaseType, TextureFormat};
    use std::sync::Arc;

    fn surface(width: u32, height: u32) -> SurfaceInfo {
        SurfaceInfo {
            platform: Platform::Linux,
            surface_size: Extent2D::new(width, height),
            framebuffer_size: Extent2D::new(width, height),
        }
    }

    fn initialized() -> (GlBackend, HeadlessGl) {
        let gl = HeadlessGl::new();
        let mut backend = GlBackend::new(Box::new(gl.clone()));
        backend.init(surface(800, 600), &RenderData::default()).unwrap();
        (backend, gl)
    }

    fn quad_command(id: RenderId) -> RenderCommand {
        let (vertices, indices) = Vertex::quad(1.0);
        RenderCommand::GenerateMesh {
            id,
            vertices: Arc::from(vertices.as_slice()),
            indices: Arc::from(indices.as_slice()),
        }
    }

    #[test]
    fn init_builds_fixed_resources() {
        let (backend, gl) = initialized();
        assert!(backend.shader_errors().is_empty());
        assert_eq!(gl.program_count(), MAX_SHADER_PROGRAMS);
        assert_eq!(backend.framebuffer_size(0), Some(Extent2D::new(800, 600)));
        assert_eq!(backend.framebuffer_size(1), Some(Extent2D::square(1024)));
        assert_eq!(
            gl.attachment_kind("point_shadow_3", Attachment::Depth),
            Some(RenderTargetKind::DepthCube)
        );
        assert_eq!(
            gl.uniform_buffer_contents(UniformBinding::Lights.index()).map(|b| b.len()),
            Some(std::mem::size_of::<LightsUniforms>())
        );
    }

    #[test]
    fn double_init_is_rejected() {
        let (mut backend, _gl) = initialized();
        assert!(matches!(
            backend.init(surface(8, 8), &RenderData::default()),
            Err(RenderError::InitializationFailed(_))
        ));
    }

    #[test]
    fn failed_program_leaves_slot_empty() {
        let gl = HeadlessGl::new();
        gl.fail_compilation(ShaderStage::Fragment, "phong_brdf");
        let mut backend = GlBackend::new(Box::new(gl.clone()));
        backend.init(surface(64, 64), &RenderData::default()).unwrap();

        assert!(!backend.has_program(ShaderProgramKind::PhongBrdf));
        assert!(backend.has_program(ShaderProgramKind::PostProcess));
        assert!(matches!(
            backend.shader_errors(),
            [ShaderError::CompilationFailed {
                program: ShaderProgramKind::PhongBrdf,
                stage: ShaderStage::Fragment,
                ..
            }]
        ));

        // The frame still completes: the main pass is skipped, post-process runs.
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        backend.execute(&quad_command(RenderId(1))).unwrap();
        let draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        backend.execute(&RenderCommand::Draw3D(draw)).unwrap();
        backend.end_frame().unwrap();
        let draws = gl.take_draws();
        assert!(draws.iter().all(|d| d.program.as_deref() != Some("phong_brdf")));
        assert!(draws.iter().any(|d| d.program.as_deref() == Some("post_process")));
    }

    #[test]
    fn link_failure_is_reported() {
        let gl = HeadlessGl::new();
        gl.fail_link("post_process");
        let mut backend = GlBackend::new(Box::new(gl));
        backend.init(surface(64, 64), &RenderData::default()).unwrap();
        assert!(matches!(
            backend.shader_errors(),
            [ShaderError::LinkFailed {
                program: ShaderProgramKind::PostProcess,
                ..
            }]
        ));
    }

    #[test]
    fn resize_rebuilds_post_process_target() {
        let (mut backend, gl) = initialized();
        backend.on_resize(Extent2D::new(1280, 720), Extent2D::new(2560, 1440));
        assert_eq!(backend.framebuffer_size(0), Some(Extent2D::new(2560, 1440)));
        assert_eq!(gl.framebuffer_size("post_process"), Some(Extent2D::new(2560, 1440)));
        assert_eq!(backend.framebuffer_size(1), Some(Extent2D::square(1024)));
    }

    #[test]
    fn zero_area_surface_skips_frames() {
        let (mut backend, _gl) = initialized();
        backend.on_resize(Extent2D::new(0, 0), Extent2D::new(0, 0));
        assert!(!backend.begin_frame(&FrameDataUniforms::default()));

        backend.on_resize(Extent2D::new(10, 10), Extent2D::new(10, 10));
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        assert_eq!(backend.framebuffer_size(0), Some(Extent2D::new(10, 10)));
    }

    #[test]
    fn shadow_map_size_rebuilds_shadow_range() {
        let (mut backend, gl) = initialized();
        backend.set_shadow_map_size(2048).unwrap();
        for slot in SHADOW_FRAMEBUFFERS {
            assert_eq!(backend.framebuffer_size(slot), Some(Extent2D::square(2048)));
        }
        assert_eq!(gl.framebuffer_size("point_shadow_0"), Some(Extent2D::square(2048)));
        assert_eq!(backend.framebuffer_size(0), Some(Extent2D::new(800, 600)));
    }

    #[test]
    fn draws_render_in_every_active_pass() {
        let (mut backend, gl) = initialized();
        let mut lights = LightsUniforms::default();
        lights.directional.active = 1;
        lights.active_point_mask = 0b0010;
        backend.update_lights(&lights);

        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        backend.execute(&quad_command(RenderId(1))).unwrap();
        let draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        backend.execute(&RenderCommand::Draw3D(draw)).unwrap();
        backend.end_frame().unwrap();

        let framebuffers: Vec<_> = gl
            .take_draws()
            .into_iter()
            .map(|d| d.framebuffer)
            .collect();
        assert_eq!(
            framebuffers,
            vec![
                Some("directional_shadow".to_string()),
                Some("point_shadow_1".to_string()),
                Some("post_process".to_string()),
                None,
            ]
        );
        assert_eq!(gl.presented_frames(), 1);
    }

    #[test]
    fn retire_defers_deletion_to_end_of_frame() {
        let (mut backend, gl) = initialized();
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        backend.execute(&quad_command(RenderId(1))).unwrap();
        let draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        backend.execute(&RenderCommand::Draw3D(draw)).unwrap();
        backend
            .execute(&RenderCommand::RetireMeshes(vec![RenderId(1)]))
            .unwrap();

        assert_eq!(backend.mesh_count(), 0);
        assert_eq!(gl.vertex_array_count(), 1);
        backend.end_frame().unwrap();
        assert_eq!(gl.vertex_array_count(), 0);
        assert!(gl.take_draws().iter().any(|d| d.program.as_deref() == Some("phong_brdf")));
    }

    #[test]
    fn draw_of_retired_mesh_is_rejected() {
        let (mut backend, _gl) = initialized();
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        let draw = DrawCommand::new(RenderId(9), Mat4::IDENTITY);
        assert_eq!(
            backend.execute(&RenderCommand::Draw3D(draw)),
            Err(ResourceError::InvalidHandle)
        );
    }

    #[test]
    fn texture_generation_validates_and_binds() {
        let (mut backend, gl) = initialized();
        let descriptor = TextureDescriptor::new_2d(2, 2, TextureFormat::Rgba, TextureBaseType::U8);
        assert!(backend.begin_frame(&FrameDataUniforms::default()));

        let short = RenderCommand::GenerateTexture {
            id: RenderId(1),
            descriptor,
            pixels: Arc::from(vec![0u8; 15]),
        };
        assert!(matches!(
            backend.execute(&short),
            Err(ResourceError::BufferSizeMismatch { expected: 16, actual: 15 })
        ));

        let ok = RenderCommand::GenerateTexture {
            id: RenderId(1),
            descriptor,
            pixels: Arc::from(vec![0u8; 16]),
        };
        backend.execute(&ok).unwrap();
        backend.execute(&quad_command(RenderId(1))).unwrap();
        let mut draw = DrawCommand::new(RenderId(1), Mat4::IDENTITY);
        draw.textures[0] = RenderId(1);
        backend.execute(&RenderCommand::Draw3D(draw)).unwrap();
        backend.end_frame().unwrap();

        assert_eq!(backend.texture_count(), 1);
        assert_eq!(gl.texture_count(), 1);
        let main = gl
            .take_draws()
            .into_iter()
            .find(|d| d.program.as_deref() == Some("phong_brdf"))
            .unwrap();
        assert!(main.textures[0].is_some());
    }

    #[test]
    fn end_frame_outside_frame_is_an_error() {
        let (mut backend, _gl) = initialized();
        assert!(matches!(
            backend.end_frame(),
            Err(RenderError::InvalidState { .. })
        ));
    }

    #[test]
    fn context_loss_skips_frames() {
        let (mut backend, gl) = initialized();
        gl.set_context_lost(true);
        assert!(!backend.begin_frame(&FrameDataUniforms::default()));
        gl.set_context_lost(false);
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
    }

    #[test]
    fn shutdown_releases_every_object() {
        let (mut backend, gl) = initialized();
        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        backend.execute(&quad_command(RenderId(1))).unwrap();
        backend.end_frame().unwrap();

        backend.shutdown();
        assert_eq!(gl.live_objects(), 0);
        backend.shutdown();
    }

    #[test]
    fn init_failure_releases_everything() {
        let gl = HeadlessGl::new();
        gl.fail_framebuffer("point_shadow_2");
        let mut backend = GlBackend::new(Box::new(gl.clone()));

        assert!(matches!(
            backend.init(surface(64, 64), &RenderData::default()),
            Err(RenderError::InitializationFailed(_))
        ));
        assert_eq!(gl.live_objects(), 0);
        assert!(!backend.begin_frame(&FrameDataUniforms::default()));

        backend.shutdown();
        assert_eq!(gl.live_objects(), 0);
    }

    fn spirv_stage(stage: ShaderStage, magic: u32) -> BinaryStage {
        let mut blob = magic.to_le_bytes().to_vec();
        blob.resize(32, 0);
        BinaryStage {
            stage,
            blob: blob.into(),
            entry_point: "main".into(),
            specializations: vec![SpecializationConstant { index: 0, value: 4 }],
        }
    }

    #[test]
    fn binary_program_override_builds() {
        let gl = HeadlessGl::new();
        let mut backend = GlBackend::new(Box::new(gl.clone()));
        let mut render_data = RenderData::default();
        render_data.shader_overrides.insert(
            ShaderProgramKind::PostProcess,
            ShaderSource::Binary(vec![
                spirv_stage(ShaderStage::Vertex, 0x0723_0203),
                spirv_stage(ShaderStage::Fragment, 0x0723_0203),
            ]),
        );
        backend.init(surface(64, 64), &render_data).unwrap();

        assert!(backend.shader_errors().is_empty());
        assert!(backend.has_program(ShaderProgramKind::PostProcess));
        assert_eq!(gl.program_count(), MAX_SHADER_PROGRAMS);

        assert!(backend.begin_frame(&FrameDataUniforms::default()));
        backend.end_frame().unwrap();
        assert!(gl
            .take_draws()
            .iter()
            .any(|d| d.program.as_deref() == Some("post_process")));
    }

    #[test]
    fn malformed_binary_is_reported_and_others_build() {
        let gl = HeadlessGl::new();
        let mut backend = GlBackend::new(Box::new(gl.clone()));
        let mut render_data = RenderData::default();
        render_data.shader_overrides.insert(
            ShaderProgramKind::PhongBrdf,
            ShaderSource::Binary(vec![
                spirv_stage(ShaderStage::Vertex, 0x0723_0203),
                spirv_stage(ShaderStage::Fragment, 0xdead_beef),
            ]),
        );
        backend.init(surface(64, 64), &render_data).unwrap();

        assert!(matches!(
            backend.shader_errors(),
            [ShaderError::CompilationFailed {
                program: ShaderProgramKind::PhongBrdf,
                stage: ShaderStage::Fragment,
                ..
            }]
        ));
        assert!(!backend.has_program(ShaderProgramKind::PhongBrdf));
        assert!(backend.has_program(ShaderProgramKind::DirectionalShadow));
        assert!(backend.has_program(ShaderProgramKind::PointShadow));
        assert!(backend.has_program(ShaderProgramKind::PostProcess));
        assert_eq!(gl.program_count(), MAX_SHADER_PROGRAMS - 1);
    }
}
