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

//! The frame driver and the simulation-facing rendering API.

use crate::frame::FrameState;
use lumen_core::math::{Extent2D, Mat4, Vec3, Vec4};
use lumen_core::platform::{RenderSurface, SurfaceInfo};
use lumen_core::renderer::mesh::validate_mesh;
use lumen_core::renderer::{
    Camera, CommandQueue, DirectionalLight, DrawCommand, DrawFlags, FrameDataUniforms,
    FrameStats, GraphicsBackendType, HandlePool, LightState, LightsUniforms, PointLight,
    Projection, RenderBackend, RenderCommand, RenderError, RenderId, ResourceError, ResourceKind,
    ShaderProgramKind, ShaderSource, TextureDescriptor, Vertex, MAX_DRAW_TEXTURES,
    MAX_POINT_LIGHTS,
};
use lumen_core::RendererConfig;
use lumen_infra::{create_backend, NativeApi};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// The renderer as seen by the engine loop and simulation code.
///
/// Simulation code records work (camera, draws, resource creation and
/// retirement, lights) at any time between frames. Nothing reaches the backend
/// until [`RendererSubsystem::render_frame`], which executes the recorded
/// commands in push order.
///
/// Resource handles are reserved when a generate call is recorded, so later
/// commands of the same frame can reference them. A retired handle number is
/// only handed out again after its retire command has executed.
#[derive(Debug)]
pub struct RendererSubsystem {
    config: RendererConfig,
    shader_overrides: HashMap<ShaderProgramKind, ShaderSource>,
    projection: Projection,
    state: FrameState,
    backend: Option<Box<dyn RenderBackend>>,
    queue: CommandQueue,
    meshes: HandlePool,
    textures: HandlePool,
    lights: LightState,
    camera: Option<Camera>,
    surface_size: Extent2D,
    framebuffer_size: Extent2D,
    pending_resize: Option<(Extent2D, Extent2D)>,
    started: Instant,
    last_frame: Option<Instant>,
    frame_number: u64,
    last_stats: FrameStats,
}

impl RendererSubsystem {
    /// Creates an uninitialized renderer.
    ///
    /// # Errors
    ///
    /// [`RenderError::Config`] if `config` fails validation.
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let capabilities = lumen_core::renderer::BackendCapabilities::default();
        Ok(Self {
            projection: config.projection(),
            queue: CommandQueue::with_capacity(config.command_queue_capacity),
            config,
            shader_overrides: HashMap::new(),
            state: FrameState::Uninitialized,
            backend: None,
            meshes: HandlePool::new(ResourceKind::Mesh, capabilities.max_meshes),
            textures: HandlePool::new(ResourceKind::Texture, capabilities.max_textures),
            lights: LightState::new(),
            camera: None,
            surface_size: Extent2D::default(),
            framebuffer_size: Extent2D::default(),
            pending_resize: None,
            started: Instant::now(),
            last_frame: None,
            frame_number: 0,
            last_stats: FrameStats::default(),
        })
    }

    /// Replaces the sources of built-in programs when the backend is initialized.
    ///
    /// Programs without an entry keep their built-in source.
    pub fn with_shader_overrides(
        mut self,
        overrides: HashMap<ShaderProgramKind, ShaderSource>,
    ) -> Self {
        self.shader_overrides = overrides;
        self
    }

    /// Creates the configured backend on top of `api` and initializes it.
    ///
    /// # Errors
    ///
    /// - [`RenderError::UnsupportedBackend`] if the configured backend cannot
    ///   run on the surface's platform. No state is built.
    /// - [`RenderError::BackendNotImplemented`] for declared-only backends.
    /// - Any error of the backend's initialization.
    pub fn subsystem_init(
        &mut self,
        surface: &dyn RenderSurface,
        api: NativeApi,
    ) -> Result<(), RenderError> {
        self.expect_state(FrameState::Uninitialized, "initialize")?;
        let backend = create_backend(self.config.backend, surface.platform(), api)?;
        self.init_with_backend(surface, backend)
    }

    /// Initializes the renderer with an already created backend.
    pub fn init_with_backend(
        &mut self,
        surface: &dyn RenderSurface,
        mut backend: Box<dyn RenderBackend>,
    ) -> Result<(), RenderError> {
        self.expect_state(FrameState::Uninitialized, "initialize")?;
        let info = SurfaceInfo::from_surface(surface);
        log::info!(
            "RendererSubsystem: Initializing {} backend ({} bytes of core state)...",
            backend.backend_type(),
            backend.query_size()
        );
        let render_data = self
            .config
            .render_data_with_shaders(self.shader_overrides.clone());
        backend.init(info, &render_data)?;

        let capabilities = backend.capabilities();
        self.meshes = HandlePool::new(ResourceKind::Mesh, capabilities.max_meshes);
        self.textures = HandlePool::new(ResourceKind::Texture, capabilities.max_textures);
        self.surface_size = info.surface_size;
        self.framebuffer_size = info.framebuffer_size;
        backend.update_lights(&self.lights.to_uniforms());
        self.backend = Some(backend);
        self.transition(FrameState::Ready)?;

        log::info!(
            "RendererSubsystem: Ready ({} surface, {} framebuffer).",
            self.surface_size,
            self.framebuffer_size
        );
        Ok(())
    }

    fn transition(&mut self, next: FrameState) -> Result<(), RenderError> {
        if !self.state.can_transition_to(next) {
            return Err(RenderError::InvalidState {
                operation: "change renderer state",
                state: self.state.name(),
            });
        }
        log::trace!("RendererSubsystem: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn expect_state(&self, expected: FrameState, operation: &'static str) -> Result<(), RenderError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn ensure_recording(&self, operation: &'static str) -> Result<(), RenderError> {
        match self.state {
            FrameState::Uninitialized => Err(RenderError::NotInitialized),
            state if state.accepts_commands() => Ok(()),
            state => Err(RenderError::InvalidState {
                operation,
                state: state.name(),
            }),
        }
    }

    // --- Simulation API ---

    /// Records the camera used by the next frames.
    ///
    /// The camera is read once, now. Its view and projection are computed at
    /// the start of each frame, after any pending resize, so the aspect ratio
    /// always matches the framebuffer being rendered.
    pub fn set_camera(&mut self, camera: &Camera) -> Result<(), RenderError> {
        self.ensure_recording("set the camera")?;
        self.camera = Some(*camera);
        Ok(())
    }

    /// Records a mesh draw.
    ///
    /// `textures` slots holding [`RenderId::NULL`] are left unbound.
    pub fn draw(
        &mut self,
        transform: Mat4,
        mesh: RenderId,
        textures: [RenderId; MAX_DRAW_TEXTURES],
        tint: Vec4,
        flags: DrawFlags,
    ) -> Result<(), RenderError> {
        self.ensure_recording("record a draw")?;
        debug_assert!(self.meshes.is_live(mesh), "draw of non-live mesh {mesh}");
        debug_assert!(
            textures.iter().all(|t| t.is_null() || self.textures.is_live(*t)),
            "draw with non-live texture in {textures:?}"
        );
        self.queue.push(RenderCommand::Draw3D(DrawCommand {
            transform,
            tint,
            flags,
            textures,
            mesh,
        }));
        Ok(())
    }

    /// Reserves a mesh handle and records the upload of its data.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::InvalidMesh`] for unusable data.
    /// - [`ResourceError::TableFull`] when every mesh handle is live.
    ///
    /// Nothing is recorded on error.
    pub fn generate_mesh(
        &mut self,
        vertices: impl Into<Arc<[Vertex]>>,
        indices: impl Into<Arc<[u32]>>,
    ) -> Result<RenderId, RenderError> {
        self.ensure_recording("generate a mesh")?;
        let vertices = vertices.into();
        let indices = indices.into();
        if let Err(e) = validate_mesh(&vertices, &indices) {
            log::error!("generate_mesh rejected: {e}");
            return Err(e.into());
        }
        let id = self.meshes.allocate().inspect_err(|e| log::warn!("{e}"))?;
        self.queue.push(RenderCommand::GenerateMesh {
            id,
            vertices,
            indices,
        });
        Ok(id)
    }

    /// Records the destruction of meshes.
    ///
    /// Null handles and handles that are not live are ignored.
    pub fn retire_meshes(&mut self, ids: &[RenderId]) -> Result<(), RenderError> {
        self.ensure_recording("retire meshes")?;
        let live = live_subset(&self.meshes, ids);
        if !live.is_empty() {
            self.queue.push(RenderCommand::RetireMeshes(live));
        }
        Ok(())
    }

    /// Reserves a texture handle and records the upload of its texels.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::BufferSizeMismatch`] if `pixels` does not have the
    ///   exact size `descriptor` implies.
    /// - [`ResourceError::UnsupportedTextureType`] for 1D textures.
    /// - [`ResourceError::TableFull`] when every texture handle is live.
    ///
    /// Nothing is recorded on error.
    pub fn generate_texture(
        &mut self,
        descriptor: TextureDescriptor,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<RenderId, RenderError> {
        self.ensure_recording("generate a texture")?;
        let pixels = pixels.into();
        if let Err(e) = descriptor.validate_buffer(pixels.len()) {
            log::error!("generate_texture rejected: {e}");
            return Err(e.into());
        }
        let id = self.textures.allocate().inspect_err(|e| log::warn!("{e}"))?;
        self.queue.push(RenderCommand::GenerateTexture {
            id,
            descriptor,
            pixels,
        });
        Ok(id)
    }

    /// Records the destruction of textures.
    ///
    /// Null handles and handles that are not live are ignored.
    pub fn retire_textures(&mut self, ids: &[RenderId]) -> Result<(), RenderError> {
        self.ensure_recording("retire textures")?;
        let live = live_subset(&self.textures, ids);
        if !live.is_empty() {
            self.queue.push(RenderCommand::RetireTextures(live));
        }
        Ok(())
    }

    /// Records a directional light update.
    pub fn set_directional_light(
        &mut self,
        direction: Vec3,
        color: Vec3,
        active: bool,
    ) -> Result<(), RenderError> {
        self.ensure_recording("set the directional light")?;
        self.queue.push(RenderCommand::DirectionalLight(DirectionalLight::new(
            direction, color, active,
        )));
        Ok(())
    }

    /// Records a point light update.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidLightIndex`] if `index >= MAX_POINT_LIGHTS`.
    /// Nothing is recorded in that case.
    pub fn set_point_light(
        &mut self,
        index: u8,
        position: Vec3,
        color: Vec3,
        active: bool,
    ) -> Result<(), RenderError> {
        self.ensure_recording("set a point light")?;
        if index as usize >= MAX_POINT_LIGHTS {
            log::error!("set_point_light rejected: index {index} out of range");
            return Err(ResourceError::InvalidLightIndex(index).into());
        }
        self.queue.push(RenderCommand::PointLight {
            index,
            light: PointLight::new(position, color, active),
        });
        Ok(())
    }

    // --- Frame loop API ---

    /// Records a surface resize, applied at the start of the next frame.
    pub fn on_resize(&mut self, surface_size: Extent2D, framebuffer_size: Extent2D) {
        log::debug!("RendererSubsystem: Resize requested ({surface_size}, framebuffer {framebuffer_size}).");
        self.pending_resize = Some((surface_size, framebuffer_size));
    }

    /// Renders one frame.
    ///
    /// Applies a pending resize, then asks the backend to begin the frame. If
    /// the backend is not ready (context lost, zero-area surface), returns
    /// `Ok(false)` and keeps the recorded commands for the next frame.
    /// Otherwise executes every recorded command in push order, ends the frame
    /// and returns `Ok(true)`.
    ///
    /// A command the backend rejects is skipped with a warning; the frame
    /// continues.
    ///
    /// # Errors
    ///
    /// - [`RenderError::NotInitialized`] before initialization.
    /// - [`RenderError::InvalidState`] after shutdown.
    /// - Errors from the backend's `end_frame`.
    pub fn render_frame(&mut self) -> Result<bool, RenderError> {
        if self.state == FrameState::Uninitialized {
            return Err(RenderError::NotInitialized);
        }
        self.expect_state(FrameState::Ready, "render a frame")?;
        let frame_start = Instant::now();

        if let Some((surface_size, framebuffer_size)) = self.pending_resize.take() {
            self.surface_size = surface_size;
            self.framebuffer_size = framebuffer_size;
            if let Some(backend) = self.backend.as_mut() {
                backend.on_resize(surface_size, framebuffer_size);
            }
        }

        let frame_data = FrameDataUniforms {
            surface_size: self.surface_size.to_f32_array(),
            framebuffer_size: self.framebuffer_size.to_f32_array(),
            time: self.started.elapsed().as_secs_f32(),
            delta_time: self
                .last_frame
                .map_or(0.0, |last| frame_start.duration_since(last).as_secs_f32()),
            frame_index: (self.frame_number + 1) as u32,
            _padding0: 0,
            clear_color: self.config.clear_color,
        };

        self.transition(FrameState::BeginFrame)?;
        let Some(backend) = self.backend.as_mut() else {
            self.state = FrameState::Ready;
            return Err(RenderError::NotInitialized);
        };
        if !backend.begin_frame(&frame_data) {
            log::debug!(
                "RendererSubsystem: Backend not ready, {} commands kept for the next frame.",
                self.queue.len()
            );
            self.state = FrameState::Ready;
            return Ok(false);
        }

        let mut stats = FrameStats {
            frame_number: self.frame_number + 1,
            ..Default::default()
        };

        if let Some(camera) = &self.camera {
            let command = RenderCommand::SetCamera(
                camera.uniforms(&self.projection, self.framebuffer_size.aspect_ratio()),
            );
            match backend.execute(&command) {
                Ok(()) => stats.record(&command),
                Err(e) => {
                    log::warn!("Skipped {} command: {e}", command.name());
                    stats.commands_failed += 1;
                }
            }
        }

        for command in self.queue.flush() {
            match &command {
                RenderCommand::DirectionalLight(light) => {
                    self.lights.set_directional(*light);
                    backend.update_lights(&self.lights.to_uniforms());
                    stats.record(&command);
                    continue;
                }
                RenderCommand::PointLight { index, light } => {
                    match self.lights.set_point(*index, *light) {
                        Ok(()) => {
                            backend.update_lights(&self.lights.to_uniforms());
                            stats.record(&command);
                        }
                        Err(e) => {
                            stats.commands_failed += 1;
                            log::warn!("Skipped {} command: {e}", command.name());
                        }
                    }
                    continue;
                }
                _ => {}
            }

            match backend.execute(&command) {
                Ok(()) => stats.record(&command),
                Err(e) => {
                    stats.commands_failed += 1;
                    log::warn!("Skipped {} command: {e}", command.name());
                    // A failed generate never created anything behind its handle.
                    match &command {
                        RenderCommand::GenerateMesh { id, .. } => {
                            self.meshes.release(*id);
                        }
                        RenderCommand::GenerateTexture { id, .. } => {
                            self.textures.release(*id);
                        }
                        _ => {}
                    }
                }
            }

            match &command {
                RenderCommand::RetireMeshes(ids) => {
                    stats.resources_retired += release_all(&mut self.meshes, ids);
                }
                RenderCommand::RetireTextures(ids) => {
                    stats.resources_retired += release_all(&mut self.textures, ids);
                }
                _ => {}
            }
        }
        self.state = FrameState::CommandsFlushed;

        if let Err(e) = backend.end_frame() {
            log::error!("RendererSubsystem: end_frame failed: {e}");
            self.state = FrameState::Ready;
            return Err(e);
        }
        self.transition(FrameState::EndFrame)?;

        stats.cpu_time_ms = frame_start.elapsed().as_secs_f32() * 1000.0;
        log::debug!(
            "Frame {}: {} commands ({} draws, {} failed) in {:.3} ms",
            stats.frame_number,
            stats.commands_executed,
            stats.draw_calls,
            stats.commands_failed,
            stats.cpu_time_ms
        );
        self.frame_number += 1;
        self.last_frame = Some(frame_start);
        self.last_stats = stats;
        self.transition(FrameState::Ready)?;
        Ok(true)
    }

    /// Releases the backend and every resource. Further calls do nothing.
    ///
    /// Commands still recorded are discarded.
    pub fn shutdown(&mut self) {
        match self.state {
            FrameState::Terminated => return,
            FrameState::Uninitialized => {
                self.state = FrameState::Terminated;
                return;
            }
            _ => {}
        }
        log::info!("RendererSubsystem: Shutting down...");
        self.state = FrameState::ShuttingDown;
        if !self.queue.is_empty() {
            log::debug!("Discarding {} unexecuted commands.", self.queue.len());
            self.queue.flush();
        }
        if let Some(mut backend) = self.backend.take() {
            backend.shutdown();
        }
        self.state = FrameState::Terminated;
        log::info!("RendererSubsystem: Terminated.");
    }

    // --- Queries ---

    /// Current lifecycle state.
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// The configuration the renderer was created with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The lighting state as of the last executed light command, in GPU layout.
    pub fn light_uniforms(&self) -> LightsUniforms {
        self.lights.to_uniforms()
    }

    /// Bit `i` is set when point light `i` is active.
    pub fn point_light_mask(&self) -> u8 {
        self.lights.active_point_mask()
    }

    /// Logical surface size, as of the last frame boundary.
    pub fn surface_size(&self) -> Extent2D {
        self.surface_size
    }

    /// Framebuffer size, as of the last frame boundary.
    pub fn framebuffer_size(&self) -> Extent2D {
        self.framebuffer_size
    }

    /// Counters of the last rendered frame.
    pub fn last_frame_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// The active backend, if initialized.
    pub fn backend_type(&self) -> Option<GraphicsBackendType> {
        self.backend.as_ref().map(|b| b.backend_type())
    }

    /// Number of commands waiting for the next frame.
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for RendererSubsystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn live_subset(pool: &HandlePool, ids: &[RenderId]) -> Vec<RenderId> {
    let mut live: Vec<RenderId> = ids.iter().copied().filter(|id| pool.is_live(*id)).collect();
    live.sort_unstable();
    live.dedup();
    live
}

fn release_all(pool: &mut HandlePool, ids: &[RenderId]) -> u32 {
    ids.iter().filter(|id| pool.release(**id)).count() as u32
}
