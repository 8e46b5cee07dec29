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

use crate::math::Extent2D;
use crate::platform::SurfaceInfo;
use crate::renderer::backend::{BackendCapabilities, GraphicsBackendType};
use crate::renderer::command::RenderCommand;
use crate::renderer::error::{RenderError, ResourceError};
use crate::renderer::shader::{ShaderProgramKind, ShaderSource};
use crate::renderer::uniforms::{FrameDataUniforms, LightsUniforms};
use std::collections::HashMap;

/// Settings a backend needs to build its fixed resources at initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    /// Edge length in texels of every shadow map.
    pub shadow_map_size: u32,
    /// Clear color of the main pass.
    pub clear_color: [f32; 4],
    /// Replacement sources for built-in programs.
    pub shader_overrides: HashMap<ShaderProgramKind, ShaderSource>,
}

impl Default for RenderData {
    fn default() -> Self {
        Self {
            shadow_map_size: 1024,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            shader_overrides: HashMap::new(),
        }
    }
}

/// A concrete graphics API implementation, driven by the frame driver.
///
/// Exactly one backend is active per renderer. It is created once, then
/// called in this order every frame:
///
/// 1. [`RenderBackend::begin_frame`]. If it returns `false`, nothing else is
///    called for this frame.
/// 2. [`RenderBackend::execute`] once per queued command, in push order.
/// 3. [`RenderBackend::end_frame`].
///
/// Backend resource tables are only mutated from these calls.
pub trait RenderBackend: std::fmt::Debug + Send {
    /// The API this backend implements.
    fn backend_type(&self) -> GraphicsBackendType;

    /// Sizes of the backend's resource tables.
    fn capabilities(&self) -> BackendCapabilities;

    /// Bytes used by the backend's core state.
    fn query_size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    /// Builds the fixed resources: shader programs, uniform buffers, framebuffers.
    ///
    /// # Errors
    ///
    /// [`RenderError::InitializationFailed`] if the native API is unusable.
    /// A single shader program failing to build is not an error.
    fn init(&mut self, surface: SurfaceInfo, render_data: &RenderData) -> Result<(), RenderError>;

    /// Applies a new surface size. Called at a frame boundary only.
    fn on_resize(&mut self, surface_size: Extent2D, framebuffer_size: Extent2D);

    /// Prepares a frame. Returns `false` if the backend cannot render now
    /// (context lost, zero-area surface...).
    fn begin_frame(&mut self, frame: &FrameDataUniforms) -> bool;

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// A [`ResourceError`] if the command could not be applied. The frame
    /// continues with the next command.
    fn execute(&mut self, command: &RenderCommand) -> Result<(), ResourceError>;

    /// Uploads the lighting state used by the following passes.
    fn update_lights(&mut self, lights: &LightsUniforms);

    /// Renders the recorded passes and presents.
    fn end_frame(&mut self) -> Result<(), RenderError>;

    /// Releases every native object. The backend is unusable afterwards.
    fn shutdown(&mut self);
}
