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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module is the "common language" shared by simulation code, the frame
//! driver in `lumen-sdk` and the concrete backends in `lumen-infra`:
//!
//! - [`RenderId`] handles and the [`HandlePool`] that hands them out.
//! - [`RenderCommand`] and the per-frame [`CommandQueue`].
//! - Texture and mesh descriptors with their size rules.
//! - GPU uniform layouts in [`uniforms`].
//! - The [`RenderBackend`] trait and the backend support matrix.

pub mod backend;
pub mod camera;
pub mod command;
pub mod error;
pub mod handle;
pub mod light;
pub mod mesh;
pub mod queue;
pub mod shader;
pub mod stats;
pub mod texture;
pub mod traits;
pub mod uniforms;

pub use self::backend::{BackendCapabilities, GraphicsBackendType};
pub use self::camera::{Camera, Projection};
pub use self::command::{DrawCommand, DrawFlags, RenderCommand, MAX_DRAW_TEXTURES};
pub use self::error::{RenderError, ResourceError, ShaderError};
pub use self::handle::{HandlePool, RenderId, ResourceKind};
pub use self::light::{DirectionalLight, LightState, PointLight, MAX_POINT_LIGHTS};
pub use self::mesh::{Vertex, VertexAttribute};
pub use self::queue::CommandQueue;
pub use self::shader::{ShaderProgramKind, ShaderSource, ShaderStage, SpecializationConstant};
pub use self::stats::FrameStats;
pub use self::texture::{
    TextureBaseType, TextureDescriptor, TextureFilter, TextureFormat, TextureType, TextureWrap,
};
pub use self::traits::{RenderBackend, RenderData};
pub use self::uniforms::{
    CameraUniforms, FrameDataUniforms, LightsUniforms, TransformUniforms, UniformBinding,
    UniformBlock,
};
