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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! - [`ShaderError`]: a program failed to compile or link. Recoverable per program.
//! - [`ResourceError`]: a resource operation was rejected (table full, bad input).
//! - [`RenderError`]: a subsystem-level failure (initialization, lifecycle misuse).

use crate::platform::Platform;
use crate::renderer::backend::GraphicsBackendType;
use crate::renderer::handle::ResourceKind;
use crate::renderer::shader::{ShaderProgramKind, ShaderStage};
use thiserror::Error;

/// An error related to the compilation or linking of a shader program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    /// One stage of the program failed to compile.
    #[error("Shader compilation failed for '{program}' ({stage} stage): {details}")]
    CompilationFailed {
        /// The program being built.
        program: ShaderProgramKind,
        /// The failing stage.
        stage: ShaderStage,
        /// Compiler log.
        details: String,
    },
    /// All stages compiled but the program failed to link.
    #[error("Shader link failed for '{program}': {details}")]
    LinkFailed {
        /// The program being built.
        program: ShaderProgramKind,
        /// Linker log.
        details: String,
    },
}

/// An error related to the creation or use of a GPU resource.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// Every slot of a fixed-capacity table is in use.
    ///
    /// Recoverable: retire resources and try again.
    #[error("No free {kind} slot (capacity {capacity}).")]
    TableFull {
        /// The table that is exhausted.
        kind: ResourceKind,
        /// Its capacity.
        capacity: usize,
    },
    /// A pixel buffer does not match the size implied by its texture descriptor.
    #[error("Texture buffer holds {actual} bytes, descriptor requires {expected}.")]
    BufferSizeMismatch {
        /// Bytes required by the descriptor.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// The texture type is declared but not supported (1D textures).
    #[error("Unsupported texture type.")]
    UnsupportedTextureType,
    /// A texture dimension that participates in its size is zero, or the
    /// texture is too large to address.
    #[error("Texture dimensions must be non-zero and addressable.")]
    InvalidDimensions,
    /// Mesh data is unusable.
    #[error("Invalid mesh data: {0}")]
    InvalidMesh(&'static str),
    /// The handle does not refer to a live resource.
    #[error("Invalid resource handle or ID.")]
    InvalidHandle,
    /// A point light index outside of `0..MAX_POINT_LIGHTS`.
    #[error("Point light index {0} is out of range.")]
    InvalidLightIndex(u8),
    /// A shader program failed to build.
    #[error("Shader resource error: {0}")]
    Shader(#[from] ShaderError),
    /// An error reported by the native graphics API.
    #[error("Backend-specific resource error: {0}")]
    Backend(String),
}

/// A high-level error raised by the rendering subsystem or a backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// An operation was attempted before the subsystem was initialized.
    #[error("The rendering subsystem is not initialized.")]
    NotInitialized,
    /// The backend cannot run on this platform (e.g. Metal on Linux).
    #[error("Backend {backend} is not supported on {platform}.")]
    UnsupportedBackend {
        /// The requested backend.
        backend: GraphicsBackendType,
        /// The platform it was requested on.
        platform: Platform,
    },
    /// The backend is valid for the platform but has no implementation.
    #[error("Backend {0} is declared but not implemented.")]
    BackendNotImplemented(GraphicsBackendType),
    /// A failure occurred while initializing the backend.
    #[error("Failed to initialize graphics backend: {0}")]
    InitializationFailed(String),
    /// An operation is not valid in the current lifecycle state.
    #[error("Cannot {operation} while the renderer is {state}.")]
    InvalidState {
        /// What was attempted.
        operation: &'static str,
        /// The state the renderer was in.
        state: &'static str,
    },
    /// A resource operation failed.
    #[error("Graphics resource operation failed: {0}")]
    Resource(#[from] ResourceError),
    /// The renderer configuration is invalid or could not be read.
    #[error("Invalid renderer configuration: {0}")]
    Config(String),
}
