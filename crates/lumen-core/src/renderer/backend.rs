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

//! Backend identifiers and the static platform support matrix.

use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a graphics backend a renderer can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicsBackendType {
    /// OpenGL 4.x core profile. The reference backend.
    #[default]
    #[serde(rename = "opengl")]
    OpenGl,
    /// Vulkan.
    Vulkan,
    /// Direct3D 11.
    Dx11,
    /// Direct3D 12.
    Dx12,
    /// Apple Metal.
    Metal,
    /// WebGL 2.
    #[serde(rename = "webgl")]
    WebGl,
}

const WINDOWS: u8 = 1 << 0;
const MACOS: u8 = 1 << 1;
const IOS: u8 = 1 << 2;
const LINUX: u8 = 1 << 3;
const ANDROID: u8 = 1 << 4;
const WEB: u8 = 1 << 5;

const fn platform_bit(platform: Platform) -> u8 {
    match platform {
        Platform::Windows => WINDOWS,
        Platform::MacOs => MACOS,
        Platform::Ios => IOS,
        Platform::Linux => LINUX,
        Platform::Android => ANDROID,
        Platform::Web => WEB,
    }
}

impl GraphicsBackendType {
    /// Every backend.
    pub const ALL: [GraphicsBackendType; 6] = [
        GraphicsBackendType::OpenGl,
        GraphicsBackendType::Vulkan,
        GraphicsBackendType::Dx11,
        GraphicsBackendType::Dx12,
        GraphicsBackendType::Metal,
        GraphicsBackendType::WebGl,
    ];

    const fn supported_platforms(self) -> u8 {
        match self {
            GraphicsBackendType::OpenGl => WINDOWS | MACOS | IOS | LINUX | ANDROID,
            GraphicsBackendType::Vulkan => WINDOWS | LINUX | ANDROID,
            GraphicsBackendType::Dx11 | GraphicsBackendType::Dx12 => WINDOWS,
            GraphicsBackendType::Metal => MACOS | IOS,
            GraphicsBackendType::WebGl => WEB,
        }
    }

    /// Returns `true` if this backend can run on `platform`.
    pub const fn is_supported_on(self, platform: Platform) -> bool {
        self.supported_platforms() & platform_bit(platform) != 0
    }

    /// The backends usable on `platform`, in declaration order.
    pub fn supported_on(platform: Platform) -> impl Iterator<Item = GraphicsBackendType> {
        Self::ALL
            .into_iter()
            .filter(move |backend| backend.is_supported_on(platform))
    }
}

impl fmt::Display for GraphicsBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GraphicsBackendType::OpenGl => "OpenGL",
            GraphicsBackendType::Vulkan => "Vulkan",
            GraphicsBackendType::Dx11 => "DirectX 11",
            GraphicsBackendType::Dx12 => "DirectX 12",
            GraphicsBackendType::Metal => "Metal",
            GraphicsBackendType::WebGl => "WebGL",
        };
        f.write_str(name)
    }
}

/// Capacities of a backend's resource tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendCapabilities {
    /// Texture table size.
    pub max_textures: usize,
    /// Vertex array (mesh) table size.
    pub max_meshes: usize,
    /// Shader program table size.
    pub max_shader_programs: usize,
    /// Uniform buffer table size.
    pub max_uniform_buffers: usize,
    /// Framebuffer table size.
    pub max_framebuffers: usize,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self {
            max_textures: 255,
            max_meshes: 255,
            max_shader_programs: 4,
            max_uniform_buffers: 4,
            max_framebuffers: 6,
        }
    }
}
