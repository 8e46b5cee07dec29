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

//! Renderer configuration, loaded from JSON.

use crate::renderer::backend::GraphicsBackendType;
use crate::renderer::camera::Projection;
use crate::renderer::error::RenderError;
use crate::renderer::shader::{ShaderProgramKind, ShaderSource};
use crate::renderer::traits::RenderData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Configuration of a renderer instance.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// The graphics backend to create.
    pub backend: GraphicsBackendType,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip distance.
    pub near_plane: f32,
    /// Far clip distance.
    pub far_plane: f32,
    /// Edge length of every shadow map, in texels.
    pub shadow_map_size: u32,
    /// Clear color of the main pass.
    pub clear_color: [f32; 4],
    /// Initial capacity of the command queue.
    pub command_queue_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: GraphicsBackendType::OpenGl,
            fov_y_degrees: 60.0,
            near_plane: 0.1,
            far_plane: 100.0,
            shadow_map_size: 1024,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            command_queue_capacity: 256,
        }
    }
}

impl RendererConfig {
    /// Load the configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        log::info!("Loaded renderer configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save the configuration to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Checks that the values describe a usable renderer.
    ///
    /// # Errors
    ///
    /// [`RenderError::Config`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.near_plane > 0.0) {
            return Err(RenderError::Config(format!(
                "near_plane must be positive, got {}",
                self.near_plane
            )));
        }
        if !(self.far_plane > self.near_plane) {
            return Err(RenderError::Config(format!(
                "far_plane ({}) must be greater than near_plane ({})",
                self.far_plane, self.near_plane
            )));
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(RenderError::Config(format!(
                "fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            )));
        }
        if !self.shadow_map_size.is_power_of_two() {
            return Err(RenderError::Config(format!(
                "shadow_map_size must be a non-zero power of two, got {}",
                self.shadow_map_size
            )));
        }
        Ok(())
    }

    /// The camera projection described by this configuration.
    pub fn projection(&self) -> Projection {
        Projection::from_degrees(self.fov_y_degrees, self.near_plane, self.far_plane)
    }

    /// The initialization data handed to a backend.
    pub fn render_data(&self) -> RenderData {
        self.render_data_with_shaders(HashMap::new())
    }

    /// The initialization data handed to a backend, with replacement shader sources.
    pub fn render_data_with_shaders(
        &self,
        shader_overrides: HashMap<ShaderProgramKind, ShaderSource>,
    ) -> RenderData {
        RenderData {
            shadow_map_size: self.shadow_map_size,
            clear_color: self.clear_color,
            shader_overrides,
        }
    }
}
