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

//! Light descriptions and the CPU-side lighting state.

use crate::renderer::error::ResourceError;
use crate::renderer::uniforms::{DirectionalLightData, LightsUniforms, PointLightData};
use glam::{Mat4, Vec3};

/// Number of point light slots.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Half extent of the orthographic volume rendered into the directional shadow map.
const DIRECTIONAL_SHADOW_EXTENT: f32 = 20.0;
/// Distance from the origin the directional shadow camera is placed at.
const DIRECTIONAL_SHADOW_DISTANCE: f32 = 50.0;
/// Far plane of point light cube shadow maps.
pub const POINT_SHADOW_FAR_PLANE: f32 = 25.0;

/// A light infinitely far away, like the sun.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionalLight {
    /// The direction the light travels in. Stored as given.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Whether the light contributes.
    pub active: bool,
}

impl DirectionalLight {
    /// Creates a directional light.
    pub fn new(direction: Vec3, color: Vec3, active: bool) -> Self {
        Self {
            direction,
            color,
            active,
        }
    }

    /// World-to-light-clip matrix of the shadow pass.
    ///
    /// Returns the identity for a zero direction.
    pub fn light_space_matrix(&self) -> Mat4 {
        let Some(dir) = self.direction.try_normalize() else {
            return Mat4::IDENTITY;
        };
        let up = if dir.abs_diff_eq(Vec3::Y, 1e-3) || dir.abs_diff_eq(Vec3::NEG_Y, 1e-3) {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let eye = -dir * DIRECTIONAL_SHADOW_DISTANCE;
        let view = Mat4::look_to_rh(eye, dir, up);
        let e = DIRECTIONAL_SHADOW_EXTENT;
        let projection =
            Mat4::orthographic_rh_gl(-e, e, -e, e, 0.1, 2.0 * DIRECTIONAL_SHADOW_DISTANCE);
        projection * view
    }
}

/// A light radiating from a point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointLight {
    /// World position.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Whether the light contributes.
    pub active: bool,
}

impl PointLight {
    /// Creates a point light.
    pub fn new(position: Vec3, color: Vec3, active: bool) -> Self {
        Self {
            position,
            color,
            active,
        }
    }
}

/// The scene lighting: one directional light and [`MAX_POINT_LIGHTS`] point slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightState {
    directional: DirectionalLight,
    points: [PointLight; MAX_POINT_LIGHTS],
}

impl LightState {
    /// Creates a state with every light inactive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the directional light.
    pub fn set_directional(&mut self, light: DirectionalLight) {
        self.directional = light;
    }

    /// Replaces point light slot `index`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidLightIndex`] if `index >= MAX_POINT_LIGHTS`.
    /// No slot is modified in that case.
    pub fn set_point(&mut self, index: u8, light: PointLight) -> Result<(), ResourceError> {
        let slot = self
            .points
            .get_mut(index as usize)
            .ok_or(ResourceError::InvalidLightIndex(index))?;
        *slot = light;
        Ok(())
    }

    /// The directional light.
    pub fn directional(&self) -> &DirectionalLight {
        &self.directional
    }

    /// Point light slot `index`, if in range.
    pub fn point(&self, index: usize) -> Option<&PointLight> {
        self.points.get(index)
    }

    /// Bit `i` is set when point light `i` is active.
    pub fn active_point_mask(&self) -> u8 {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, light)| light.active)
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Packs the state into the GPU layout.
    pub fn to_uniforms(&self) -> LightsUniforms {
        let d = &self.directional;
        let mut uniforms = LightsUniforms {
            directional: DirectionalLightData {
                direction: d.direction.to_array(),
                active: d.active as u32,
                color: d.color.to_array(),
                _padding: 0.0,
                light_space: d.light_space_matrix().to_cols_array_2d(),
            },
            active_point_mask: self.active_point_mask() as u32,
            ..Default::default()
        };
        for (data, light) in uniforms.point_lights.iter_mut().zip(&self.points) {
            *data = PointLightData {
                position: light.position.to_array(),
                active: light.active as u32,
                color: light.color.to_array(),
                far_plane: POINT_SHADOW_FAR_PLANE,
            };
        }
        uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_round_trips_exactly() {
        let mut state = LightState::new();
        let direction = Vec3::new(0.3, -1.0, 0.7);
        let color = Vec3::new(1.0, 0.9, 0.8);
        state.set_directional(DirectionalLight::new(direction, color, true));

        let uniforms = state.to_uniforms();
        assert_eq!(uniforms.directional.direction, direction.to_array());
        assert_eq!(uniforms.directional.color, color.to_array());
        assert_eq!(uniforms.directional.active, 1);
    }

    #[test]
    fn out_of_range_point_light_is_rejected() {
        let mut state = LightState::new();
        let light = PointLight::new(Vec3::ONE, Vec3::ONE, true);
        state.set_point(3, light).unwrap();

        let before = state.clone();
        assert_eq!(
            state.set_point(4, light),
            Err(ResourceError::InvalidLightIndex(4))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn mask_tracks_active_slots() {
        let mut state = LightState::new();
        state
            .set_point(0, PointLight::new(Vec3::ZERO, Vec3::ONE, true))
            .unwrap();
        state
            .set_point(2, PointLight::new(Vec3::ZERO, Vec3::ONE, true))
            .unwrap();
        assert_eq!(state.active_point_mask(), 0b0101);

        state
            .set_point(0, PointLight::new(Vec3::ZERO, Vec3::ONE, false))
            .unwrap();
        assert_eq!(state.active_point_mask(), 0b0100);
        assert_eq!(state.to_uniforms().active_point_mask, 0b0100);
        assert_eq!(state.to_uniforms().point_lights[2].active, 1);
    }

    #[test]
    fn light_space_handles_degenerate_directions() {
        let zero = DirectionalLight::new(Vec3::ZERO, Vec3::ONE, true);
        assert_eq!(zero.light_space_matrix(), Mat4::IDENTITY);

        let straight_down = DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE, true);
        assert!(straight_down.light_space_matrix().is_finite());
    }
}
