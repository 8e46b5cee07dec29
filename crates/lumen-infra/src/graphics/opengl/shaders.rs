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

//! Built-in GLSL sources of the four fixed programs.

use lumen_core::renderer::{ShaderProgramKind, ShaderSource};
use std::borrow::Cow;

const LIGHTS_MARKER: &str = "// @lights";
const LIGHTS: &str = include_str!("shaders/lights.glsl");

const POST_PROCESS_VERT: &str = include_str!("shaders/post_process.vert");
const POST_PROCESS_FRAG: &str = include_str!("shaders/post_process.frag");
const DIRECTIONAL_SHADOW_VERT: &str = include_str!("shaders/directional_shadow.vert");
const DIRECTIONAL_SHADOW_FRAG: &str = include_str!("shaders/directional_shadow.frag");
const POINT_SHADOW_VERT: &str = include_str!("shaders/point_shadow.vert");
const POINT_SHADOW_GEOM: &str = include_str!("shaders/point_shadow.geom");
const POINT_SHADOW_FRAG: &str = include_str!("shaders/point_shadow.frag");
const PHONG_BRDF_VERT: &str = include_str!("shaders/phong_brdf.vert");
const PHONG_BRDF_FRAG: &str = include_str!("shaders/phong_brdf.frag");

/// Splices the shared light and transform blocks into a stage.
fn expand(source: &'static str) -> Cow<'static, str> {
    if source.contains(LIGHTS_MARKER) {
        Cow::Owned(source.replace(LIGHTS_MARKER, LIGHTS))
    } else {
        Cow::Borrowed(source)
    }
}

/// The source the backend uses for `kind` when no override is given.
pub fn builtin_source(kind: ShaderProgramKind) -> ShaderSource {
    let (vertex, geometry, fragment) = match kind {
        ShaderProgramKind::PostProcess => (POST_PROCESS_VERT, None, POST_PROCESS_FRAG),
        ShaderProgramKind::DirectionalShadow => {
            (DIRECTIONAL_SHADOW_VERT, None, DIRECTIONAL_SHADOW_FRAG)
        }
        ShaderProgramKind::PointShadow => {
            (POINT_SHADOW_VERT, Some(POINT_SHADOW_GEOM), POINT_SHADOW_FRAG)
        }
        ShaderProgramKind::PhongBrdf => (PHONG_BRDF_VERT, None, PHONG_BRDF_FRAG),
    };
    ShaderSource::Glsl {
        vertex: expand(vertex),
        geometry: geometry.map(expand),
        fragment: expand(fragment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::renderer::ShaderStage;

    #[test]
    fn every_stage_is_versioned_and_expanded() {
        for kind in ShaderProgramKind::ALL {
            let ShaderSource::Glsl {
                vertex,
                geometry,
                fragment,
            } = builtin_source(kind)
            else {
                panic!("{kind} is not GLSL");
            };
            for stage in [Some(vertex), geometry, Some(fragment)].into_iter().flatten() {
                assert!(stage.starts_with("#version 430 core"), "{kind}");
                assert!(!stage.contains(LIGHTS_MARKER), "{kind}");
            }
        }
    }

    #[test]
    fn only_point_shadows_use_a_geometry_stage() {
        for kind in ShaderProgramKind::ALL {
            let has_geometry = builtin_source(kind).stages().contains(&ShaderStage::Geometry);
            assert_eq!(has_geometry, kind == ShaderProgramKind::PointShadow);
        }
    }

    #[test]
    fn sources_name_their_program() {
        for kind in ShaderProgramKind::ALL {
            if let ShaderSource::Glsl { fragment, .. } = builtin_source(kind) {
                assert!(fragment.contains(kind.label()), "{kind}");
            }
        }
    }
}
