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

use std::borrow::Cow;
use std::fmt;

/// A programmable stage of the graphics pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The geometry shader stage (used for layered cube shadow maps).
    Geometry,
    /// The fragment shader stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// The fixed set of programs a backend builds at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderProgramKind {
    /// Full-screen pass that resolves the offscreen target to the surface.
    PostProcess = 0,
    /// Depth-only pass into the directional shadow map.
    DirectionalShadow = 1,
    /// Layered depth pass into a point light's cube shadow map.
    PointShadow = 2,
    /// Main lit pass.
    PhongBrdf = 3,
}

impl ShaderProgramKind {
    /// Every program, in table order.
    pub const ALL: [ShaderProgramKind; 4] = [
        ShaderProgramKind::PostProcess,
        ShaderProgramKind::DirectionalShadow,
        ShaderProgramKind::PointShadow,
        ShaderProgramKind::PhongBrdf,
    ];

    /// Slot of this program in the backend's program table.
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// A stable, lowercase name for logs.
    pub const fn label(self) -> &'static str {
        match self {
            ShaderProgramKind::PostProcess => "post_process",
            ShaderProgramKind::DirectionalShadow => "directional_shadow",
            ShaderProgramKind::PointShadow => "point_shadow",
            ShaderProgramKind::PhongBrdf => "phong_brdf",
        }
    }
}

impl fmt::Display for ShaderProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A specialization constant applied to a pre-compiled shader binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecializationConstant {
    /// Constant id (`layout(constant_id = N)`).
    pub index: u32,
    /// Raw 32-bit value.
    pub value: u32,
}

/// One pre-compiled stage of a binary program.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryStage {
    /// The stage this blob implements.
    pub stage: ShaderStage,
    /// The compiled module (e.g. SPIR-V words as bytes).
    pub blob: Cow<'static, [u8]>,
    /// Entry point name inside the module.
    pub entry_point: Cow<'static, str>,
    /// Specialization constants applied when the stage is loaded.
    pub specializations: Vec<SpecializationConstant>,
}

/// Represents the source data of a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    /// GLSL source text compiled by the driver.
    Glsl {
        /// Vertex stage source.
        vertex: Cow<'static, str>,
        /// Optional geometry stage source.
        geometry: Option<Cow<'static, str>>,
        /// Fragment stage source.
        fragment: Cow<'static, str>,
    },
    /// Pre-compiled binaries, one per stage.
    Binary(Vec<BinaryStage>),
}

impl ShaderSource {
    /// GLSL vertex + fragment program.
    pub fn glsl(vertex: impl Into<Cow<'static, str>>, fragment: impl Into<Cow<'static, str>>) -> Self {
        ShaderSource::Glsl {
            vertex: vertex.into(),
            geometry: None,
            fragment: fragment.into(),
        }
    }

    /// The stages this source provides, in pipeline order.
    pub fn stages(&self) -> Vec<ShaderStage> {
        match self {
            ShaderSource::Glsl { geometry, .. } => {
                let mut stages = vec![ShaderStage::Vertex];
                if geometry.is_some() {
                    stages.push(ShaderStage::Geometry);
                }
                stages.push(ShaderStage::Fragment);
                stages
            }
            ShaderSource::Binary(stages) => stages.iter().map(|s| s.stage).collect(),
        }
    }
}
