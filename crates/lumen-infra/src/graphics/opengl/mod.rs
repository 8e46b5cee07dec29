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

//! The reference OpenGL backend.
//!
//! [`GlBackend`] is written against [`GlApi`], so it runs unchanged on a real
//! context or on [`HeadlessGl`].

mod api;
mod backend;
mod headless;
mod shaders;
mod table;

pub use self::api::{Attachment, BufferTarget, GlApi, GlObject, RenderTargetKind, StageSource};
pub use self::backend::{
    GlBackend, DIRECTIONAL_SHADOW_FRAMEBUFFER, MAX_FRAMEBUFFERS, MAX_SHADER_PROGRAMS,
    MAX_TEXTURES, MAX_UNIFORM_BUFFERS, MAX_VERTEX_ARRAYS, POINT_SHADOW_FRAMEBUFFER,
    POST_PROCESS_FRAMEBUFFER, SHADOW_FRAMEBUFFERS,
};
pub use self::headless::{DrawRecord, HeadlessGl};
pub use self::shaders::builtin_source;
pub use self::table::ResourceTable;
