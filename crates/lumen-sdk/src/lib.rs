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

//! The public face of the Lumen renderer.
//!
//! Engine code creates a [`RendererSubsystem`], initializes it on a surface and
//! calls [`RendererSubsystem::render_frame`] once per tick. Everything else
//! (camera, draws, resources, lights) is recorded from simulation code in
//! between.

#![warn(missing_docs)]

pub mod frame;
pub mod logging;
mod subsystem;
mod surface;

pub use frame::FrameState;
pub use subsystem::RendererSubsystem;
pub use surface::HeadlessSurface;

pub use lumen_core::renderer::{RenderError, ResourceError};
pub use lumen_core::RendererConfig;
pub use lumen_infra::NativeApi;

/// Types most simulation code needs.
pub mod prelude {
    pub use crate::{FrameState, HeadlessSurface, NativeApi, RendererConfig, RendererSubsystem};
    pub use lumen_core::math::{Extent2D, Mat4, Quat, Vec2, Vec3, Vec4};
    pub use lumen_core::platform::{Platform, RenderSurface};
    pub use lumen_core::renderer::{
        Camera, DrawFlags, GraphicsBackendType, RenderError, RenderId, ResourceError,
        TextureBaseType, TextureDescriptor, TextureFilter, TextureFormat, TextureWrap, Vertex,
    };
}
