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

use lumen_core::math::Extent2D;
use lumen_core::platform::{Platform, RenderSurface};

/// A [`RenderSurface`] with fixed sizes, for tools and tests that render
/// without a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessSurface {
    /// Logical size.
    pub surface_size: Extent2D,
    /// Framebuffer size.
    pub framebuffer_size: Extent2D,
    /// Reported platform.
    pub platform: Platform,
}

impl HeadlessSurface {
    /// A surface whose framebuffer matches its logical size, on the current platform.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface_size: Extent2D::new(width, height),
            framebuffer_size: Extent2D::new(width, height),
            platform: Platform::current(),
        }
    }

    /// Overrides the reported platform.
    pub fn on_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl RenderSurface for HeadlessSurface {
    fn surface_size(&self) -> Extent2D {
        self.surface_size
    }

    fn framebuffer_size(&self) -> Extent2D {
        self.framebuffer_size
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
