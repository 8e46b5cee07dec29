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

use crate::math::Extent2D;
use std::fmt;

/// The operating environment a backend runs on.
///
/// Used by the backend support matrix to reject, for example, Metal on Linux
/// before any backend state is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Apple iOS.
    Ios,
    /// Linux and other Unix-like desktops.
    Linux,
    /// Android.
    Android,
    /// A web browser (wasm32).
    Web,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Linux
        }
    }

    /// Returns `true` for Apple platforms.
    pub const fn is_apple(self) -> bool {
        matches!(self, Platform::MacOs | Platform::Ios)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Ios => "iOS",
            Platform::Linux => "Linux",
            Platform::Android => "Android",
            Platform::Web => "Web",
        };
        f.write_str(name)
    }
}

/// A trait that abstracts the drawable area provided by the windowing layer.
///
/// Any windowing backend (winit, SDL2, GLFW, a test harness...) can implement
/// this trait to host the renderer.
pub trait RenderSurface {
    /// The logical size of the surface in pixels.
    fn surface_size(&self) -> Extent2D;

    /// The size of the default framebuffer in pixels.
    ///
    /// Differs from [`RenderSurface::surface_size`] on high-DPI displays.
    fn framebuffer_size(&self) -> Extent2D;

    /// The platform the surface lives on.
    fn platform(&self) -> Platform {
        Platform::current()
    }
}

/// A snapshot of a [`RenderSurface`], handed to backends at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    /// Platform of the surface.
    pub platform: Platform,
    /// Logical surface size.
    pub surface_size: Extent2D,
    /// Default framebuffer size.
    pub framebuffer_size: Extent2D,
}

impl SurfaceInfo {
    /// Captures the current state of a surface.
    pub fn from_surface(surface: &dyn RenderSurface) -> Self {
        Self {
            platform: surface.platform(),
            surface_size: surface.surface_size(),
            framebuffer_size: surface.framebuffer_size(),
        }
    }
}
