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

//! Creates the backend selected in the renderer configuration.

#[cfg(feature = "opengl")]
use super::opengl::{GlApi, GlBackend};
use lumen_core::platform::Platform;
use lumen_core::renderer::{GraphicsBackendType, RenderBackend, RenderError};

/// Native entry points handed over by the platform layer.
#[derive(Debug)]
#[non_exhaustive]
pub enum NativeApi {
    /// A loaded OpenGL context.
    #[cfg(feature = "opengl")]
    OpenGl(Box<dyn GlApi>),
}

/// Builds the backend for `backend` on `platform`.
///
/// The support matrix is checked before anything is created.
///
/// # Errors
///
/// - [`RenderError::UnsupportedBackend`] if `backend` cannot run on `platform`.
/// - [`RenderError::BackendNotImplemented`] for supported backends with no
///   implementation.
/// - [`RenderError::InitializationFailed`] if `api` does not match `backend`.
pub fn create_backend(
    backend: GraphicsBackendType,
    platform: Platform,
    api: NativeApi,
) -> Result<Box<dyn RenderBackend>, RenderError> {
    if !backend.is_supported_on(platform) {
        log::error!("Backend {backend} is not supported on {platform}.");
        return Err(RenderError::UnsupportedBackend { backend, platform });
    }

    match (backend, api) {
        #[cfg(feature = "opengl")]
        (GraphicsBackendType::OpenGl, NativeApi::OpenGl(gl)) => {
            log::info!("Creating {backend} backend on {platform}.");
            Ok(Box::new(GlBackend::new(gl)))
        }
        #[allow(unreachable_patterns)]
        (GraphicsBackendType::OpenGl, _) => Err(RenderError::InitializationFailed(
            "The OpenGL backend requires an OpenGL context.".to_string(),
        )),
        (other, _) => Err(RenderError::BackendNotImplemented(other)),
    }
}

/// Bytes of core state of `backend`, or `None` if it has no implementation.
pub fn query_size(backend: GraphicsBackendType) -> Option<usize> {
    match backend {
        #[cfg(feature = "opengl")]
        GraphicsBackendType::OpenGl => Some(std::mem::size_of::<GlBackend>()),
        _ => None,
    }
}
