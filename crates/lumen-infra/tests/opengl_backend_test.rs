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

use lumen_core::math::{Extent2D, Vec3};
use lumen_core::platform::{Platform, SurfaceInfo};
use lumen_core::renderer::{
    DirectionalLight, FrameDataUniforms, GraphicsBackendType, LightState, LightsUniforms,
    PointLight, RenderBackend, RenderCommand, RenderData, RenderId, UniformBinding,
};
use lumen_infra::graphics::opengl::HeadlessGl;
use lumen_infra::{create_backend, NativeApi};

fn boot(gl: &HeadlessGl) -> Box<dyn RenderBackend> {
    let mut backend = create_backend(
        GraphicsBackendType::OpenGl,
        Platform::Linux,
        NativeApi::OpenGl(Box::new(gl.clone())),
    )
    .expect("OpenGL is supported on Linux");
    let surface = SurfaceInfo {
        platform: Platform::Linux,
        surface_size: Extent2D::new(320, 240),
        framebuffer_size: Extent2D::new(320, 240),
    };
    backend
        .init(surface, &RenderData::default())
        .expect("headless init succeeds");
    backend
}

#[test]
fn test_lights_reach_the_gpu_buffer_bit_for_bit() {
    let gl = HeadlessGl::new();
    let mut backend = boot(&gl);

    // --- 1. Build the light state on the CPU ---
    let mut lights = LightState::new();
    let direction = Vec3::new(-0.2, -1.0, -0.3);
    let color = Vec3::new(1.0, 0.95, 0.9);
    lights.set_directional(DirectionalLight::new(direction, color, true));
    lights
        .set_point(2, PointLight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE, true))
        .unwrap();
    let uniforms = lights.to_uniforms();

    // --- 2. Upload through the backend ---
    assert!(backend.begin_frame(&FrameDataUniforms::default()));
    backend.update_lights(&uniforms);
    backend.end_frame().unwrap();

    // --- 3. Read the buffer back ---
    let bytes = gl
        .uniform_buffer_contents(UniformBinding::Lights.index())
        .expect("lights buffer is bound");
    let uploaded: LightsUniforms = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(uploaded, uniforms);
    assert_eq!(uploaded.directional.direction, direction.to_array());
    assert_eq!(uploaded.directional.color, color.to_array());
    assert_eq!(uploaded.directional.active, 1);
    assert_eq!(uploaded.active_point_mask, 0b0100);
}

#[test]
fn test_frame_data_is_uploaded_on_begin() {
    let gl = HeadlessGl::new();
    let mut backend = boot(&gl);

    let frame = FrameDataUniforms {
        surface_size: [320.0, 240.0],
        framebuffer_size: [320.0, 240.0],
        frame_index: 7,
        clear_color: [0.0, 0.0, 0.0, 1.0],
        ..Default::default()
    };
    assert!(backend.begin_frame(&frame));
    let bytes = gl
        .uniform_buffer_contents(UniformBinding::FrameData.index())
        .unwrap();
    let uploaded: FrameDataUniforms = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(uploaded.frame_index, 7);
    backend.end_frame().unwrap();
}

#[test]
fn test_retired_handles_are_ignored_twice() {
    let gl = HeadlessGl::new();
    let mut backend = boot(&gl);

    assert!(backend.begin_frame(&FrameDataUniforms::default()));
    for _ in 0..2 {
        backend
            .execute(&RenderCommand::RetireMeshes(vec![RenderId::NULL, RenderId(42)]))
            .unwrap();
        backend
            .execute(&RenderCommand::RetireTextures(vec![RenderId(1)]))
            .unwrap();
    }
    backend.end_frame().unwrap();
    backend.shutdown();
    assert_eq!(gl.live_objects(), 0);
}
