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

use lumen_core::renderer::{LightsUniforms, TransformUniforms, UniformBinding};
use lumen_infra::graphics::opengl::HeadlessGl;
use lumen_sdk::prelude::*;

fn boot(width: u32, height: u32) -> (RendererSubsystem, HeadlessGl) {
    let gl = HeadlessGl::new();
    let mut renderer = RendererSubsystem::new(RendererConfig::default()).unwrap();
    let surface = HeadlessSurface::new(width, height).on_platform(Platform::Linux);
    renderer
        .subsystem_init(&surface, NativeApi::OpenGl(Box::new(gl.clone())))
        .expect("OpenGL initializes on a headless Linux surface");
    (renderer, gl)
}

fn rgba_1x1() -> (TextureDescriptor, Vec<u8>) {
    (
        TextureDescriptor::new_2d(1, 1, TextureFormat::Rgba, TextureBaseType::U8),
        vec![255, 128, 0, 255],
    )
}

#[test]
fn test_lights_match_on_cpu_and_gpu() {
    let (mut renderer, gl) = boot(320, 240);
    let direction = Vec3::new(-0.2, -1.0, -0.3);
    let color = Vec3::new(1.0, 0.95, 0.9);
    renderer.set_directional_light(direction, color, true).unwrap();
    renderer
        .set_point_light(1, Vec3::new(0.0, 2.0, 0.0), Vec3::ONE, true)
        .unwrap();
    assert!(renderer.render_frame().unwrap());

    let cpu = renderer.light_uniforms();
    assert_eq!(cpu.directional.direction, direction.to_array());
    assert_eq!(cpu.directional.color, color.to_array());
    assert_eq!(cpu.directional.active, 1);
    assert_eq!(renderer.point_light_mask(), 0b0010);

    let bytes = gl
        .uniform_buffer_contents(UniformBinding::Lights.index())
        .expect("lights buffer is bound");
    let gpu: LightsUniforms = bytemuck::pod_read_unaligned(&bytes);
    assert_eq!(gpu, cpu);
}

#[test]
fn test_quad_is_drawn_in_every_pass() {
    let (mut renderer, gl) = boot(320, 240);
    let (vertices, indices) = Vertex::quad(0.5);
    let mesh = renderer.generate_mesh(vertices, indices).unwrap();
    let (descriptor, pixels) = rgba_1x1();
    let texture = renderer.generate_texture(descriptor, pixels).unwrap();

    renderer
        .set_camera(&Camera::look_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y))
        .unwrap();
    renderer.set_directional_light(Vec3::NEG_Y, Vec3::ONE, true).unwrap();
    renderer
        .draw(
            Mat4::IDENTITY,
            mesh,
            [texture, RenderId::NULL, RenderId::NULL, RenderId::NULL],
            Vec4::ONE,
            DrawFlags::CAST_SHADOWS | DrawFlags::RECEIVE_SHADOWS,
        )
        .unwrap();
    assert!(renderer.render_frame().unwrap());

    let draws = gl.take_draws();
    let in_pass = |program: &str| {
        draws
            .iter()
            .filter(|d| d.program.as_deref() == Some(program))
            .count()
    };
    assert_eq!(in_pass("directional_shadow"), 1);
    assert_eq!(in_pass("phong_brdf"), 1);
    assert_eq!(in_pass("post_process"), 1);

    let main = draws
        .iter()
        .find(|d| d.program.as_deref() == Some("phong_brdf"))
        .unwrap();
    assert_eq!(main.framebuffer.as_deref(), Some("post_process"));
    assert_eq!(main.count, 6);
    assert!(main.textures[0].is_some());
    assert!(main.textures[1].is_none());

    let stats = renderer.last_frame_stats();
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.meshes_generated, 1);
    assert_eq!(stats.textures_generated, 1);
    assert_eq!(stats.commands_failed, 0);
    assert_eq!(gl.presented_frames(), 1);
}

#[test]
fn test_draws_execute_in_push_order() {
    let (mut renderer, gl) = boot(320, 240);
    let (vertices, indices) = Vertex::quad(1.0);
    let mesh = renderer.generate_mesh(vertices, indices).unwrap();
    let tints = [
        Vec4::new(1.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 1.0, 1.0),
        Vec4::new(1.0, 1.0, 0.0, 0.5),
    ];
    for (i, tint) in tints.iter().enumerate() {
        renderer
            .draw(
                Mat4::from_translation(Vec3::new(i as f32, 0.0, 0.0)),
                mesh,
                [RenderId::NULL; 4],
                *tint,
                DrawFlags::empty(),
            )
            .unwrap();
    }
    assert!(renderer.render_frame().unwrap());

    let main: Vec<TransformUniforms> = gl
        .take_draws()
        .into_iter()
        .filter(|d| d.program.as_deref() == Some("phong_brdf"))
        .map(|d| bytemuck::pod_read_unaligned(&d.transform.expect("transform block is bound")))
        .collect();
    assert_eq!(main.len(), tints.len());
    for (i, (uniforms, tint)) in main.iter().zip(&tints).enumerate() {
        assert_eq!(uniforms.tint, tint.to_array());
        assert_eq!(uniforms.model[3][0], i as f32);
    }
    assert_eq!(renderer.last_frame_stats().draw_calls, 4);
}

#[test]
fn test_resize_resizes_main_target() {
    let (mut renderer, gl) = boot(320, 240);
    renderer.render_frame().unwrap();
    assert_eq!(gl.framebuffer_size("post_process"), Some(Extent2D::new(320, 240)));

    renderer.on_resize(Extent2D::new(640, 360), Extent2D::new(1280, 720));
    // Not applied until the next frame.
    assert_eq!(renderer.framebuffer_size(), Extent2D::new(320, 240));

    assert!(renderer.render_frame().unwrap());
    assert_eq!(renderer.surface_size(), Extent2D::new(640, 360));
    assert_eq!(gl.framebuffer_size("post_process"), Some(Extent2D::new(1280, 720)));
    assert_eq!(gl.viewport(), Extent2D::new(1280, 720));
}

#[test]
fn test_zero_area_surface_keeps_commands() {
    let (mut renderer, gl) = boot(320, 240);
    renderer.on_resize(Extent2D::new(0, 0), Extent2D::new(0, 0));
    let (vertices, indices) = Vertex::quad(1.0);
    renderer.generate_mesh(vertices, indices).unwrap();

    assert!(!renderer.render_frame().unwrap());
    assert_eq!(renderer.pending_commands(), 1);
    assert_eq!(gl.vertex_array_count(), 0);

    renderer.on_resize(Extent2D::new(320, 240), Extent2D::new(320, 240));
    assert!(renderer.render_frame().unwrap());
    assert_eq!(gl.vertex_array_count(), 1);
}

#[test]
fn test_context_loss_skips_frames() {
    let (mut renderer, gl) = boot(320, 240);
    renderer.set_directional_light(Vec3::X, Vec3::ONE, true).unwrap();
    gl.set_context_lost(true);

    assert_eq!(renderer.render_frame(), Ok(false));
    assert_eq!(renderer.pending_commands(), 1);
    assert_eq!(renderer.state(), FrameState::Ready);
    assert_eq!(gl.presented_frames(), 0);

    gl.set_context_lost(false);
    assert_eq!(renderer.render_frame(), Ok(true));
    assert_eq!(renderer.light_uniforms().directional.active, 1);
}

#[test]
fn test_retire_is_idempotent_and_frees_handles_after_execution() {
    let (mut renderer, gl) = boot(320, 240);
    let (descriptor, pixels) = rgba_1x1();
    let first = renderer.generate_texture(descriptor, pixels.clone()).unwrap();
    renderer.render_frame().unwrap();
    assert_eq!(gl.texture_count(), 1);

    renderer.retire_textures(&[first, first, RenderId::NULL]).unwrap();
    // Still reserved until the retire command has run.
    let second = renderer.generate_texture(descriptor, pixels.clone()).unwrap();
    assert_ne!(second, first);
    renderer.render_frame().unwrap();
    assert_eq!(renderer.last_frame_stats().resources_retired, 1);
    assert_eq!(gl.texture_count(), 1);

    renderer.retire_textures(&[first]).unwrap();
    assert_eq!(renderer.pending_commands(), 0);

    let third = renderer.generate_texture(descriptor, pixels).unwrap();
    assert_eq!(third, first);
}

#[test]
fn test_texture_validation() {
    let (mut renderer, _gl) = boot(64, 64);
    let descriptor = TextureDescriptor::new_2d(2, 2, TextureFormat::Rgba, TextureBaseType::U8);
    assert_eq!(
        renderer.generate_texture(descriptor, vec![0u8; 15]),
        Err(RenderError::Resource(ResourceError::BufferSizeMismatch {
            expected: 16,
            actual: 15,
        }))
    );

    let one_d = TextureDescriptor {
        texture_type: lumen_core::renderer::texture::TextureType::D1,
        ..descriptor
    };
    assert_eq!(
        renderer.generate_texture(one_d, vec![0u8; 8]),
        Err(RenderError::Resource(ResourceError::UnsupportedTextureType))
    );
    assert_eq!(renderer.pending_commands(), 0);
}

#[test]
fn test_texture_table_holds_255_entries() {
    let (mut renderer, gl) = boot(64, 64);
    let (descriptor, pixels) = rgba_1x1();
    let ids: Vec<RenderId> = (0..255)
        .map(|_| renderer.generate_texture(descriptor, pixels.clone()).unwrap())
        .collect();
    assert_eq!(ids.first(), Some(&RenderId(1)));
    assert_eq!(ids.last(), Some(&RenderId(255)));
    assert!(matches!(
        renderer.generate_texture(descriptor, pixels),
        Err(RenderError::Resource(ResourceError::TableFull { .. }))
    ));

    renderer.render_frame().unwrap();
    assert_eq!(gl.texture_count(), 255);
    assert_eq!(renderer.last_frame_stats().commands_failed, 0);
}

#[test]
fn test_point_light_index_out_of_range() {
    let (mut renderer, _gl) = boot(64, 64);
    renderer.set_point_light(3, Vec3::ZERO, Vec3::ONE, true).unwrap();
    assert_eq!(
        renderer.set_point_light(4, Vec3::ZERO, Vec3::ONE, true),
        Err(RenderError::Resource(ResourceError::InvalidLightIndex(4)))
    );
    renderer.render_frame().unwrap();
    assert_eq!(renderer.point_light_mask(), 0b1000);
}

#[test]
fn test_unsupported_backend_is_rejected() {
    let config = RendererConfig {
        backend: GraphicsBackendType::Metal,
        ..Default::default()
    };
    let mut renderer = RendererSubsystem::new(config).unwrap();
    let surface = HeadlessSurface::new(64, 64).on_platform(Platform::Linux);
    let result = renderer.subsystem_init(&surface, NativeApi::OpenGl(Box::new(HeadlessGl::new())));
    assert!(matches!(result, Err(RenderError::UnsupportedBackend { .. })));
    assert_eq!(renderer.state(), FrameState::Uninitialized);
    assert_eq!(renderer.render_frame(), Err(RenderError::NotInitialized));
}

#[test]
fn test_shutdown_releases_everything() {
    let (mut renderer, gl) = boot(64, 64);
    let (vertices, indices) = Vertex::quad(1.0);
    renderer.generate_mesh(vertices, indices).unwrap();
    renderer.render_frame().unwrap();
    assert!(gl.live_objects() > 0);

    drop(renderer);
    assert_eq!(gl.live_objects(), 0);
}
