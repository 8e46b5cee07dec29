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

// Lumen Sandbox
// Drives the renderer headlessly for a few frames.

use anyhow::{anyhow, Result};
use lumen_infra::graphics::opengl::HeadlessGl;
use lumen_sdk::prelude::*;

const FRAMES: u32 = 8;

fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 {
                [230, 230, 230, 255]
            } else {
                [40, 40, 40, 255]
            }
        })
        .collect()
}

fn load_config() -> Result<RendererConfig> {
    match std::env::args().nth(1) {
        Some(path) => RendererConfig::from_file(&path)
            .map_err(|e| anyhow!("reading renderer config from {path}: {e}")),
        None => Ok(RendererConfig::default()),
    }
}

fn main() -> Result<()> {
    lumen_sdk::logging::init("info");

    let config = load_config()?;
    let gl = HeadlessGl::new();
    let surface = HeadlessSurface::new(1280, 720);
    let mut renderer = RendererSubsystem::new(config)?;
    renderer.subsystem_init(&surface, NativeApi::OpenGl(Box::new(gl.clone())))?;

    // --- Scene setup ---
    let (vertices, indices) = Vertex::quad(1.0);
    let floor = renderer.generate_mesh(vertices, indices)?;
    let descriptor = TextureDescriptor::new_2d(8, 8, TextureFormat::Rgba, TextureBaseType::U8)
        .with_filters(TextureFilter::Nearest, TextureFilter::Nearest);
    let checker = renderer.generate_texture(descriptor, checkerboard(8))?;

    renderer.set_camera(&Camera::look_at(
        Vec3::new(0.0, 2.0, 5.0),
        Vec3::ZERO,
        Vec3::Y,
    ))?;
    renderer.set_directional_light(
        Vec3::new(-0.3, -1.0, -0.2),
        Vec3::new(1.0, 0.95, 0.9),
        true,
    )?;
    renderer.set_point_light(
        0,
        Vec3::new(0.0, 1.5, 0.0),
        Vec3::new(1.0, 0.4, 0.2),
        true,
    )?;

    let floor_transform =
        Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2) * Mat4::from_scale(Vec3::splat(4.0));
    let textures = [checker, RenderId::NULL, RenderId::NULL, RenderId::NULL];

    // --- Frame loop ---
    for frame in 0..FRAMES {
        if frame == FRAMES / 2 {
            renderer.on_resize(Extent2D::new(800, 600), Extent2D::new(1600, 1200));
        }
        let spin = Mat4::from_rotation_y(frame as f32 * 0.25) * Mat4::from_translation(Vec3::Y);
        renderer.draw(
            floor_transform,
            floor,
            textures,
            Vec4::ONE,
            DrawFlags::CAST_SHADOWS | DrawFlags::RECEIVE_SHADOWS,
        )?;
        renderer.draw(
            spin,
            floor,
            textures,
            Vec4::new(0.8, 0.9, 1.0, 1.0),
            DrawFlags::CAST_SHADOWS | DrawFlags::DOUBLE_SIDED,
        )?;

        if renderer.render_frame()? {
            let stats = renderer.last_frame_stats();
            log::info!(
                "Frame {}: {} commands, {} draws, {} GL draw calls, {:.3} ms",
                stats.frame_number,
                stats.commands_executed,
                stats.draw_calls,
                gl.take_draws().len(),
                stats.cpu_time_ms
            );
        }
    }

    // --- Teardown ---
    renderer.retire_meshes(&[floor])?;
    renderer.retire_textures(&[checker])?;
    renderer.render_frame()?;
    log::info!(
        "Retired {} resources, {} GL objects still alive before shutdown.",
        renderer.last_frame_stats().resources_retired,
        gl.live_objects()
    );
    renderer.shutdown();
    log::info!("Presented {} frames.", gl.presented_frames());
    Ok(())
}
