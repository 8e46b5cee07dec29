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

use lumen_core::renderer::{
    CommandQueue, DrawCommand, HandlePool, LightState, PointLight, RenderCommand, RenderId,
    ResourceError, ResourceKind, TextureBaseType, TextureDescriptor, TextureFormat, Vertex,
};
use lumen_core::math::Vec3;
use std::sync::Arc;

#[test]
fn test_generate_then_retire_within_one_queue() {
    // --- 1. Reserve handles and record the commands that use them ---
    let mut meshes = HandlePool::new(ResourceKind::Mesh, 255);
    let mut queue = CommandQueue::new();
    let (vertices, indices) = Vertex::quad(1.0);

    let id = meshes.allocate().unwrap();
    queue.push(RenderCommand::GenerateMesh {
        id,
        vertices: Arc::from(vertices.as_slice()),
        indices: Arc::from(indices.as_slice()),
    });
    queue.push(RenderCommand::Draw3D(DrawCommand::new(id, glam::Mat4::IDENTITY)));
    queue.push(RenderCommand::RetireMeshes(vec![id]));

    // --- 2. The handle stays reserved until the retire is consumed ---
    assert!(meshes.is_live(id));
    let next = meshes.allocate().unwrap();
    assert_ne!(next, id);

    // --- 3. Consume in push order, freeing on retire ---
    let mut order = Vec::new();
    for command in queue.flush() {
        order.push(command.name());
        if let RenderCommand::RetireMeshes(ids) = &command {
            for retired in ids {
                meshes.release(*retired);
            }
        }
    }
    assert_eq!(order, ["generate_mesh", "draw_3d", "retire_meshes"]);
    assert!(!meshes.is_live(id));
    assert_eq!(meshes.allocate().unwrap(), id);
}

#[test]
fn test_table_exhaustion_is_recoverable() {
    let mut textures = HandlePool::new(ResourceKind::Texture, 255);
    let ids: Vec<RenderId> = (0..255).map(|_| textures.allocate().unwrap()).collect();
    assert_eq!(ids.first(), Some(&RenderId(1)));
    assert_eq!(ids.last(), Some(&RenderId(255)));

    assert!(matches!(
        textures.allocate(),
        Err(ResourceError::TableFull { kind: ResourceKind::Texture, capacity: 255 })
    ));

    textures.release(RenderId(17));
    assert_eq!(textures.allocate(), Ok(RenderId(17)));
}

#[test]
fn test_texture_buffer_boundaries() {
    let one_byte = TextureDescriptor::new_2d(1, 1, TextureFormat::R, TextureBaseType::U8);
    assert!(one_byte.validate_buffer(1).is_ok());
    assert!(one_byte.validate_buffer(0).is_err());

    let rgba_f32 = TextureDescriptor::new_2d(4, 4, TextureFormat::Rgba, TextureBaseType::F32);
    assert!(rgba_f32.validate_buffer(256).is_ok());
    assert_eq!(
        rgba_f32.validate_buffer(255),
        Err(ResourceError::BufferSizeMismatch { expected: 256, actual: 255 })
    );
}

#[test]
fn test_point_light_slots_are_independent() {
    let mut lights = LightState::new();
    for index in 0..4u8 {
        let light = PointLight::new(Vec3::splat(index as f32), Vec3::ONE, true);
        lights.set_point(index, light).unwrap();
    }
    assert_eq!(lights.active_point_mask(), 0b1111);

    let uniforms_before = lights.to_uniforms();
    assert!(lights.set_point(200, PointLight::default()).is_err());
    assert_eq!(lights.to_uniforms(), uniforms_before);

    let uniforms = lights.to_uniforms();
    for (index, slot) in uniforms.point_lights.iter().enumerate() {
        assert_eq!(slot.position, [index as f32; 3]);
    }
}
