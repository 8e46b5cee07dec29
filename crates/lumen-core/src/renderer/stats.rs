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

use crate::renderer::command::RenderCommand;

/// Counters collected while executing one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Index of the frame, starting at 1.
    pub frame_number: u64,
    /// Commands handed to the backend.
    pub commands_executed: u32,
    /// Commands the backend rejected or skipped.
    pub commands_failed: u32,
    /// `Draw3D` commands executed.
    pub draw_calls: u32,
    /// Meshes created.
    pub meshes_generated: u32,
    /// Textures created.
    pub textures_generated: u32,
    /// Handles released by retire commands.
    pub resources_retired: u32,
    /// CPU time spent in the frame, in milliseconds.
    pub cpu_time_ms: f32,
}

impl FrameStats {
    /// Counts a successfully executed command.
    pub fn record(&mut self, command: &RenderCommand) {
        self.commands_executed += 1;
        match command {
            RenderCommand::Draw3D(_) => self.draw_calls += 1,
            RenderCommand::GenerateMesh { .. } => self.meshes_generated += 1,
            RenderCommand::GenerateTexture { .. } => self.textures_generated += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::command::DrawCommand;
    use crate::renderer::handle::RenderId;
    use glam::Mat4;

    #[test]
    fn record_counts_by_kind() {
        let mut stats = FrameStats::default();
        stats.record(&RenderCommand::Draw3D(DrawCommand::new(RenderId(1), Mat4::IDENTITY)));
        stats.record(&RenderCommand::RetireMeshes(vec![RenderId(1)]));
        assert_eq!(stats.commands_executed, 2);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.meshes_generated, 0);
    }
}
