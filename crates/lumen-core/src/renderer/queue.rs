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

//! Per-frame command recording.

use crate::renderer::command::RenderCommand;
use std::vec::Drain;

/// The ordered list of commands recorded during one frame.
///
/// Pushing never executes anything. The frame driver drains the queue once per
/// frame with [`CommandQueue::flush`], which keeps the allocation for the next
/// frame.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<RenderCommand>,
}

impl CommandQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue that can hold `capacity` commands without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Appends a command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Allocated capacity.
    pub fn capacity(&self) -> usize {
        self.commands.capacity()
    }

    /// Iterates over pending commands in push order.
    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand> {
        self.commands.iter()
    }

    /// Removes every pending command, yielding them in push order.
    ///
    /// Commands not consumed from the iterator are dropped with it.
    pub fn flush(&mut self) -> Drain<'_, RenderCommand> {
        self.commands.drain(..)
    }
}

impl<'a> IntoIterator for &'a CommandQueue {
    type Item = &'a RenderCommand;
    type IntoIter = std::slice::Iter<'a, RenderCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::handle::RenderId;

    #[test]
    fn flush_preserves_order_and_capacity() {
        let mut queue = CommandQueue::with_capacity(8);
        queue.push(RenderCommand::RetireMeshes(vec![RenderId(1)]));
        queue.push(RenderCommand::RetireTextures(vec![RenderId(2)]));
        queue.push(RenderCommand::RetireMeshes(vec![RenderId(3)]));

        let names: Vec<_> = queue.flush().map(|c| c.name()).collect();
        assert_eq!(names, ["retire_meshes", "retire_textures", "retire_meshes"]);
        assert!(queue.is_empty());
        assert!(queue.capacity() >= 8);
    }

    #[test]
    fn iteration_does_not_consume() {
        let mut queue = CommandQueue::new();
        queue.push(RenderCommand::RetireMeshes(Vec::new()));
        assert_eq!((&queue).into_iter().count(), 1);
        assert_eq!(queue.len(), 1);
    }
}
