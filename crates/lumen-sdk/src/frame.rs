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

use std::fmt;

/// Lifecycle state of a [`RendererSubsystem`](crate::RendererSubsystem).
///
/// ```text
/// Uninitialized -> Ready -> (BeginFrame -> CommandsFlushed -> EndFrame -> Ready)* -> ShuttingDown -> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Created, no backend yet.
    Uninitialized,
    /// Between frames. Commands can be recorded.
    Ready,
    /// The backend accepted `begin_frame`.
    BeginFrame,
    /// Every queued command was executed.
    CommandsFlushed,
    /// The backend finished the frame.
    EndFrame,
    /// Resources are being released.
    ShuttingDown,
    /// The backend is gone. Nothing can be recorded anymore.
    Terminated,
}

impl FrameState {
    /// Returns `true` if moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: FrameState) -> bool {
        use FrameState::*;
        matches!(
            (self, next),
            (Uninitialized, Ready)
                | (Uninitialized, Terminated)
                | (Ready, BeginFrame)
                | (Ready, ShuttingDown)
                | (BeginFrame, CommandsFlushed)
                | (BeginFrame, Ready)
                | (CommandsFlushed, EndFrame)
                | (CommandsFlushed, Ready)
                | (EndFrame, Ready)
                | (ShuttingDown, Terminated)
        )
    }

    /// Returns `true` while commands can be recorded.
    pub fn accepts_commands(self) -> bool {
        matches!(self, FrameState::Ready)
    }

    /// A lowercase name for logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            FrameState::Uninitialized => "uninitialized",
            FrameState::Ready => "ready",
            FrameState::BeginFrame => "beginning a frame",
            FrameState::CommandsFlushed => "flushing commands",
            FrameState::EndFrame => "ending a frame",
            FrameState::ShuttingDown => "shutting down",
            FrameState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
