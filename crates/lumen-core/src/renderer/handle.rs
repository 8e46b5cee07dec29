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

//! Opaque resource handles and the fixed-capacity pools that hand them out.

use crate::renderer::error::ResourceError;
use std::collections::BTreeSet;
use std::fmt;

/// An opaque handle to a GPU resource owned by the active backend.
///
/// Values are dense indices into the backend's fixed-size tables, offset by
/// one so that `0` stays reserved as [`RenderId::NULL`].
///
/// Handles carry no generation counter: once a retired number is handed out
/// again, a stale copy of the old handle aliases the new resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RenderId(pub u32);

impl RenderId {
    /// The reserved null handle. Never refers to a resource.
    pub const NULL: Self = Self(0);

    /// Returns `true` for [`RenderId::NULL`].
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The zero-based table slot this handle refers to, if any.
    pub const fn slot(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0 as usize - 1)
        }
    }

    /// Builds the handle referring to a zero-based table slot.
    pub const fn from_slot(slot: usize) -> Self {
        Self(slot as u32 + 1)
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("RenderId(null)")
        } else {
            write!(f, "RenderId({})", self.0)
        }
    }
}

/// The kind of resource a table or handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A vertex array with its vertex and index buffers.
    Mesh,
    /// A sampled texture.
    Texture,
    /// A linked shader program.
    ShaderProgram,
    /// A uniform buffer at a fixed binding point.
    UniformBuffer,
    /// A framebuffer with its attachments.
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Mesh => "mesh",
            ResourceKind::Texture => "texture",
            ResourceKind::ShaderProgram => "shader program",
            ResourceKind::UniformBuffer => "uniform buffer",
            ResourceKind::Framebuffer => "framebuffer",
        };
        f.write_str(name)
    }
}

/// Hands out [`RenderId`] numbers for one fixed-capacity table.
///
/// The lowest free number is always handed out first. A number only becomes
/// free again through [`HandlePool::release`], so a live handle is never
/// returned twice.
#[derive(Debug, Clone)]
pub struct HandlePool {
    kind: ResourceKind,
    capacity: usize,
    free: BTreeSet<u32>,
}

impl HandlePool {
    /// Creates a pool of `capacity` handles, numbered `1..=capacity`.
    pub fn new(kind: ResourceKind, capacity: usize) -> Self {
        Self {
            kind,
            capacity,
            free: (1..=capacity as u32).collect(),
        }
    }

    /// The kind of resource this pool allocates for.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The total number of handles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of handles currently allocated.
    pub fn live_count(&self) -> usize {
        self.capacity - self.free.len()
    }

    /// Allocates the lowest free handle.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TableFull`] when every handle is live. The pool
    /// is left untouched.
    pub fn allocate(&mut self) -> Result<RenderId, ResourceError> {
        self.free
            .pop_first()
            .map(RenderId)
            .ok_or(ResourceError::TableFull {
                kind: self.kind,
                capacity: self.capacity,
            })
    }

    /// Returns `true` if `id` is currently allocated from this pool.
    pub fn is_live(&self, id: RenderId) -> bool {
        !id.is_null() && (id.0 as usize) <= self.capacity && !self.free.contains(&id.0)
    }

    /// Frees `id` for reuse.
    ///
    /// Releasing the null handle, an out-of-range handle or one that is
    /// already free does nothing and returns `false`.
    pub fn release(&mut self, id: RenderId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.free.insert(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_has_no_slot() {
        assert!(RenderId::NULL.is_null());
        assert_eq!(RenderId::NULL.slot(), None);
        assert_eq!(RenderId(1).slot(), Some(0));
        assert_eq!(RenderId::from_slot(254), RenderId(255));
        assert_eq!(RenderId::default(), RenderId::NULL);
    }

    #[test]
    fn allocates_lowest_free_first() {
        let mut pool = HandlePool::new(ResourceKind::Mesh, 4);
        assert_eq!(pool.allocate(), Ok(RenderId(1)));
        assert_eq!(pool.allocate(), Ok(RenderId(2)));
        assert_eq!(pool.allocate(), Ok(RenderId(3)));
        assert!(pool.release(RenderId(2)));
        assert_eq!(pool.allocate(), Ok(RenderId(2)));
        assert_eq!(pool.allocate(), Ok(RenderId(4)));
        assert_eq!(pool.live_count(), 4);
    }

    #[test]
    fn exhaustion_leaves_pool_untouched() {
        let mut pool = HandlePool::new(ResourceKind::Texture, 2);
        pool.allocate().unwrap();
        pool.allocate().unwrap();
        assert_eq!(
            pool.allocate(),
            Err(ResourceError::TableFull {
                kind: ResourceKind::Texture,
                capacity: 2
            })
        );
        assert_eq!(pool.live_count(), 2);
        assert!(pool.is_live(RenderId(1)));
        assert!(pool.is_live(RenderId(2)));
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = HandlePool::new(ResourceKind::Mesh, 3);
        let id = pool.allocate().unwrap();
        assert!(pool.release(id));
        assert!(!pool.release(id));
        assert!(!pool.release(RenderId::NULL));
        assert!(!pool.release(RenderId(99)));
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn live_handles_are_never_duplicated() {
        let mut pool = HandlePool::new(ResourceKind::Mesh, 8);
        let mut live = Vec::new();
        for round in 0..64u32 {
            if round % 3 == 2 && !live.is_empty() {
                let retired = live.remove((round as usize) % live.len());
                assert!(pool.release(retired));
            } else if let Ok(id) = pool.allocate() {
                assert!(!live.contains(&id), "{id} handed out while still live");
                live.push(id);
            }
        }
    }
}
