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

use lumen_core::renderer::{RenderId, ResourceError};

/// A fixed-length table of backend objects indexed by [`RenderId`].
///
/// Slot `i` holds the object for `RenderId(i + 1)`.
#[derive(Debug)]
pub struct ResourceTable<T, const N: usize> {
    slots: [Option<T>; N],
}

impl<T, const N: usize> Default for ResourceTable<T, N> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T, const N: usize> ResourceTable<T, N> {
    /// Number of slots.
    pub const CAPACITY: usize = N;

    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The object behind `id`, if any.
    pub fn get(&self, id: RenderId) -> Option<&T> {
        self.slots.get(id.slot()?)?.as_ref()
    }

    /// Returns `true` if `id` refers to an occupied slot.
    pub fn contains(&self, id: RenderId) -> bool {
        self.get(id).is_some()
    }

    /// Stores `value` in the empty slot of `id`.
    ///
    /// # Errors
    ///
    /// [`ResourceError::InvalidHandle`] for the null handle, an out-of-range
    /// handle or an occupied slot. The rejected value is returned with the error.
    pub fn insert(&mut self, id: RenderId, value: T) -> Result<(), (ResourceError, T)> {
        let Some(slot) = id.slot().and_then(|slot| self.slots.get_mut(slot)) else {
            return Err((ResourceError::InvalidHandle, value));
        };
        if slot.is_some() {
            return Err((ResourceError::InvalidHandle, value));
        }
        *slot = Some(value);
        Ok(())
    }

    /// Empties the slot of `id`, returning its object.
    pub fn remove(&mut self, id: RenderId) -> Option<T> {
        self.slots.get_mut(id.slot()?)?.take()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Empties every slot, yielding the objects.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}
