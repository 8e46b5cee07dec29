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

//! Defines texture descriptors and the rules for sizing their pixel buffers.
//!
//! The size of a pixel buffer is derived from three lookup tables (axes per
//! texture type, channels per format, bytes per base type), so adding a format
//! or a base type is one enum variant plus one table entry.

use crate::renderer::error::ResourceError;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// A one-dimensional texture. Declared but not supported.
    D1 = 0,
    /// A two-dimensional texture.
    D2 = 1,
    /// A three-dimensional (volumetric) texture.
    D3 = 2,
}

/// Number of size axes (width, height, depth) each texture type uses.
/// `None` marks a type the renderer does not support.
const AXES_PER_TYPE: [Option<usize>; 3] = [None, Some(2), Some(3)];

/// The channel layout of texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// One channel (grayscale).
    R = 0,
    /// Two channels.
    Rg = 1,
    /// Three channels.
    Rgb = 2,
    /// Four channels.
    Rgba = 3,
    /// Single depth channel.
    Depth = 4,
}

const CHANNELS_PER_FORMAT: [usize; 5] = [1, 2, 3, 4, 1];

/// The scalar type of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBaseType {
    /// Unsigned 8-bit, normalized when sampled.
    U8 = 0,
    /// Signed 8-bit.
    I8 = 1,
    /// Unsigned 16-bit.
    U16 = 2,
    /// Signed 16-bit.
    I16 = 3,
    /// Half-precision float.
    F16 = 4,
    /// Unsigned 32-bit.
    U32 = 5,
    /// Signed 32-bit.
    I32 = 6,
    /// Single-precision float.
    F32 = 7,
}

const BYTES_PER_BASE_TYPE: [usize; 8] = [1, 1, 2, 2, 2, 4, 4, 4];

/// Defines how texture coordinates are handled outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    #[default]
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirroredRepeat,
    /// Coordinates are clamped to the edge texel.
    ClampToEdge,
    /// Coordinates outside the range sample the border color.
    ClampToBorder,
}

/// Defines the filtering mode for texture sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    /// Point sampling.
    Nearest,
    /// Linear interpolation.
    #[default]
    Linear,
}

impl TextureType {
    /// How many of width/height/depth contribute to the texel count.
    pub const fn axis_count(self) -> Option<usize> {
        AXES_PER_TYPE[self as usize]
    }
}

impl TextureFormat {
    /// Number of channels per texel.
    pub const fn channel_count(self) -> usize {
        CHANNELS_PER_FORMAT[self as usize]
    }
}

impl TextureBaseType {
    /// Size of one channel in bytes.
    pub const fn byte_size(self) -> usize {
        BYTES_PER_BASE_TYPE[self as usize]
    }
}

/// Everything a backend needs to create a texture, minus the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Dimensionality.
    pub texture_type: TextureType,
    /// Channel layout.
    pub format: TextureFormat,
    /// Channel scalar type.
    pub base_type: TextureBaseType,
    /// Wrap mode along S.
    pub wrap_x: TextureWrap,
    /// Wrap mode along T.
    pub wrap_y: TextureWrap,
    /// Wrap mode along R (3D only).
    pub wrap_z: TextureWrap,
    /// Minification filter.
    pub min_filter: TextureFilter,
    /// Magnification filter.
    pub mag_filter: TextureFilter,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels. Ignored for 2D textures.
    pub depth: u32,
}

impl TextureDescriptor {
    /// A repeating, linearly filtered 2D texture.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, base_type: TextureBaseType) -> Self {
        Self {
            texture_type: TextureType::D2,
            format,
            base_type,
            wrap_x: TextureWrap::default(),
            wrap_y: TextureWrap::default(),
            wrap_z: TextureWrap::default(),
            min_filter: TextureFilter::default(),
            mag_filter: TextureFilter::default(),
            width,
            height,
            depth: 1,
        }
    }

    /// A repeating, linearly filtered 3D texture.
    pub fn new_3d(
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        base_type: TextureBaseType,
    ) -> Self {
        Self {
            texture_type: TextureType::D3,
            depth,
            ..Self::new_2d(width, height, format, base_type)
        }
    }

    /// Sets the same wrap mode on every axis.
    #[must_use]
    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap_x = wrap;
        self.wrap_y = wrap;
        self.wrap_z = wrap;
        self
    }

    /// Sets minification and magnification filters.
    #[must_use]
    pub fn with_filters(mut self, min_filter: TextureFilter, mag_filter: TextureFilter) -> Self {
        self.min_filter = min_filter;
        self.mag_filter = mag_filter;
        self
    }

    /// Bytes per texel (`channels * byte_size`).
    pub const fn bytes_per_texel(&self) -> usize {
        self.format.channel_count() * self.base_type.byte_size()
    }

    /// The exact size in bytes the pixel buffer must have.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::UnsupportedTextureType`] for 1D textures.
    /// - [`ResourceError::InvalidDimensions`] if a participating dimension is
    ///   zero or the size does not fit in `usize`.
    pub fn expected_buffer_size(&self) -> Result<usize, ResourceError> {
        let axes = self
            .texture_type
            .axis_count()
            .ok_or(ResourceError::UnsupportedTextureType)?;
        let dims = [self.width, self.height, self.depth];
        if dims[..axes].contains(&0) {
            return Err(ResourceError::InvalidDimensions);
        }
        dims[..axes]
            .iter()
            .try_fold(self.bytes_per_texel(), |size, &d| size.checked_mul(d as usize))
            .ok_or(ResourceError::InvalidDimensions)
    }

    /// Checks that `buffer_len` matches [`TextureDescriptor::expected_buffer_size`].
    pub fn validate_buffer(&self, buffer_len: usize) -> Result<(), ResourceError> {
        let expected = self.expected_buffer_size()?;
        if expected != buffer_len {
            return Err(ResourceError::BufferSizeMismatch {
                expected,
                actual: buffer_len,
            });
        }
        Ok(())
    }
}
