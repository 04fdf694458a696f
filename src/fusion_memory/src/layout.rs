//! Pitched 3D layout description and strided row copies.
//!
//! A pitched buffer stores `depth` slices of `height` rows. Each row holds
//! `width` elements followed by optional padding up to `pitch` bytes, and
//! each slice is `pitch * height` bytes.

use crate::error::MemoryError;

/// Dimensions of a 3D buffer in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent3 {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
}

impl Extent3 {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Number of elements, `width * height * depth`.
    pub fn elements(&self) -> usize {
        self.width * self.height * self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.elements() == 0
    }
}

/// Physical layout of a pitched buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PitchedLayout {
    /// Logical dimensions in elements.
    pub extent: Extent3,
    /// Size of one element in bytes.
    pub elem_size: usize,
    /// Row stride in bytes.
    pub pitch: usize,
    /// Slice stride in bytes (`pitch * height`).
    pub slice_pitch: usize,
}

impl PitchedLayout {
    /// Layout without row padding.
    pub fn packed(extent: Extent3, elem_size: usize) -> Self {
        let pitch = extent.width * elem_size;
        Self {
            extent,
            elem_size,
            pitch,
            slice_pitch: pitch * extent.height,
        }
    }

    /// Layout whose rows are padded to a multiple of `alignment` bytes.
    ///
    /// An `alignment` of zero is treated as one.
    pub fn aligned(extent: Extent3, elem_size: usize, alignment: usize) -> Self {
        let pitch = (extent.width * elem_size).next_multiple_of(alignment.max(1));
        Self {
            extent,
            elem_size,
            pitch,
            slice_pitch: pitch * extent.height,
        }
    }

    /// Bytes of payload in one row, excluding padding.
    pub fn row_bytes(&self) -> usize {
        self.extent.width * self.elem_size
    }

    /// Total allocation size, `slice_pitch * depth`.
    pub fn size_bytes(&self) -> usize {
        self.slice_pitch * self.extent.depth
    }

    /// Whether rows are stored back to back without padding.
    pub fn is_packed(&self) -> bool {
        self.pitch == self.row_bytes()
    }
}

/// Smallest buffer length able to hold `height * depth` rows of `row_bytes`
/// laid out with a row stride of `pitch`.
pub fn required_len(row_bytes: usize, pitch: usize, height: usize, depth: usize) -> usize {
    if row_bytes == 0 || height == 0 || depth == 0 {
        return 0;
    }
    pitch * height * (depth - 1) + pitch * (height - 1) + row_bytes
}

/// Copy `height * depth` rows of `row_bytes` between two pitched byte buffers.
///
/// Slice pitches are implied by `pitch * height` on each side. Padding bytes
/// in `dst` are left untouched.
pub fn copy_pitched(
    dst: &mut [u8],
    dst_pitch: usize,
    src: &[u8],
    src_pitch: usize,
    row_bytes: usize,
    height: usize,
    depth: usize,
) -> Result<(), MemoryError> {
    for pitch in [dst_pitch, src_pitch] {
        if pitch < row_bytes {
            return Err(MemoryError::PitchTooSmall { pitch, row_bytes });
        }
    }

    let dst_required = required_len(row_bytes, dst_pitch, height, depth);
    if dst.len() < dst_required {
        return Err(MemoryError::BufferTooSmall {
            required: dst_required,
            available: dst.len(),
        });
    }
    let src_required = required_len(row_bytes, src_pitch, height, depth);
    if src.len() < src_required {
        return Err(MemoryError::BufferTooSmall {
            required: src_required,
            available: src.len(),
        });
    }

    if dst_required == 0 {
        return Ok(());
    }

    // Both sides dense: one contiguous copy
    if dst_pitch == row_bytes && src_pitch == row_bytes {
        dst[..dst_required].copy_from_slice(&src[..src_required]);
        return Ok(());
    }

    for row in 0..height * depth {
        let d = row * dst_pitch;
        let s = row * src_pitch;
        dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }

    Ok(())
}
