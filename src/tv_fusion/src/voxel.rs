//! Voxel record stored in the fusion grid.

use bytemuck::{Pod, Zeroable};
use nalgebra::Vector3;

use crate::histogram::Histogram;

/// All per-voxel state of the fusion.
///
/// The layout is `#[repr(C)]` and free of padding, so whole grids can be
/// moved between host and device memory as raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel<const B: usize> {
    /// Primal variable (fused signed distance).
    pub u: f32,
    /// Helper variable (over-relaxed primal).
    pub v: f32,
    /// Dual variable.
    pub p: Vector3<f32>,
    /// Signed distance votes.
    pub h: Histogram<B>,
}

// SAFETY: `#[repr(C)]` with only 4-byte aligned `f32`/`u32` data, so there is
// no padding and the all-zero pattern is a valid voxel.
unsafe impl<const B: usize> Zeroable for Voxel<B> {}
unsafe impl<const B: usize> Pod for Voxel<B> {}

impl<const B: usize> Default for Voxel<B> {
    fn default() -> Self {
        Self::zeroed()
    }
}
