//! Bulk voxel transfers between the grid storage and caller buffers.
//!
//! Caller buffers are laid out row by row (x fastest, then y, then z) with a
//! caller-chosen row pitch in bytes. The grid's own pitch comes from its
//! storage and may differ; both are applied on every copy. The copy
//! direction follows from the storage: host grids copy host to host, device
//! grids host to device and back.

use fusion_memory::PitchedStorage;
use tracing::warn;

use super::FusionGrid;
use crate::error::FusionError;
use crate::voxel::Voxel;

impl<const B: usize, S: PitchedStorage<Voxel<B>>> FusionGrid<B, S> {
    /// Overwrite the grid with voxels from `data`, whose rows are `pitch`
    /// bytes apart.
    pub fn copy_from(&mut self, data: &[Voxel<B>], pitch: usize) -> Result<(), FusionError> {
        self.copy_from_bytes(bytemuck::cast_slice(data), pitch)
    }

    /// Write the grid into `data`, whose rows are `pitch` bytes apart.
    ///
    /// Padding between rows of `data` is left untouched.
    pub fn copy_to(&self, data: &mut [Voxel<B>], pitch: usize) -> Result<(), FusionError> {
        self.copy_to_bytes(bytemuck::cast_slice_mut(data), pitch)
    }

    /// Like [`Self::copy_from`] for an untyped buffer, such as a voxel dump
    /// read back from disk.
    pub fn copy_from_bytes(&mut self, data: &[u8], pitch: usize) -> Result<(), FusionError> {
        self.storage.upload(data, pitch).map_err(|e| {
            warn!(mode = %S::MODE, pitch, "voxel upload failed: {e}");
            FusionError::Memory(e)
        })
    }

    pub fn copy_to_bytes(&self, data: &mut [u8], pitch: usize) -> Result<(), FusionError> {
        self.storage.download(data, pitch).map_err(|e| {
            warn!(mode = %S::MODE, pitch, "voxel download failed: {e}");
            FusionError::Memory(e)
        })
    }
}
