//! CUDA device-resident pitched buffers.
//!
//! Device rows are padded to [`DEVICE_PITCH_ALIGNMENT`] bytes. Transfers are
//! staged through a host buffer with the device layout and complete before
//! returning (the stream is synchronized after each copy).

use std::marker::PhantomData;
use std::sync::Arc;

use bytemuck::Pod;
use cudarc::driver::{CudaContext, CudaSlice, CudaStream};
use tracing::{debug, trace};

use crate::error::MemoryError;
use crate::layout::{copy_pitched, Extent3, PitchedLayout};
use crate::{PitchedStorage, StorageMode};

/// Row alignment used for device allocations.
pub const DEVICE_PITCH_ALIGNMENT: usize = 256;

/// Pitched buffer in CUDA global memory.
pub struct DeviceBuffer<T: Pod> {
    /// Stream used for all copies into and out of this buffer
    stream: Arc<CudaStream>,
    data: CudaSlice<u8>,
    layout: PitchedLayout,
    _marker: PhantomData<T>,
}

impl<T: Pod> DeviceBuffer<T> {
    /// Allocate zeroed storage on a specific CUDA device.
    pub fn allocate_on(device_id: usize, extent: Extent3) -> Result<Self, MemoryError> {
        let ctx = CudaContext::new(device_id)?;
        let stream = ctx.default_stream();

        let layout = PitchedLayout::aligned(extent, std::mem::size_of::<T>(), DEVICE_PITCH_ALIGNMENT);
        // cudarc does not hand out zero-length allocations
        let data = stream.alloc_zeros::<u8>(layout.size_bytes().max(1))?;

        debug!(
            device_id,
            width = extent.width,
            height = extent.height,
            depth = extent.depth,
            pitch = layout.pitch,
            bytes = layout.size_bytes(),
            "allocated device buffer"
        );

        Ok(Self {
            stream,
            data,
            layout,
            _marker: PhantomData,
        })
    }

    /// Stream the buffer was allocated on.
    pub fn stream(&self) -> &Arc<CudaStream> {
        &self.stream
    }

    /// Underlying device allocation, for kernel launches.
    pub fn raw(&self) -> &CudaSlice<u8> {
        &self.data
    }

    pub fn raw_mut(&mut self) -> &mut CudaSlice<u8> {
        &mut self.data
    }
}

impl<T: Pod> PitchedStorage<T> for DeviceBuffer<T> {
    const MODE: StorageMode = StorageMode::Device;

    fn allocate(extent: Extent3) -> Result<Self, MemoryError> {
        Self::allocate_on(0, extent)
    }

    fn layout(&self) -> &PitchedLayout {
        &self.layout
    }

    fn upload(&mut self, src: &[u8], src_pitch: usize) -> Result<(), MemoryError> {
        let layout = self.layout;
        let mut staging = vec![0u8; layout.size_bytes()];
        copy_pitched(
            &mut staging,
            layout.pitch,
            src,
            src_pitch,
            layout.row_bytes(),
            layout.extent.height,
            layout.extent.depth,
        )?;
        if staging.is_empty() {
            return Ok(());
        }

        trace!(bytes = staging.len(), "host to device copy");
        self.stream.memcpy_htod(&staging, &mut self.data)?;
        self.stream.synchronize()?;
        Ok(())
    }

    fn download(&self, dst: &mut [u8], dst_pitch: usize) -> Result<(), MemoryError> {
        let layout = self.layout;
        let mut staging = vec![0u8; self.data.len()];
        if layout.size_bytes() > 0 {
            trace!(bytes = layout.size_bytes(), "device to host copy");
            self.stream.memcpy_dtoh(&self.data, &mut staging)?;
            self.stream.synchronize()?;
        }
        copy_pitched(
            dst,
            dst_pitch,
            &staging,
            layout.pitch,
            layout.row_bytes(),
            layout.extent.height,
            layout.extent.depth,
        )
    }
}

impl<T: Pod> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        debug!(bytes = self.layout.size_bytes(), "released device buffer");
    }
}
