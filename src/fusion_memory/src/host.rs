//! Host-resident pitched buffers.

use bytemuck::{Pod, Zeroable};
use tracing::{debug, trace};

use crate::error::MemoryError;
use crate::layout::{copy_pitched, Extent3, PitchedLayout};
use crate::{HostAccess, PitchedStorage, StorageMode};

/// Dense host buffer of `T` elements.
///
/// Rows are packed, so the pitch equals `width * size_of::<T>()` and the
/// element at `(x, y, z)` is `x + y * width + z * width * height`.
#[derive(Debug, Clone)]
pub struct HostBuffer<T: Pod> {
    data: Vec<T>,
    layout: PitchedLayout,
}

impl<T: Pod> Default for HostBuffer<T> {
    /// Zero-sized buffer with no backing allocation.
    fn default() -> Self {
        Self {
            data: Vec::new(),
            layout: PitchedLayout::packed(Extent3::default(), std::mem::size_of::<T>()),
        }
    }
}

impl<T: Pod> HostBuffer<T> {
    /// Raw bytes of the buffer, `layout().size_bytes()` long.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }
}

impl<T: Pod> PitchedStorage<T> for HostBuffer<T> {
    const MODE: StorageMode = StorageMode::Host;

    fn allocate(extent: Extent3) -> Result<Self, MemoryError> {
        let layout = PitchedLayout::packed(extent, std::mem::size_of::<T>());
        let len = extent.elements();

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| MemoryError::OutOfMemory {
                requested: layout.size_bytes(),
            })?;
        data.resize(len, T::zeroed());

        debug!(
            width = extent.width,
            height = extent.height,
            depth = extent.depth,
            pitch = layout.pitch,
            bytes = layout.size_bytes(),
            "allocated host buffer"
        );

        Ok(Self { data, layout })
    }

    fn layout(&self) -> &PitchedLayout {
        &self.layout
    }

    fn upload(&mut self, src: &[u8], src_pitch: usize) -> Result<(), MemoryError> {
        let layout = self.layout;
        trace!(src_pitch, pitch = layout.pitch, "host to host copy");
        copy_pitched(
            self.as_bytes_mut(),
            layout.pitch,
            src,
            src_pitch,
            layout.row_bytes(),
            layout.extent.height,
            layout.extent.depth,
        )
    }

    fn download(&self, dst: &mut [u8], dst_pitch: usize) -> Result<(), MemoryError> {
        let layout = self.layout;
        trace!(dst_pitch, pitch = layout.pitch, "host to host copy");
        copy_pitched(
            dst,
            dst_pitch,
            self.as_bytes(),
            layout.pitch,
            layout.row_bytes(),
            layout.extent.height,
            layout.extent.depth,
        )
    }
}

impl<T: Pod> HostAccess<T> for HostBuffer<T> {
    fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Pod> Drop for HostBuffer<T> {
    fn drop(&mut self) {
        if !self.data.is_empty() {
            debug!(bytes = self.layout.size_bytes(), "released host buffer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_zeroed() {
        let buffer = HostBuffer::<u32>::allocate(Extent3::new(3, 2, 2)).unwrap();
        assert_eq!(buffer.as_slice().len(), 12);
        assert!(buffer.as_slice().iter().all(|&v| v == 0));
        assert_eq!(buffer.layout().pitch, 12);
        assert_eq!(buffer.layout().slice_pitch, 24);
        assert_eq!(buffer.as_bytes().len(), buffer.layout().size_bytes());
    }

    #[test]
    fn test_default_is_empty() {
        let buffer = HostBuffer::<f32>::default();
        assert!(buffer.as_slice().is_empty());
        assert_eq!(buffer.layout().size_bytes(), 0);
    }

    #[test]
    fn test_upload_download_padded() {
        let mut buffer = HostBuffer::<u32>::allocate(Extent3::new(2, 2, 1)).unwrap();

        // Caller rows hold 2 values plus one padding value
        let src: Vec<u32> = vec![1, 2, 99, 3, 4, 99];
        buffer.upload(bytemuck::cast_slice(&src), 12).unwrap();
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);

        let mut dst = vec![0u32; 6];
        buffer
            .download(bytemuck::cast_slice_mut(&mut dst), 12)
            .unwrap();
        assert_eq!(dst, vec![1, 2, 0, 3, 4, 0]);
    }

    #[test]
    fn test_download_reports_short_destination() {
        let buffer = HostBuffer::<u32>::allocate(Extent3::new(2, 2, 2)).unwrap();
        let mut dst = vec![0u8; 8];
        let err = buffer.download(&mut dst, 8).unwrap_err();
        assert!(matches!(err, MemoryError::BufferTooSmall { .. }));
    }
}
