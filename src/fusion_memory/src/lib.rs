//! Pitched voxel memory for host and device storage.
//!
//! This crate is the memory-management layer underneath the fusion grid:
//! - Pitched 3D allocation (row pitch + slice pitch in bytes)
//! - Host-to-host, host-to-device and device-to-host strided copies
//! - Storage mode binding through the [`PitchedStorage`] trait
//!
//! Device buffers are CUDA allocations made through `cudarc` and are only
//! available with the `cuda` feature.
//!
//! # Example
//!
//! ```ignore
//! use fusion_memory::{Extent3, HostBuffer, PitchedStorage};
//!
//! let mut buffer = HostBuffer::<f32>::allocate(Extent3::new(4, 4, 4))?;
//! buffer.upload(bytemuck::cast_slice(&values), 4 * 4)?;
//! ```

pub mod error;
pub mod host;
pub mod layout;

#[cfg(feature = "cuda")]
pub mod device;

pub use error::MemoryError;
pub use host::HostBuffer;
pub use layout::{copy_pitched, Extent3, PitchedLayout};

#[cfg(feature = "cuda")]
pub use device::DeviceBuffer;

use bytemuck::Pod;

/// Where a pitched buffer lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageMode {
    /// Ordinary host memory.
    Host,
    /// GPU global memory.
    Device,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Host => write!(f, "host"),
            StorageMode::Device => write!(f, "device"),
        }
    }
}

/// A pitched 3D buffer of `T` elements.
///
/// Implementations choose their own row pitch at allocation time. Transfers
/// always go through host memory on the caller side, so `upload` is either a
/// host-to-host or a host-to-device copy depending on [`Self::MODE`].
pub trait PitchedStorage<T: Pod>: Sized {
    /// Storage mode, fixed per implementation.
    const MODE: StorageMode;

    /// Allocate zero-initialized storage for `extent` elements.
    fn allocate(extent: Extent3) -> Result<Self, MemoryError>;

    /// Physical layout chosen at allocation.
    fn layout(&self) -> &PitchedLayout;

    /// Copy a caller buffer with row pitch `src_pitch` (bytes) into this storage.
    fn upload(&mut self, src: &[u8], src_pitch: usize) -> Result<(), MemoryError>;

    /// Copy this storage into a caller buffer with row pitch `dst_pitch` (bytes).
    fn download(&self, dst: &mut [u8], dst_pitch: usize) -> Result<(), MemoryError>;
}

/// Storage whose elements are directly addressable from host code.
///
/// Elements are laid out densely: element `(x, y, z)` lives at
/// `x + y * width + z * width * height`.
pub trait HostAccess<T: Pod>: PitchedStorage<T> {
    fn as_slice(&self) -> &[T];

    fn as_mut_slice(&mut self) -> &mut [T];
}
