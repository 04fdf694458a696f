//! Histogram-based TV depth map fusion on a dense voxel grid.
//!
//! The grid accumulates, for every voxel, a histogram of signed distances
//! observed from many depth maps. An outer primal-dual solver then fuses the
//! histograms into a smooth signed distance field using the operators
//! exposed here.
//!
//! # Architecture
//!
//! The fusion is split into phases, each one touching every voxel once:
//! - Accumulation: [`FusionGrid::update_hist`] per depth observation
//! - Dual step: [`FusionGrid::grad_v_fwd`] and [`project_unit_ball`]
//! - Primal step: [`FusionGrid::div_p_bwd`] and [`FusionGrid::prox_hist`]
//!
//! Phases that read neighboring voxels must start only after the previous
//! phase finished writing the whole grid. The [`parallel`] helpers run one
//! phase at a time on rayon and return only when every voxel is done.
//!
//! # Usage
//!
//! ```ignore
//! use nalgebra::Vector3;
//! use tv_fusion::FusionGrid5;
//!
//! let mut grid = FusionGrid5::with_corners(
//!     128, 128, 128,
//!     Vector3::new(-1.0, -1.0, -1.0),
//!     Vector3::new(1.0, 1.0, 1.0),
//! )?;
//!
//! // One vote per visible voxel and depth map
//! grid.update_hist(x, y, z, voxel_depth, observed_depth, 0.1);
//!
//! // Inside the solver loop
//! let u = grid.prox_hist(u_bar, x, y, z, tau, lambda);
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod histogram;
pub mod parallel;
pub mod test_utils;
pub mod voxel;
pub mod volume;

pub use config::FusionGridConfig;
pub use error::FusionError;
pub use grid::operators::project_unit_ball;
pub use grid::{
    FusionGrid, FusionGrid10, FusionGrid2, FusionGrid3, FusionGrid4, FusionGrid5, FusionGrid6,
    FusionGrid7, FusionGrid8, FusionGrid9,
};
pub use histogram::{BinParams, Histogram, SortedSamples};
pub use voxel::Voxel;
pub use volume::BoundingVolume;

#[cfg(feature = "cuda")]
pub use grid::{
    DeviceFusionGrid10, DeviceFusionGrid2, DeviceFusionGrid3, DeviceFusionGrid4,
    DeviceFusionGrid5, DeviceFusionGrid6, DeviceFusionGrid7, DeviceFusionGrid8,
    DeviceFusionGrid9,
};

// Memory layer, re-exported for storage selection and error matching
pub use fusion_memory::{
    Extent3, HostAccess, HostBuffer, MemoryError, PitchedLayout, PitchedStorage, StorageMode,
};

#[cfg(feature = "cuda")]
pub use fusion_memory::DeviceBuffer;
