//! Dense voxel grid for histogram fusion.
//!
//! The grid owns `width * height * depth` [`Voxel`] records. Voxel
//! `(x, y, z)` is stored at linear index `x + y * width + z * width * height`.
//!
//! Storage is chosen through the `S` type parameter:
//! - [`HostBuffer`] (default): voxels are addressable from host code, so all
//!   accessors and operators are available.
//! - `DeviceBuffer` (feature `cuda`): voxels live in GPU memory and only
//!   metadata queries and transfers are available on the host side.

pub mod operators;
pub mod prox;
pub mod transfer;
pub mod update;

use fusion_memory::{Extent3, HostAccess, HostBuffer, PitchedStorage, StorageMode};
use nalgebra::Vector3;
use tracing::debug;

use crate::error::FusionError;
use crate::histogram::{BinParams, Histogram};
use crate::voxel::Voxel;
use crate::volume::BoundingVolume;

/// Voxel grid with `B` histogram bins per voxel.
pub struct FusionGrid<const B: usize, S = HostBuffer<Voxel<B>>> {
    storage: S,
    bins: BinParams<B>,
    volume: BoundingVolume,
}

pub type FusionGrid2 = FusionGrid<2>;
pub type FusionGrid3 = FusionGrid<3>;
pub type FusionGrid4 = FusionGrid<4>;
pub type FusionGrid5 = FusionGrid<5>;
pub type FusionGrid6 = FusionGrid<6>;
pub type FusionGrid7 = FusionGrid<7>;
pub type FusionGrid8 = FusionGrid<8>;
pub type FusionGrid9 = FusionGrid<9>;
pub type FusionGrid10 = FusionGrid<10>;

#[cfg(feature = "cuda")]
mod device_aliases {
    use super::FusionGrid;
    use crate::voxel::Voxel;
    use fusion_memory::DeviceBuffer;

    pub type DeviceFusionGrid2 = FusionGrid<2, DeviceBuffer<Voxel<2>>>;
    pub type DeviceFusionGrid3 = FusionGrid<3, DeviceBuffer<Voxel<3>>>;
    pub type DeviceFusionGrid4 = FusionGrid<4, DeviceBuffer<Voxel<4>>>;
    pub type DeviceFusionGrid5 = FusionGrid<5, DeviceBuffer<Voxel<5>>>;
    pub type DeviceFusionGrid6 = FusionGrid<6, DeviceBuffer<Voxel<6>>>;
    pub type DeviceFusionGrid7 = FusionGrid<7, DeviceBuffer<Voxel<7>>>;
    pub type DeviceFusionGrid8 = FusionGrid<8, DeviceBuffer<Voxel<8>>>;
    pub type DeviceFusionGrid9 = FusionGrid<9, DeviceBuffer<Voxel<9>>>;
    pub type DeviceFusionGrid10 = FusionGrid<10, DeviceBuffer<Voxel<10>>>;
}

#[cfg(feature = "cuda")]
pub use device_aliases::*;

impl<const B: usize, S: PitchedStorage<Voxel<B>> + Default> Default for FusionGrid<B, S> {
    /// Zero-sized grid without storage.
    fn default() -> Self {
        Self {
            storage: S::default(),
            bins: BinParams::new(),
            volume: BoundingVolume::default(),
        }
    }
}

impl<const B: usize, S: PitchedStorage<Voxel<B>>> std::fmt::Debug for FusionGrid<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionGrid")
            .field("bins", &B)
            .field("mode", &S::MODE)
            .field("dims", &self.dims())
            .field("pitch", &self.pitch())
            .field("volume", &self.volume)
            .finish()
    }
}

impl<const B: usize, S: PitchedStorage<Voxel<B>>> FusionGrid<B, S> {
    /// Allocate a grid with a degenerate bounding volume at the origin.
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self, FusionError> {
        Self::with_volume(width, height, depth, BoundingVolume::default())
    }

    /// Allocate a grid spanning the box with opposite corners `a` and `b`.
    pub fn with_corners(
        width: usize,
        height: usize,
        depth: usize,
        a: Vector3<f32>,
        b: Vector3<f32>,
    ) -> Result<Self, FusionError> {
        Self::with_volume(width, height, depth, BoundingVolume::new(a, b))
    }

    /// Allocate a grid spanning `volume`.
    pub fn with_volume(
        width: usize,
        height: usize,
        depth: usize,
        volume: BoundingVolume,
    ) -> Result<Self, FusionError> {
        let storage = S::allocate(Extent3::new(width, height, depth))?;

        debug!(
            bins = B,
            mode = %S::MODE,
            width,
            height,
            depth,
            bytes = storage.layout().size_bytes(),
            "created fusion grid"
        );

        Ok(Self {
            storage,
            bins: BinParams::new(),
            volume,
        })
    }

    pub fn width(&self) -> usize {
        self.storage.layout().extent.width
    }

    pub fn height(&self) -> usize {
        self.storage.layout().extent.height
    }

    pub fn depth(&self) -> usize {
        self.storage.layout().extent.depth
    }

    /// Grid dimensions `[width, height, depth]`.
    pub fn dims(&self) -> [usize; 3] {
        [self.width(), self.height(), self.depth()]
    }

    /// Row pitch in bytes, as chosen by the storage.
    pub fn pitch(&self) -> usize {
        self.storage.layout().pitch
    }

    /// Slice pitch in bytes.
    pub fn slice_pitch(&self) -> usize {
        self.storage.layout().slice_pitch
    }

    /// Number of histogram bins per voxel.
    pub fn bins(&self) -> usize {
        B
    }

    pub fn storage_mode(&self) -> StorageMode {
        S::MODE
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    pub fn set_volume(&mut self, volume: BoundingVolume) {
        self.volume = volume;
    }

    pub fn set_volume_corners(&mut self, a: Vector3<f32>, b: Vector3<f32>) {
        self.volume = BoundingVolume::new(a, b);
    }

    /// Number of voxels.
    pub fn elements(&self) -> usize {
        self.width() * self.height() * self.depth()
    }

    /// Allocated size in bytes, `slice_pitch * depth`.
    pub fn size_bytes(&self) -> usize {
        self.slice_pitch() * self.depth()
    }

    pub fn size_kbytes(&self) -> f64 {
        self.size_bytes() as f64 / 1024.0
    }

    pub fn size_mbytes(&self) -> f64 {
        self.size_kbytes() / 1024.0
    }

    pub fn size_gbytes(&self) -> f64 {
        self.size_mbytes() / 1024.0
    }

    /// World position of the center of voxel `(x, y, z)`.
    pub fn world_coords(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        let [w, h, d] = self.dims();
        let rel = Vector3::new(
            ((x as f64 + 0.5) / w as f64) as f32,
            ((y as f64 + 0.5) / h as f64) as f32,
            ((z as f64 + 0.5) / d as f64) as f32,
        );
        self.volume.a + self.volume.size().component_mul(&rel)
    }

    /// Center of histogram bin `index` (0-based) in normalized units.
    pub fn bin_center(&self, index: usize) -> f64 {
        self.bins.bin_center(index)
    }

    /// Spacing of the interior bin centers.
    pub fn bin_step(&self) -> f64 {
        self.bins.bin_step()
    }

    pub fn bin_params(&self) -> &BinParams<B> {
        &self.bins
    }

    /// Linear index of `(x, y, z)`. Not range checked.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let [w, h, _] = self.dims();
        x + y * w + z * w * h
    }

    /// Range-checked linear index.
    pub fn checked_index(&self, x: usize, y: usize, z: usize) -> Result<usize, FusionError> {
        let [width, height, depth] = self.dims();
        if x < width && y < height && z < depth {
            Ok(self.index(x, y, z))
        } else {
            Err(FusionError::OutOfBounds {
                x,
                y,
                z,
                width,
                height,
                depth,
            })
        }
    }
}

/// Per-voxel accessors.
///
/// Coordinates are not validated against the grid dimensions: an index
/// outside one axis aliases a different voxel, and one past the end of the
/// buffer panics. Use [`FusionGrid::try_voxel`] when the caller cannot
/// guarantee the range.
impl<const B: usize, S: HostAccess<Voxel<B>>> FusionGrid<B, S> {
    /// All voxels in linear order.
    pub fn voxels(&self) -> &[Voxel<B>] {
        self.storage.as_slice()
    }

    pub fn voxels_mut(&mut self) -> &mut [Voxel<B>] {
        self.storage.as_mut_slice()
    }

    #[inline]
    pub fn voxel(&self, x: usize, y: usize, z: usize) -> &Voxel<B> {
        let idx = self.index(x, y, z);
        &self.storage.as_slice()[idx]
    }

    #[inline]
    pub fn voxel_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Voxel<B> {
        let idx = self.index(x, y, z);
        &mut self.storage.as_mut_slice()[idx]
    }

    pub fn try_voxel(&self, x: usize, y: usize, z: usize) -> Result<&Voxel<B>, FusionError> {
        let idx = self.checked_index(x, y, z)?;
        Ok(&self.storage.as_slice()[idx])
    }

    pub fn try_voxel_mut(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<&mut Voxel<B>, FusionError> {
        let idx = self.checked_index(x, y, z)?;
        Ok(&mut self.storage.as_mut_slice()[idx])
    }

    /// Primal variable `u`.
    #[inline]
    pub fn u(&self, x: usize, y: usize, z: usize) -> f32 {
        self.voxel(x, y, z).u
    }

    #[inline]
    pub fn u_mut(&mut self, x: usize, y: usize, z: usize) -> &mut f32 {
        &mut self.voxel_mut(x, y, z).u
    }

    /// Helper variable `v`.
    #[inline]
    pub fn v(&self, x: usize, y: usize, z: usize) -> f32 {
        self.voxel(x, y, z).v
    }

    #[inline]
    pub fn v_mut(&mut self, x: usize, y: usize, z: usize) -> &mut f32 {
        &mut self.voxel_mut(x, y, z).v
    }

    /// Dual variable `p`.
    #[inline]
    pub fn p(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        self.voxel(x, y, z).p
    }

    #[inline]
    pub fn p_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Vector3<f32> {
        &mut self.voxel_mut(x, y, z).p
    }

    #[inline]
    pub fn h(&self, x: usize, y: usize, z: usize) -> &Histogram<B> {
        &self.voxel(x, y, z).h
    }

    #[inline]
    pub fn h_mut(&mut self, x: usize, y: usize, z: usize) -> &mut Histogram<B> {
        &mut self.voxel_mut(x, y, z).h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_grid_is_empty() {
        let grid = FusionGrid5::default();
        assert_eq!(grid.dims(), [0, 0, 0]);
        assert_eq!(grid.elements(), 0);
        assert_eq!(grid.size_bytes(), 0);
        assert!(grid.voxels().is_empty());
        assert_eq!(grid.storage_mode(), StorageMode::Host);
    }

    #[test]
    fn test_allocation_is_zeroed() {
        let grid = FusionGrid5::new(3, 4, 5).unwrap();
        assert_eq!(grid.dims(), [3, 4, 5]);
        assert_eq!(grid.elements(), 60);
        assert_eq!(grid.voxels().len(), 60);
        assert!(grid.voxels().iter().all(|v| *v == Voxel::default()));
    }

    #[test]
    fn test_size_queries() {
        let grid = FusionGrid5::new(4, 4, 4).unwrap();
        let voxel_bytes = std::mem::size_of::<Voxel<5>>();

        assert_eq!(grid.bins(), 5);
        assert_eq!(grid.pitch(), 4 * voxel_bytes);
        assert_eq!(grid.slice_pitch(), 4 * grid.pitch());
        assert_eq!(grid.size_bytes(), grid.slice_pitch() * 4);
        assert_eq!(grid.size_bytes(), 2560);
        assert_relative_eq!(grid.size_kbytes(), 2.5);
        assert_relative_eq!(grid.size_mbytes(), 2.5 / 1024.0);
        assert_relative_eq!(grid.size_gbytes(), 2.5 / 1024.0 / 1024.0);
    }

    #[test]
    fn test_linear_index() {
        let grid = FusionGrid3::new(4, 3, 2).unwrap();
        assert_eq!(grid.index(0, 0, 0), 0);
        assert_eq!(grid.index(3, 0, 0), 3);
        assert_eq!(grid.index(0, 1, 0), 4);
        assert_eq!(grid.index(0, 0, 1), 12);
        assert_eq!(grid.index(3, 2, 1), 23);
    }

    #[test]
    fn test_accessors_write_through() {
        let mut grid = FusionGrid4::new(3, 3, 3).unwrap();
        *grid.u_mut(1, 2, 0) = 0.5;
        *grid.v_mut(1, 2, 0) = -0.25;
        *grid.p_mut(1, 2, 0) = Vector3::new(1.0, 2.0, 3.0);
        grid.h_mut(1, 2, 0).increment(4);

        let voxel = grid.voxel(1, 2, 0);
        assert_eq!(voxel.u, 0.5);
        assert_eq!(voxel.v, -0.25);
        assert_eq!(voxel.p, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(voxel.h.last(), 1);

        assert_eq!(grid.voxels()[grid.index(1, 2, 0)].u, 0.5);
        assert_eq!(grid.u(0, 0, 0), 0.0);
    }

    #[test]
    fn test_checked_access() {
        let mut grid = FusionGrid4::new(2, 3, 4).unwrap();
        assert!(grid.try_voxel(1, 2, 3).is_ok());
        assert_eq!(
            grid.try_voxel(2, 0, 0).unwrap_err(),
            FusionError::OutOfBounds {
                x: 2,
                y: 0,
                z: 0,
                width: 2,
                height: 3,
                depth: 4
            }
        );
        assert!(grid.try_voxel_mut(0, 3, 0).is_err());
        assert!(grid.try_voxel_mut(0, 0, 4).is_err());

        grid.try_voxel_mut(1, 1, 1).unwrap().u = 2.0;
        assert_eq!(grid.u(1, 1, 1), 2.0);
    }

    #[test]
    fn test_world_coords_unit_cube() {
        let (w, h, d) = (4, 5, 8);
        let grid = FusionGrid5::with_volume(w, h, d, BoundingVolume::unit_cube()).unwrap();

        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let p = grid.world_coords(x, y, z);
                    assert_relative_eq!(p.x, (x as f32 + 0.5) / w as f32, epsilon = 1e-6);
                    assert_relative_eq!(p.y, (y as f32 + 0.5) / h as f32, epsilon = 1e-6);
                    assert_relative_eq!(p.z, (z as f32 + 0.5) / d as f32, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_world_coords_offset_volume() {
        let grid = FusionGrid3::with_corners(
            2,
            2,
            2,
            Vector3::new(-1.0, 10.0, 0.0),
            Vector3::new(1.0, 14.0, -2.0),
        )
        .unwrap();

        assert_relative_eq!(grid.world_coords(0, 0, 0), Vector3::new(-0.5, 11.0, -0.5));
        assert_relative_eq!(grid.world_coords(1, 1, 1), Vector3::new(0.5, 13.0, -1.5));
    }

    #[test]
    fn test_volume_setters() {
        let mut grid = FusionGrid2::new(2, 2, 2).unwrap();
        assert_eq!(*grid.volume(), BoundingVolume::default());

        grid.set_volume(BoundingVolume::unit_cube());
        assert_eq!(*grid.volume(), BoundingVolume::unit_cube());

        grid.set_volume_corners(Vector3::new(1.0, 1.0, 1.0), Vector3::new(3.0, 3.0, 3.0));
        assert_relative_eq!(grid.volume().size(), Vector3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(grid.world_coords(0, 0, 0), Vector3::new(1.5, 1.5, 1.5));
    }

    #[test]
    fn test_bin_queries() {
        let grid = FusionGrid7::new(1, 1, 1).unwrap();
        assert_eq!(grid.bin_center(0), -1.0);
        assert_eq!(grid.bin_center(6), 1.0);
        assert_eq!(grid.bin_center(7), 0.0);
        assert_relative_eq!(grid.bin_step(), 0.5);
        assert_relative_eq!(grid.bin_center(2), -0.5, epsilon = 1e-12);
        assert_relative_eq!(grid.bin_center(3), 0.0, epsilon = 1e-12);
    }
}
