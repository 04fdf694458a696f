//! Data-parallel phases over all voxels.
//!
//! Each helper runs one phase of the fusion on the rayon thread pool and
//! returns only after every voxel has been processed, which is the barrier
//! required before a following phase reads neighboring voxels.
//!
//! Phases come in two shapes:
//! - read phases ([`FusionGrid::par_map_voxels`]) may read any voxel, including
//!   neighbors, and produce one value per voxel;
//! - write phases ([`FusionGrid::par_for_each_voxel_mut`]) see only their own
//!   voxel, so they cannot observe partially updated neighbors.
//!
//! # Example
//!
//! ```ignore
//! // Dual ascent: read gradients, then write p
//! let grads = grid.par_map_voxels(|g, [x, y, z]| g.grad_v_fwd(x, y, z));
//! grid.par_for_each_voxel_mut(|i, _, voxel| {
//!     voxel.p = project_unit_ball(voxel.p + sigma * grads[i]);
//! });
//! ```

use fusion_memory::HostAccess;
use rayon::prelude::*;

use crate::grid::FusionGrid;
use crate::voxel::Voxel;

/// Voxel index triple of linear index `i` in a `width x height` slice layout.
#[inline]
fn coords_of(i: usize, width: usize, height: usize) -> [usize; 3] {
    let slice = width * height;
    [i % width, (i % slice) / width, i / slice]
}

impl<const B: usize, S> FusionGrid<B, S>
where
    S: HostAccess<Voxel<B>> + Send + Sync,
{
    /// Evaluate `f` for every voxel in parallel.
    ///
    /// Results are returned in linear voxel order.
    pub fn par_map_voxels<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&Self, [usize; 3]) -> T + Sync,
    {
        let [w, h, _] = self.dims();
        (0..self.elements())
            .into_par_iter()
            .map(|i| f(self, coords_of(i, w, h)))
            .collect()
    }

    /// Run `f` on every voxel in parallel with exclusive access to it.
    ///
    /// `f` receives the linear index, the index triple and the voxel.
    pub fn par_for_each_voxel_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, [usize; 3], &mut Voxel<B>) + Sync + Send,
    {
        let [w, h, _] = self.dims();
        self.voxels_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, voxel)| f(i, coords_of(i, w, h), voxel));
    }

    /// Add one depth observation to every voxel in parallel.
    ///
    /// `depths` maps a voxel to `(voxdepth, depth)` or `None` when the voxel
    /// is not seen by the observation. Returns the number of votes cast.
    pub fn par_update_hist<F>(&mut self, threshold: f32, depths: F) -> usize
    where
        F: Fn([usize; 3]) -> Option<(f32, f32)> + Sync + Send,
    {
        let [w, h, _] = self.dims();
        self.voxels_mut()
            .par_iter_mut()
            .enumerate()
            .filter_map(|(i, voxel)| {
                let (voxdepth, depth) = depths(coords_of(i, w, h))?;
                voxel.h.vote(voxdepth - depth, threshold);
                Some(())
            })
            .count()
    }
}
