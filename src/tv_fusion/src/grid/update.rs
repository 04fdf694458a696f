//! Histogram accumulation from depth observations.

use fusion_memory::HostAccess;

use super::FusionGrid;
use crate::voxel::Voxel;

impl<const B: usize, S: HostAccess<Voxel<B>>> FusionGrid<B, S> {
    /// Add one depth observation to the histogram of voxel `(x, y, z)`.
    ///
    /// `voxdepth` is the depth of the voxel center in the camera frame and
    /// `depth` the depth map value at its projection. The signed distance
    /// `voxdepth - depth` is classified against `threshold` as described in
    /// [`Histogram::vote`](crate::Histogram::vote).
    ///
    /// Returns the histogram counter (`1..=B`) that received the vote.
    #[inline]
    pub fn update_hist(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        voxdepth: f32,
        depth: f32,
        threshold: f32,
    ) -> usize {
        let sd = voxdepth - depth;
        self.h_mut(x, y, z).vote(sd, threshold)
    }
}
