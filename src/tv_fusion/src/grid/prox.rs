//! Proximal operator of the histogram data term.
//!
//! The data term of voxel `(x, y, z)` is piecewise linear in `u` with kinks
//! at the bin centers, weighted by the histogram counts. Its proximal map
//! has a closed form: the median of `u` and the `B` shifted values
//!
//! ```text
//! p_i = u + tau * lambda * W_i,    W_i = -(h_1 + .. + h_i) + (h_{i+1} + .. + h_B)
//! ```
//!
//! Only these `B + 1` values enter the median. Bin centers are not added
//! to the sample set.

use fusion_memory::HostAccess;

use super::FusionGrid;
use crate::histogram::SortedSamples;
use crate::voxel::Voxel;

impl<const B: usize, S: HostAccess<Voxel<B>>> FusionGrid<B, S> {
    /// Net vote weight `W_i` of voxel `(x, y, z)` for level `i` in `1..=B`.
    ///
    /// Positive when more votes fall beyond level `i` than at or before it.
    pub fn wi(&self, i: usize, x: usize, y: usize, z: usize) -> i64 {
        self.h(x, y, z).weight(i)
    }

    /// Candidate value `p_i = u + tau * lambda * W_i`.
    #[allow(clippy::too_many_arguments)]
    pub fn pi(
        &self,
        u: f32,
        i: usize,
        x: usize,
        y: usize,
        z: usize,
        tau: f32,
        lambda: f32,
    ) -> f32 {
        shifted(u, tau, lambda, self.wi(i, x, y, z))
    }

    /// Proximal map of the histogram data term at `(x, y, z)`.
    ///
    /// Returns the median of `{u, p_1, .., p_B}`. With an even number of
    /// candidates the two central values are averaged.
    pub fn prox_hist(&self, u: f32, x: usize, y: usize, z: usize, tau: f32, lambda: f32) -> f32 {
        let weights = self.h(x, y, z).weights();

        let mut samples = SortedSamples::<B>::new();
        samples.insert(u);
        for w in weights {
            samples.insert(shifted(u, tau, lambda, w));
        }

        samples.median().unwrap_or(u)
    }
}

#[inline]
fn shifted(u: f32, tau: f32, lambda: f32, weight: i64) -> f32 {
    (u as f64 + tau as f64 * lambda as f64 * weight as f64) as f32
}
