//! Synthetic fields and observations for testing fusion code.
//!
//! Provides deterministic generators with known ground truth, so operator
//! and solver tests can check results without real depth maps.

use fusion_memory::HostAccess;
use nalgebra::Vector3;

use crate::grid::FusionGrid;
use crate::voxel::Voxel;

/// Set `u` of every voxel from a function of its index.
pub fn fill_primal<const B: usize, S: HostAccess<Voxel<B>>>(
    grid: &mut FusionGrid<B, S>,
    mut f: impl FnMut(usize, usize, usize) -> f32,
) {
    let [w, h, d] = grid.dims();
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                *grid.u_mut(x, y, z) = f(x, y, z);
            }
        }
    }
}

/// Set `p` of every voxel from a function of its index.
pub fn fill_dual<const B: usize, S: HostAccess<Voxel<B>>>(
    grid: &mut FusionGrid<B, S>,
    mut f: impl FnMut(usize, usize, usize) -> Vector3<f32>,
) {
    let [w, h, d] = grid.dims();
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                *grid.p_mut(x, y, z) = f(x, y, z);
            }
        }
    }
}

/// Fill every field with a deterministic, non-repeating pattern.
///
/// Different seeds give different voxel contents; histograms receive a few
/// votes each.
pub fn fill_pattern<const B: usize, S: HostAccess<Voxel<B>>>(
    grid: &mut FusionGrid<B, S>,
    seed: u32,
) {
    let phase = seed as f32 * 0.618;
    for (i, voxel) in grid.voxels_mut().iter_mut().enumerate() {
        let t = i as f32 + phase;
        voxel.u = (0.37 * t).sin();
        voxel.v = (0.53 * t).cos();
        voxel.p = Vector3::new((0.11 * t).sin(), (0.23 * t).cos(), (0.71 * t).sin());
        for j in 0..(i + seed as usize) % 4 {
            voxel.h.increment(1 + (i + j) % B);
        }
    }
}

/// Vote for a planar surface `z = surface_z` seen by a camera looking
/// along `+z` from below the grid.
///
/// The voxel depth is the world `z` of its center, so voxels behind the
/// plane vote empty and voxels in front vote occluded, as in the signed
/// distance convention of the histogram. Returns the number of votes cast.
pub fn observe_plane<const B: usize, S: HostAccess<Voxel<B>>>(
    grid: &mut FusionGrid<B, S>,
    surface_z: f32,
    threshold: f32,
) -> usize {
    let [w, h, d] = grid.dims();
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                let voxdepth = grid.world_coords(x, y, z).z;
                grid.update_hist(x, y, z, voxdepth, surface_z, threshold);
            }
        }
    }
    w * h * d
}
