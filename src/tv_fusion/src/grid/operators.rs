//! Finite difference operators and the dual projection.
//!
//! Gradients use forward differences with a zero component at the far
//! boundary of each axis. The divergence uses backward differences and
//! treats the dual field as zero outside the grid, which makes it the
//! negative adjoint of the gradient.

use fusion_memory::HostAccess;
use nalgebra::Vector3;

use super::FusionGrid;
use crate::voxel::Voxel;

/// Project `p` onto the Euclidean unit ball, `p / max(1, |p|)`.
///
/// Used as the proximal step of the dual variable in the TV term.
#[inline]
pub fn project_unit_ball(p: Vector3<f32>) -> Vector3<f32> {
    p / p.norm().max(1.0)
}

impl<const B: usize, S: HostAccess<Voxel<B>>> FusionGrid<B, S> {
    /// Forward-difference gradient of `u` at `(x, y, z)`.
    pub fn grad_u_fwd(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        self.grad_fwd(x, y, z, |voxel| voxel.u)
    }

    /// Forward-difference gradient of `v` at `(x, y, z)`.
    pub fn grad_v_fwd(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        self.grad_fwd(x, y, z, |voxel| voxel.v)
    }

    #[inline]
    fn grad_fwd(
        &self,
        x: usize,
        y: usize,
        z: usize,
        field: impl Fn(&Voxel<B>) -> f32,
    ) -> Vector3<f32> {
        let [w, h, d] = self.dims();
        let center = field(self.voxel(x, y, z));
        let mut result = Vector3::zeros();
        if x + 1 < w {
            result.x = field(self.voxel(x + 1, y, z)) - center;
        }
        if y + 1 < h {
            result.y = field(self.voxel(x, y + 1, z)) - center;
        }
        if z + 1 < d {
            result.z = field(self.voxel(x, y, z + 1)) - center;
        }
        result
    }

    /// Backward-difference divergence of `p` at `(x, y, z)`.
    pub fn div_p_bwd(&self, x: usize, y: usize, z: usize) -> f32 {
        let p = self.p(x, y, z);
        let mut result = p.x + p.y + p.z;
        if x > 0 {
            result -= self.p(x - 1, y, z).x;
        }
        if y > 0 {
            result -= self.p(x, y - 1, z).y;
        }
        if z > 0 {
            result -= self.p(x, y, z - 1).z;
        }
        result
    }

    /// Replace `p` at `(x, y, z)` by its projection onto the unit ball.
    pub fn project_p(&mut self, x: usize, y: usize, z: usize) {
        let p = self.p_mut(x, y, z);
        *p = project_unit_ball(*p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{FusionGrid3, FusionGrid5};
    use crate::test_utils::{fill_dual, fill_primal};
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use rand_distr::Normal;

    #[test]
    fn test_gradient_of_linear_field() {
        let mut grid = FusionGrid3::new(4, 5, 6).unwrap();
        fill_primal(&mut grid, |x, y, z| x as f32 + 2.0 * y as f32 - 0.5 * z as f32);

        assert_relative_eq!(grid.grad_u_fwd(1, 1, 1), Vector3::new(1.0, 2.0, -0.5));
        assert_relative_eq!(grid.grad_u_fwd(0, 0, 0), Vector3::new(1.0, 2.0, -0.5));
        assert_relative_eq!(grid.grad_v_fwd(0, 0, 0), Vector3::zeros());
    }

    #[test]
    fn test_gradient_zero_at_last_index() {
        let (w, h, d) = (3, 4, 5);
        let mut grid = FusionGrid3::new(w, h, d).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for voxel in grid.voxels_mut() {
            voxel.u = rng.gen_range(-1.0..1.0);
            voxel.v = rng.gen_range(-1.0..1.0);
        }

        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let gu = grid.grad_u_fwd(x, y, z);
                    let gv = grid.grad_v_fwd(x, y, z);
                    if x == w - 1 {
                        assert_eq!(gu.x, 0.0);
                        assert_eq!(gv.x, 0.0);
                    }
                    if y == h - 1 {
                        assert_eq!(gu.y, 0.0);
                        assert_eq!(gv.y, 0.0);
                    }
                    if z == d - 1 {
                        assert_eq!(gu.z, 0.0);
                        assert_eq!(gv.z, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_gradient_single_voxel() {
        let mut grid = FusionGrid3::new(1, 1, 1).unwrap();
        *grid.u_mut(0, 0, 0) = 42.0;
        assert_eq!(grid.grad_u_fwd(0, 0, 0), Vector3::zeros());
    }

    #[test]
    fn test_divergence_of_constant_field() {
        let (w, h, d) = (4, 3, 5);
        let mut grid = FusionGrid3::new(w, h, d).unwrap();
        let p = Vector3::new(1.0, 2.0, 3.0);
        fill_dual(&mut grid, |_, _, _| p);

        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    let mut expected = 0.0;
                    if x == 0 {
                        expected += p.x;
                    }
                    if y == 0 {
                        expected += p.y;
                    }
                    if z == 0 {
                        expected += p.z;
                    }
                    assert_relative_eq!(grid.div_p_bwd(x, y, z), expected);
                }
            }
        }

        assert_relative_eq!(grid.div_p_bwd(1, 1, 1), 0.0);
        assert_relative_eq!(grid.div_p_bwd(0, 0, 0), 6.0);
        assert_relative_eq!(grid.div_p_bwd(1, 0, 0), 5.0);
    }

    #[test]
    fn test_divergence_is_negative_adjoint_of_gradient() {
        // <grad u, p> = -<u, div p> with the boundary handling above
        let (w, h, d) = (5, 4, 3);
        let mut grid = FusionGrid5::new(w, h, d).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let dist = Normal::new(0.0, 1.0).unwrap();
        fill_primal(&mut grid, |_, _, _| dist.sample(&mut rng));
        // Components pointing out of the grid stay zero, as in the dual update
        fill_dual(&mut grid, |x, y, z| {
            let mut p: Vector3<f32> = Vector3::from_fn(|_, _| dist.sample(&mut rng));
            if x == w - 1 {
                p.x = 0.0;
            }
            if y == h - 1 {
                p.y = 0.0;
            }
            if z == d - 1 {
                p.z = 0.0;
            }
            p
        });

        let mut lhs = 0.0f64;
        let mut rhs = 0.0f64;
        for z in 0..d {
            for y in 0..h {
                for x in 0..w {
                    lhs += grid.grad_u_fwd(x, y, z).dot(&grid.p(x, y, z)) as f64;
                    rhs -= (grid.u(x, y, z) * grid.div_p_bwd(x, y, z)) as f64;
                }
            }
        }
        assert_relative_eq!(lhs, rhs, epsilon = 1e-3);
    }

    #[test]
    fn test_project_unit_ball_inside() {
        for p in [
            Vector3::zeros(),
            Vector3::new(0.5, -0.5, 0.5),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
        ] {
            assert_eq!(project_unit_ball(p), p);
        }
    }

    #[test]
    fn test_project_unit_ball_outside() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let p = Vector3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            if p.norm() <= 1.0 {
                continue;
            }
            let q = project_unit_ball(p);
            assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-6);
            // Direction is preserved
            assert_relative_eq!(q * p.norm(), p, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_project_is_euclidean_not_max_norm() {
        // Inside the max-norm unit ball but outside the Euclidean one
        let p = Vector3::new(1.0, 1.0, 1.0);
        let q = project_unit_ball(p);
        assert_relative_eq!(q, p / 3.0f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn test_project_p_in_place() {
        let mut grid = FusionGrid3::new(2, 1, 1).unwrap();
        *grid.p_mut(1, 0, 0) = Vector3::new(3.0, 0.0, 4.0);
        grid.project_p(1, 0, 0);
        assert_relative_eq!(grid.p(1, 0, 0), Vector3::new(0.6, 0.0, 0.8), epsilon = 1e-6);
    }
}
