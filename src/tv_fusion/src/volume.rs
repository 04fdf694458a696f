//! Axis-aligned bounding volume in world coordinates.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box spanned by two opposite corners.
///
/// Corner `a` is the origin of the voxel grid: voxel `(0, 0, 0)` sits next to
/// it and the grid extends towards `b`. The corners need not be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub a: Vector3<f32>,
    pub b: Vector3<f32>,
}

impl BoundingVolume {
    pub fn new(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        Self { a, b }
    }

    /// The box `[0, 1]^3`.
    pub fn unit_cube() -> Self {
        Self::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0))
    }

    /// Signed extent `b - a`.
    pub fn size(&self) -> Vector3<f32> {
        self.b - self.a
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.a + self.b) * 0.5
    }
}
