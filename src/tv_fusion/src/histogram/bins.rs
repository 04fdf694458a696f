//! Histogram bin centers.

/// Bin centers for a `B`-bin histogram, normalized to `[-1, 1]`.
///
/// Index 0 is the occluded sentinel at `-1` and index `B - 1` the empty
/// sentinel at `1`. Interior bin `i` is centered at `2 (i - 1) / (B - 3) - 1`,
/// so the interior bins span `[-1, 1]` with spacing [`BinParams::bin_step`].
///
/// With three bins that formula is `0 / 0`. The single interior center is
/// set to `0` instead of NaN so the table stays ordered; the step is still
/// reported as infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinParams<const B: usize> {
    centers: [f64; B],
    step: f64,
}

impl<const B: usize> Default for BinParams<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const B: usize> BinParams<B> {
    pub fn new() -> Self {
        let mut centers = [0.0; B];
        centers[0] = -1.0;
        centers[B - 1] = 1.0;

        let interior_span = B as f64 - 3.0;
        for (i, center) in centers.iter_mut().enumerate().take(B - 1).skip(1) {
            // 0 / 0 for three bins, pinned to the middle
            *center = if B == 3 {
                0.0
            } else {
                2.0 * (i - 1) as f64 / interior_span - 1.0
            };
        }

        Self {
            centers,
            step: 2.0 / interior_span,
        }
    }

    /// Center of bin `index` (0-based), or `0` past the last bin.
    pub fn bin_center(&self, index: usize) -> f64 {
        self.centers.get(index).copied().unwrap_or(0.0)
    }

    /// Distance between neighboring interior bin centers, `2 / (B - 3)`.
    ///
    /// Infinite for three bins and negative for two; neither case has
    /// evenly spaced interior bins.
    pub fn bin_step(&self) -> f64 {
        self.step
    }

    pub fn centers(&self) -> &[f64; B] {
        &self.centers
    }
}
