//! Per-voxel signed distance histograms.
//!
//! Counter 1 collects occluded votes and counter `B` empty votes. Signed
//! distances inside the truncation band are spread over the histogram by
//! their rounded position in the band, used as a 0-based index:
//!
//! ```text
//! counter:   1          1 .. B-2              B
//!            occluded   |sd| < threshold      empty
//! ```
//!
//! Counters are numbered from 1 to match the weight formula used by the
//! proximal operator. They only ever grow.

pub mod bins;
pub mod sorted;

pub use bins::BinParams;
pub use sorted::SortedSamples;

use bytemuck::{Pod, Zeroable};

/// Vote counters for one voxel.
///
/// Counters saturate at `u32::MAX` instead of wrapping, so they never
/// decrease.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Histogram<const B: usize> {
    counts: [u32; B],
}

// SAFETY: a transparent wrapper around `[u32; B]`, no padding, every bit
// pattern is a valid histogram.
unsafe impl<const B: usize> Zeroable for Histogram<B> {}
unsafe impl<const B: usize> Pod for Histogram<B> {}

impl<const B: usize> Default for Histogram<B> {
    fn default() -> Self {
        Self { counts: [0; B] }
    }
}

impl<const B: usize> Histogram<B> {
    /// Number of bins, including both sentinels.
    pub const BINS: usize = B;

    pub fn from_counts(counts: [u32; B]) -> Self {
        Self { counts }
    }

    /// Counter `i`, numbered `1..=B`.
    #[inline]
    pub fn get(&self, i: usize) -> u32 {
        self.counts[i - 1]
    }

    /// Occluded sentinel (counter 1).
    #[inline]
    pub fn first(&self) -> u32 {
        self.counts[0]
    }

    /// Empty sentinel (counter `B`).
    #[inline]
    pub fn last(&self) -> u32 {
        self.counts[B - 1]
    }

    pub fn counts(&self) -> &[u32; B] {
        &self.counts
    }

    /// Total number of votes.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Add one vote to counter `i`, numbered `1..=B`.
    #[inline]
    pub fn increment(&mut self, i: usize) {
        let c = &mut self.counts[i - 1];
        *c = c.saturating_add(1);
    }

    /// Classify a signed distance and add one vote for it.
    ///
    /// `sd >= threshold` votes empty, `sd <= -threshold` votes occluded and
    /// anything in between votes for the 0-based bin
    /// `r = round((sd + threshold) / (2 * threshold) * (B - 3))`, which is
    /// counter `r + 1`. Rounding is half away from zero. The band maps onto
    /// counters `1..=B-2`, so votes just inside `-threshold` share counter 1
    /// with the occluded sentinel.
    ///
    /// With two bins the threshold is ignored and the vote is a pure
    /// inside/outside decision on the sign of `sd`.
    ///
    /// Returns the counter (`1..=B`) that received the vote.
    pub fn vote(&mut self, sd: f32, threshold: f32) -> usize {
        let threshold = if B == 2 { 0.0 } else { threshold };

        if sd >= threshold {
            self.increment(B);
            return B;
        }

        if sd <= -threshold {
            self.increment(1);
            return 1;
        }

        // Unreachable for two bins, where the band is empty
        let scaled = (sd + threshold) / (2.0 * threshold) * (B as f32 - 3.0);
        let counter = scaled.round() as usize + 1;
        self.increment(counter);
        counter
    }

    /// Net vote weight `W_i` for level `i` in `1..=B`.
    ///
    /// `W_i = -(h_1 + .. + h_i) + (h_{i+1} + .. + h_B)`
    pub fn weight(&self, i: usize) -> i64 {
        let (below, above) = self.counts.split_at(i);
        let below: i64 = below.iter().map(|&c| c as i64).sum();
        let above: i64 = above.iter().map(|&c| c as i64).sum();
        above - below
    }

    /// All weights `W_1..W_B` in one pass.
    pub fn weights(&self) -> [i64; B] {
        let total = self.total() as i64;
        let mut weights = [0i64; B];
        let mut below = 0i64;
        for (w, &c) in weights.iter_mut().zip(self.counts.iter()) {
            below += c as i64;
            *w = total - 2 * below;
        }
        weights
    }
}
