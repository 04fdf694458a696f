//! Fixed-capacity sorted sample buffer with constant-time median.

/// Keeps up to `B + 1` samples in ascending order on the stack.
///
/// Sized for the histogram proximal operator, which takes the median of the
/// current value and one candidate per bin. The smallest sample is held
/// apart from the rest so the capacity can exceed `B` without a second
/// const parameter.
#[derive(Debug, Clone, Copy)]
pub struct SortedSamples<const B: usize> {
    head: f32,
    tail: [f32; B],
    len: usize,
}

impl<const B: usize> Default for SortedSamples<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const B: usize> SortedSamples<B> {
    pub const CAPACITY: usize = B + 1;

    pub fn new() -> Self {
        Self {
            head: 0.0,
            tail: [0.0; B],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a sample, keeping the buffer sorted.
    ///
    /// Returns `false` and leaves the buffer untouched when it is full.
    pub fn insert(&mut self, value: f32) -> bool {
        if self.len == Self::CAPACITY {
            return false;
        }

        if self.len == 0 {
            self.head = value;
            self.len = 1;
            return true;
        }

        let tail_len = self.len - 1;
        if value < self.head {
            // Old head becomes the smallest tail element
            self.tail.copy_within(0..tail_len, 1);
            self.tail[0] = self.head;
            self.head = value;
        } else {
            let pos = self.tail[..tail_len].partition_point(|&t| t <= value);
            self.tail.copy_within(pos..tail_len, pos + 1);
            self.tail[pos] = value;
        }

        self.len += 1;
        true
    }

    /// Sample at sorted position `k`.
    pub fn get(&self, k: usize) -> Option<f32> {
        match k {
            _ if k >= self.len => None,
            0 => Some(self.head),
            _ => Some(self.tail[k - 1]),
        }
    }

    /// Median of the stored samples.
    ///
    /// For an even count this is the mean of the two central samples.
    pub fn median(&self) -> Option<f32> {
        let n = self.len;
        if n == 0 {
            return None;
        }
        let upper = self.get(n / 2)?;
        if n % 2 == 1 {
            return Some(upper);
        }
        let lower = self.get(n / 2 - 1)?;
        Some((lower + upper) * 0.5)
    }

    /// Samples in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).filter_map(move |k| self.get(k))
    }
}
