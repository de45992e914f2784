//! Single-level 2D Haar wavelet over a square block
//!
//! The coefficient matrix holds the four sub-bands as quadrants, each of
//! size `(n/2) × (n/2)`:
//!
//! ```text
//! +----+----+
//! | LL | LH |
//! +----+----+
//! | HL | HH |
//! +----+----+
//! ```

use crate::transform::BlockTransform;

const SQRT2: f64 = core::f64::consts::SQRT_2;

/// Orthonormal one-level Haar transform for even `n`
#[derive(Debug, Clone, Copy)]
pub struct Haar {
    n: usize,
}

impl Haar {
    /// Create the transform for `n × n` blocks (`n` must be even)
    pub fn new(n: usize) -> Self {
        assert!(n >= 2 && n % 2 == 0, "haar block size must be even");
        Self { n }
    }

    /// Sample index and sign pair feeding output index `k` along one axis
    #[inline]
    fn taps(&self, k: usize) -> (usize, f64) {
        let half = self.n / 2;
        if k < half {
            (2 * k, 1.0)
        } else {
            (2 * (k - half), -1.0)
        }
    }
}

impl BlockTransform for Haar {
    fn block_size(&self) -> usize {
        self.n
    }

    fn forward(&self, block: &[f64]) -> Vec<f64> {
        let n = self.n;
        let half = n / 2;
        debug_assert_eq!(block.len(), n * n);

        // Row-wise: left half = low, right half = high
        let mut temp = vec![0.0f64; n * n];
        for r in 0..n {
            for c in 0..half {
                let a = block[r * n + 2 * c];
                let b = block[r * n + 2 * c + 1];
                temp[r * n + c] = (a + b) / SQRT2;
                temp[r * n + half + c] = (a - b) / SQRT2;
            }
        }

        // Column-wise: top half = low, bottom half = high
        let mut out = vec![0.0f64; n * n];
        for c in 0..n {
            for r in 0..half {
                let a = temp[2 * r * n + c];
                let b = temp[(2 * r + 1) * n + c];
                out[r * n + c] = (a + b) / SQRT2;
                out[(half + r) * n + c] = (a - b) / SQRT2;
            }
        }
        out
    }

    fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        let n = self.n;
        let half = n / 2;
        debug_assert_eq!(coeffs.len(), n * n);

        let mut temp = vec![0.0f64; n * n];
        for c in 0..n {
            for r in 0..half {
                let lo = coeffs[r * n + c];
                let hi = coeffs[(half + r) * n + c];
                temp[2 * r * n + c] = (lo + hi) / SQRT2;
                temp[(2 * r + 1) * n + c] = (lo - hi) / SQRT2;
            }
        }

        let mut out = vec![0.0f64; n * n];
        for r in 0..n {
            for c in 0..half {
                let lo = temp[r * n + c];
                let hi = temp[r * n + half + c];
                out[r * n + 2 * c] = (lo + hi) / SQRT2;
                out[r * n + 2 * c + 1] = (lo - hi) / SQRT2;
            }
        }
        out
    }

    fn coefficient(&self, block: &[f64], row: usize, col: usize) -> f64 {
        let n = self.n;
        let (y, sy) = self.taps(row);
        let (x, sx) = self.taps(col);
        let a = block[y * n + x];
        let b = block[y * n + x + 1];
        let c = block[(y + 1) * n + x];
        let d = block[(y + 1) * n + x + 1];
        (a + sx * b + sy * c + sy * sx * d) / 2.0
    }
}
