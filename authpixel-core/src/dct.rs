//! 2D DCT-II and its inverse for small square blocks
//!
//! Uses the orthonormal scaling of OpenCV's `cv2.dct`, so coefficient
//! magnitudes (and therefore quantization steps) carry over directly.

use crate::transform::BlockTransform;
use core::f64::consts::PI;

/// Orthonormal DCT with a precomputed cosine table
///
/// `table[k * n + i] = alpha[k] * cos(PI * (2i + 1) * k / 2n)`
#[derive(Debug, Clone)]
pub struct Dct {
    n: usize,
    table: Vec<f64>,
}

impl Dct {
    /// Build the basis for `n × n` blocks
    pub fn new(n: usize) -> Self {
        let nf = n as f64;
        let mut table = vec![0.0; n * n];

        for k in 0..n {
            let alpha = if k == 0 {
                (1.0 / nf).sqrt()
            } else {
                (2.0 / nf).sqrt()
            };
            for i in 0..n {
                table[k * n + i] =
                    alpha * (PI * (2.0 * i as f64 + 1.0) * k as f64 / (2.0 * nf)).cos();
            }
        }

        Self { n, table }
    }

    #[inline]
    fn basis(&self, k: usize, i: usize) -> f64 {
        self.table[k * self.n + i]
    }

    /// Separable pass: `out[r][k] = Σ_i in[r][i] · basis(k, i)` (forward)
    /// or `Σ_k in[r][k] · basis(k, i)` (inverse), applied along rows.
    fn rows(&self, input: &[f64], inverse: bool) -> Vec<f64> {
        let n = self.n;
        let mut out = vec![0.0; n * n];
        for r in 0..n {
            let row = &input[r * n..(r + 1) * n];
            for k in 0..n {
                out[r * n + k] = if inverse {
                    (0..n).map(|j| row[j] * self.basis(j, k)).sum()
                } else {
                    (0..n).map(|j| row[j] * self.basis(k, j)).sum()
                };
            }
        }
        out
    }

    fn transpose(&self, input: &[f64]) -> Vec<f64> {
        let n = self.n;
        let mut out = vec![0.0; n * n];
        for r in 0..n {
            for c in 0..n {
                out[c * n + r] = input[r * n + c];
            }
        }
        out
    }
}

impl BlockTransform for Dct {
    fn block_size(&self) -> usize {
        self.n
    }

    fn forward(&self, block: &[f64]) -> Vec<f64> {
        debug_assert_eq!(block.len(), self.n * self.n);
        // rows, then columns via transposition
        let tmp = self.transpose(&self.rows(block, false));
        self.transpose(&self.rows(&tmp, false))
    }

    fn inverse(&self, coeffs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(coeffs.len(), self.n * self.n);
        let tmp = self.transpose(&self.rows(coeffs, true));
        self.transpose(&self.rows(&tmp, true))
    }

    fn coefficient(&self, block: &[f64], row: usize, col: usize) -> f64 {
        let n = self.n;
        let mut sum = 0.0;
        for y in 0..n {
            let wy = self.basis(row, y);
            let line = &block[y * n..(y + 1) * n];
            let dot: f64 = line
                .iter()
                .enumerate()
                .map(|(x, v)| v * self.basis(col, x))
                .sum();
            sum += wy * dot;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_block_has_only_dc() {
        let dct = Dct::new(8);
        let block = vec![128.0; 64];
        let coeffs = dct.forward(&block);

        // DC of an orthonormal 8x8 DCT is 8 * mean
        assert!((coeffs[0] - 1024.0).abs() < 1e-9);
        for c in &coeffs[1..] {
            assert!(c.abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_coefficient_basis() {
        let dct = Dct::new(8);
        let mut coeffs = vec![0.0; 64];
        coeffs[3 * 8 + 3] = 35.0;
        let block = dct.inverse(&coeffs);

        // (3,3) basis amplitude is 35 * (1/2)^2 * cos * cos, so bounded by 8.75
        let peak = block.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak <= 8.75 + 1e-9);
        assert!(peak > 5.0);

        let back = dct.forward(&block);
        assert!((back[27] - 35.0).abs() < 1e-9);
    }
}
