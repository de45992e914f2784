//! Block transform interface
//!
//! Blocks and coefficient matrices are `n × n` row-major slices.

/// Orthogonal transform over square blocks
pub trait BlockTransform: Send + Sync {
    /// Edge length of the blocks this transform accepts
    fn block_size(&self) -> usize;

    /// Forward transform of one block
    fn forward(&self, block: &[f64]) -> Vec<f64>;

    /// Inverse transform of one coefficient matrix
    fn inverse(&self, coeffs: &[f64]) -> Vec<f64>;

    /// Single coefficient `(row, col)` of the forward transform.
    ///
    /// Implementations override this when one coefficient is cheaper than
    /// the whole matrix.
    fn coefficient(&self, block: &[f64], row: usize, col: usize) -> f64 {
        self.forward(block)[row * self.block_size() + col]
    }
}
