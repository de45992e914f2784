//! Core types: planes, block grids, candidates and results

use serde::{Deserialize, Serialize};

/// A 2D plane of luma samples, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl Plane {
    /// Create a plane filled with `value`
    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Create a plane from a function of `(x, y)`
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Wrap existing row-major samples; `None` if the length does not match
    pub fn from_samples(width: usize, height: usize, samples: Vec<f64>) -> Option<Self> {
        if samples.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            samples,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at `(x, y)`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.width + x]
    }

    /// Overwrite the sample at `(x, y)`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.samples[y * self.width + x] = value;
    }

    /// Raw row-major samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Consume the plane, returning its samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Copy the `n × n` block whose top-left pixel is `(x, y)`
    pub fn read_block(&self, x: usize, y: usize, n: usize) -> Vec<f64> {
        let mut block = Vec::with_capacity(n * n);
        for row in y..y + n {
            let start = row * self.width + x;
            block.extend_from_slice(&self.samples[start..start + n]);
        }
        block
    }

    /// Write an `n × n` block with its top-left pixel at `(x, y)`
    pub fn write_block(&mut self, x: usize, y: usize, n: usize, block: &[f64]) {
        debug_assert_eq!(block.len(), n * n);
        for (r, line) in block.chunks_exact(n).enumerate() {
            let start = (y + r) * self.width + x;
            self.samples[start..start + n].copy_from_slice(line);
        }
    }
}

/// One block alignment over a plane: origin offset plus grid extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGrid {
    /// Vertical pixel offset of the first block
    pub offset_y: usize,
    /// Horizontal pixel offset of the first block
    pub offset_x: usize,
    /// Block edge length
    pub block_size: usize,
    /// Number of block rows
    pub rows: usize,
    /// Number of block columns
    pub cols: usize,
}

impl BlockGrid {
    /// Grid of `block_size` blocks over a `width × height` plane starting at the offset
    ///
    /// A `block_size` of 0 yields an empty grid.
    pub fn new(
        width: usize,
        height: usize,
        block_size: usize,
        offset_y: usize,
        offset_x: usize,
    ) -> Self {
        let rows = height
            .saturating_sub(offset_y)
            .checked_div(block_size)
            .unwrap_or(0);
        let cols = width
            .saturating_sub(offset_x)
            .checked_div(block_size)
            .unwrap_or(0);
        Self {
            offset_y,
            offset_x,
            block_size,
            rows,
            cols,
        }
    }

    /// Grid at the embedding alignment `(0, 0)`
    pub fn aligned(width: usize, height: usize, block_size: usize) -> Self {
        Self::new(width, height, block_size, 0, 0)
    }

    /// Number of blocks in the grid
    pub fn total_blocks(&self) -> usize {
        self.rows * self.cols
    }

    /// Top-left pixel `(x, y)` of block `index` in row-major order
    #[inline]
    pub fn origin(&self, index: usize) -> (usize, usize) {
        let row = index / self.cols;
        let col = index % self.cols;
        (
            self.offset_x + col * self.block_size,
            self.offset_y + row * self.block_size,
        )
    }
}

/// A payload observation produced by one sync match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Payload length in characters
    pub declared_length: usize,
    /// Payload bits, `declared_length * 8` of them
    pub bits: Vec<u8>,
    /// Alignment `(offset_y, offset_x)` the match came from
    pub offset: (usize, usize),
    /// Bit position of the sync code in that alignment's stream
    pub position: usize,
}

/// Winner of the consensus vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Recovered text
    pub text: String,
    /// Number of candidates in the winning group
    pub support: usize,
    /// Declared length of the winning group
    pub declared_length: usize,
    /// Mean per-bit share of candidates agreeing with the consensus, in `[0.5, 1]`
    pub agreement: f64,
}
