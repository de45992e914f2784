//! Watermark embedding
//!
//! The plane is tiled into blocks at offset `(0, 0)`. Block `i` (row-major)
//! carries bit `packet[i % packet.len()]`, so the packet repeats across the
//! whole image. Each bit is written into the parity of the quantized carrier
//! coefficient (QIM): even for 0, odd for 1.

use crate::config::WatermarkConfig;
use crate::encoder::encode_packet;
use crate::error::WatermarkError;
use crate::types::{BlockGrid, Plane};
use rayon::prelude::*;

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Quantization index of `coeff`; its parity is the carried bit
#[inline]
pub fn quantization_index(coeff: f64, step: f64) -> i64 {
    (coeff / step).round() as i64
}

/// Bit carried by `coeff`
#[inline]
pub fn qim_bit(coeff: f64, step: f64) -> u8 {
    quantization_index(coeff, step).rem_euclid(2) as u8
}

/// Move `coeff` onto the nearest multiple of `step` whose index parity is `bit`
pub fn qim_quantize(coeff: f64, step: f64, bit: u8) -> f64 {
    let scaled = coeff / step;
    let mut index = scaled.round() as i64;
    if index.rem_euclid(2) as u8 != bit & 1 {
        // Step to whichever neighbour is closer to the original value
        index += if scaled >= index as f64 { 1 } else { -1 };
    }
    index as f64 * step
}

/// Longest text (in characters) whose packet fits a `width × height` plane
///
/// Returns 0 when not even one character fits.
pub fn capacity(width: usize, height: usize, config: &WatermarkConfig) -> Result<usize, WatermarkError> {
    config.validate()?;

    let blocks = BlockGrid::aligned(width, height, config.block_size).total_blocks();
    Ok((1..=config.max_payload_chars)
        .rev()
        .find(|&chars| config.packet_len(chars) <= blocks)
        .unwrap_or(0))
}

/// Embed `text` into a copy of `plane`
///
/// Fails with [`WatermarkError::InputTooSmall`] if the block grid cannot hold
/// one full packet; the input plane is never modified.
pub fn embed(plane: &Plane, text: &str, config: &WatermarkConfig) -> Result<Plane, WatermarkError> {
    let packet = encode_packet(text, config)?;
    embed_bits(plane, &packet, config)
}

/// Embed a prepared packet bit sequence into a copy of `plane`
pub fn embed_bits(
    plane: &Plane,
    packet: &[u8],
    config: &WatermarkConfig,
) -> Result<Plane, WatermarkError> {
    let transform = config.transform()?;
    let grid = BlockGrid::aligned(plane.width(), plane.height(), config.block_size);
    let total_blocks = grid.total_blocks();

    if packet.is_empty() || total_blocks < packet.len() {
        return Err(WatermarkError::InputTooSmall {
            required: packet.len(),
            available: total_blocks,
        });
    }

    #[cfg(feature = "logging")]
    info!(
        "Embedding {}-bit packet into {}x{} grid ({} repetitions)",
        packet.len(),
        grid.rows,
        grid.cols,
        total_blocks / packet.len()
    );

    let n = config.block_size;
    let (row, col) = config.coefficient;
    let carrier = row * n + col;
    let step = config.quantization_step;

    // Blocks do not overlap, so each one is computed independently from the
    // read-only input and written back afterwards.
    let blocks: Vec<Vec<f64>> = (0..total_blocks)
        .into_par_iter()
        .map(|index| {
            let (x, y) = grid.origin(index);
            let bit = packet[index % packet.len()];

            let mut coeffs = transform.forward(&plane.read_block(x, y, n));
            coeffs[carrier] = qim_quantize(coeffs[carrier], step, bit);
            transform.inverse(&coeffs)
        })
        .collect();

    let mut out = plane.clone();
    for (index, block) in blocks.iter().enumerate() {
        let (x, y) = grid.origin(index);
        out.write_block(x, y, n, block);
    }

    #[cfg(feature = "logging")]
    debug!("Embedded {} blocks", total_blocks);

    Ok(out)
}

/// Blocks of the `(0, 0)` grid whose carried bit differs between two planes
///
/// Compares a freshly embedded plane with what survived a later lossy step,
/// such as rounding and clamping to 8-bit RGB.
pub fn carried_bit_errors(
    expected: &Plane,
    observed: &Plane,
    config: &WatermarkConfig,
) -> Result<usize, WatermarkError> {
    let transform = config.transform()?;
    let n = config.block_size;
    let (row, col) = config.coefficient;
    let step = config.quantization_step;

    let width = expected.width().min(observed.width());
    let height = expected.height().min(observed.height());
    let grid = BlockGrid::aligned(width, height, n);

    Ok((0..grid.total_blocks())
        .into_par_iter()
        .filter(|&index| {
            let (x, y) = grid.origin(index);
            let before = transform.coefficient(&expected.read_block(x, y, n), row, col);
            let after = transform.coefficient(&observed.read_block(x, y, n), row, col);
            qim_bit(before, step) != qim_bit(after, step)
        })
        .count())
}
