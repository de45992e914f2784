//! # AuthPixel Core
//!
//! Invisible text watermarks in the luma plane of an image, recoverable
//! without the original.
//!
//! ## Modules
//!
//! - `constants`: Format constants and defaults
//! - `config`: Embed/decode configuration
//! - `types`: Planes, block grids, candidates, results
//! - `transform`, `dct`, `haar`: Block transforms
//! - `encoder`: Packet encoding
//! - `decoder`: Payload decoding
//! - `embedder`: QIM embedding
//! - `scanner`: Offset search and candidate collection
//! - `consensus`: Majority voting across candidates
//! - `luma`: RGB ↔ luma conversion

#![warn(missing_docs)]

pub mod config;
pub mod consensus;
pub mod constants;
pub mod dct;
pub mod decoder;
pub mod embedder;
pub mod encoder;
pub mod error;
pub mod haar;
pub mod luma;
pub mod scanner;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use config::{Framing, OverflowPolicy, TransformKind, WatermarkConfig};
pub use embedder::{capacity, embed};
pub use error::WatermarkError;
pub use scanner::ScanStats;
pub use types::{ConsensusResult, Plane};

use image::RgbImage;

#[cfg(feature = "logging")]
use tracing::warn;

/// Result type alias for AuthPixel operations
pub type Result<T> = core::result::Result<T, WatermarkError>;

/// Recover the watermark from a luma plane
pub fn decode(plane: &Plane, config: &WatermarkConfig) -> Result<ConsensusResult> {
    decode_with_stats(plane, config).0
}

/// Recover the watermark and report scan statistics
pub fn decode_with_stats(
    plane: &Plane,
    config: &WatermarkConfig,
) -> (Result<ConsensusResult>, ScanStats) {
    let (candidates, mut stats) = match scanner::scan_plane(plane, config) {
        Ok(scan) => scan,
        Err(e) => return (Err(e), ScanStats::default()),
    };
    let result = consensus::decode_candidates(candidates, &mut stats);
    (result, stats)
}

/// Embed `text` into the luma of an RGB image
///
/// The result is rounded and clamped to 8 bits per channel. In saturated
/// areas (near black, near white, pure colours) clamping can cancel the
/// coefficient change, so those blocks stop carrying their bit and the
/// image may not decode. Embedding still succeeds; use
/// [`embedder::carried_bit_errors`] to measure the damage. With the
/// `logging` feature a warning is emitted when any block is affected.
pub fn embed_image(img: &RgbImage, text: &str, config: &WatermarkConfig) -> Result<RgbImage> {
    let split = luma::LumaChroma::from_rgb(img);
    let marked = embed(&split.luma, text, config)?;
    let out = split.to_rgb_with(&marked);

    #[cfg(feature = "logging")]
    {
        let damaged = embedder::carried_bit_errors(&marked, &luma::luma_plane(&out), config)?;
        if damaged > 0 {
            let total = types::BlockGrid::aligned(marked.width(), marked.height(), config.block_size)
                .total_blocks();
            warn!(
                "8-bit clamping flipped the carried bit of {} of {} blocks; the watermark may not decode",
                damaged, total
            );
        }
    }

    Ok(out)
}

/// Recover the watermark from an RGB image
pub fn decode_image(img: &RgbImage, config: &WatermarkConfig) -> Result<ConsensusResult> {
    decode(&luma::luma_plane(img), config)
}
