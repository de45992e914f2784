//! Fuzzing entry points for authpixel-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode_plane

use authpixel_core::{Plane, WatermarkConfig};

/// Largest plane edge built from fuzz input
const MAX_EDGE: usize = 48;

pub fn fuzz_decode_payload(data: &[u8]) {
    use authpixel_core::decoder::{decode_payload, decode_strict};

    let bits: Vec<u8> = data.iter().map(|b| b & 1).collect();

    // Should never panic, whatever the bit count
    let _ = decode_payload(&bits);
    let _ = decode_strict(&bits);
}

pub fn fuzz_scan_bits(data: &[u8]) {
    use authpixel_core::scanner::{scan_bitstream, OffsetBitstream, ScanStats};
    use authpixel_core::types::BlockGrid;
    use authpixel_core::Framing;

    let bits: Vec<u8> = data.iter().map(|b| b & 1).collect();
    let stream = OffsetBitstream {
        grid: BlockGrid::new(8 * bits.len(), 8, 8, 0, 0),
        bits,
    };

    for framing in [Framing::LengthPrefixed, Framing::Terminated] {
        let config = WatermarkConfig {
            framing,
            ..Default::default()
        };
        let mut stats = ScanStats::default();
        let _ = scan_bitstream(&stream, &config, &mut stats);
    }
}

/// First two bytes pick the size, the rest are cycled as samples
pub fn fuzz_decode_plane(data: &[u8]) {
    let (width, height, samples) = match data {
        [w, h, rest @ ..] => (
            *w as usize % (MAX_EDGE + 1),
            *h as usize % (MAX_EDGE + 1),
            rest,
        ),
        _ => return,
    };

    let plane = Plane::from_fn(width, height, |x, y| {
        if samples.is_empty() {
            0.0
        } else {
            samples[(y * width + x) % samples.len()] as f64
        }
    });

    // Try to decode - should never panic
    let _ = authpixel_core::decode(&plane, &WatermarkConfig::default());
}
