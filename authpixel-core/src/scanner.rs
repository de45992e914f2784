//! Offset search and candidate collection
//!
//! The decoder does not know where the embedding grid starts, so every
//! pixel offset in `[0, block_size)²` is tried. Each alignment yields one
//! bitstream; every sync match inside it that frames a plausible payload
//! becomes a [`Candidate`].

use crate::config::{Framing, WatermarkConfig};
use crate::constants::{
    is_printable, BITS_PER_CHAR, LENGTH_FIELD_WIDTH, MIN_DECLARED_LENGTH, TERMINATOR,
};
use crate::decoder::read_uint;
use crate::embedder::qim_bit;
use crate::error::WatermarkError;
use crate::transform::BlockTransform;
use crate::types::{BlockGrid, Candidate, Plane};
use memchr::memmem::Finder;
use rayon::prelude::*;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Bits extracted at one grid alignment
#[derive(Debug, Clone)]
pub struct OffsetBitstream {
    /// Grid the bits were read from
    pub grid: BlockGrid,
    /// One bit per block, row-major
    pub bits: Vec<u8>,
}

impl OffsetBitstream {
    /// Alignment as `(offset_y, offset_x)`
    pub fn offset(&self) -> (usize, usize) {
        (self.grid.offset_y, self.grid.offset_x)
    }
}

/// Read the carried bit of every block in `grid`
pub fn extract_grid(
    plane: &Plane,
    grid: &BlockGrid,
    transform: &dyn BlockTransform,
    config: &WatermarkConfig,
) -> Vec<u8> {
    let n = grid.block_size;
    let (row, col) = config.coefficient;
    (0..grid.total_blocks())
        .map(|index| {
            let (x, y) = grid.origin(index);
            let coeff = transform.coefficient(&plane.read_block(x, y, n), row, col);
            qim_bit(coeff, config.quantization_step)
        })
        .collect()
}

/// Alignments to scan, in row-major offset order
pub fn search_grids(plane: &Plane, config: &WatermarkConfig) -> Vec<BlockGrid> {
    let n = config.block_size;
    let span = if config.exhaustive_search { n } else { 1 };
    (0..span)
        .flat_map(|oy| (0..span).map(move |ox| (oy, ox)))
        .map(|(oy, ox)| BlockGrid::new(plane.width(), plane.height(), n, oy, ox))
        .filter(|grid| grid.total_blocks() > 0)
        .collect()
}

/// Extract one bitstream per alignment
///
/// Alignments are independent read-only scans and run in parallel; the
/// result keeps row-major offset order.
pub fn extract_offsets(
    plane: &Plane,
    config: &WatermarkConfig,
) -> Result<Vec<OffsetBitstream>, WatermarkError> {
    let transform = config.transform()?;
    let grids = search_grids(plane, config);

    #[cfg(feature = "logging")]
    debug!(
        "Scanning {} alignments of a {}x{} plane",
        grids.len(),
        plane.width(),
        plane.height()
    );

    Ok(grids
        .into_par_iter()
        .map(|grid| OffsetBitstream {
            bits: extract_grid(plane, &grid, transform.as_ref(), config),
            grid,
        })
        .collect())
}

/// All start positions of `sync` in `bits`, overlaps included
pub fn find_sync(bits: &[u8], sync: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    if sync.is_empty() || bits.len() < sync.len() {
        return positions;
    }

    let finder = Finder::new(sync);
    let mut pos = 0;
    while let Some(rel) = finder.find(&bits[pos..]) {
        let at = pos + rel;
        positions.push(at);
        pos = at + 1;
        if pos + sync.len() > bits.len() {
            break;
        }
    }
    positions
}

/// Try to frame a candidate whose sync code starts at `position`
pub fn read_candidate(
    bits: &[u8],
    position: usize,
    offset: (usize, usize),
    config: &WatermarkConfig,
) -> Result<Candidate, WatermarkError> {
    let start = position + config.sync_code.len();
    let (declared_length, payload) = match config.framing {
        Framing::LengthPrefixed => read_length_prefixed(bits, start, config)?,
        Framing::Terminated => read_terminated(bits, start, config)?,
    };

    Ok(Candidate {
        declared_length,
        bits: payload.to_vec(),
        offset,
        position,
    })
}

fn remaining(bits: &[u8], start: usize) -> usize {
    bits.len().saturating_sub(start)
}

fn read_length_prefixed<'a>(
    bits: &'a [u8],
    start: usize,
    config: &WatermarkConfig,
) -> Result<(usize, &'a [u8]), WatermarkError> {
    if start + LENGTH_FIELD_WIDTH > bits.len() {
        return Err(WatermarkError::IncompleteCandidate {
            expected: LENGTH_FIELD_WIDTH,
            actual: remaining(bits, start),
        });
    }

    let declared = read_uint(&bits[start..], LENGTH_FIELD_WIDTH);
    if declared < MIN_DECLARED_LENGTH || declared > config.max_payload_chars {
        return Err(WatermarkError::InvalidLength(declared));
    }

    let payload_start = start + LENGTH_FIELD_WIDTH;
    let payload_end = payload_start + declared * BITS_PER_CHAR;
    if payload_end > bits.len() {
        return Err(WatermarkError::IncompleteCandidate {
            expected: LENGTH_FIELD_WIDTH + declared * BITS_PER_CHAR,
            actual: remaining(bits, start),
        });
    }

    Ok((declared, &bits[payload_start..payload_end]))
}

fn read_terminated<'a>(
    bits: &'a [u8],
    start: usize,
    config: &WatermarkConfig,
) -> Result<(usize, &'a [u8]), WatermarkError> {
    // Up to max_payload_chars bytes, then the terminator
    for chars in 0..=config.max_payload_chars {
        let byte_start = start + chars * BITS_PER_CHAR;
        if byte_start + BITS_PER_CHAR > bits.len() {
            return Err(WatermarkError::IncompleteCandidate {
                expected: (chars + 1) * BITS_PER_CHAR,
                actual: remaining(bits, start),
            });
        }

        let byte = read_uint(&bits[byte_start..], BITS_PER_CHAR) as u8;
        if byte == TERMINATOR {
            if chars < MIN_DECLARED_LENGTH {
                return Err(WatermarkError::InvalidLength(chars));
            }
            return Ok((chars, &bits[start..byte_start]));
        }
        if !is_printable(byte) {
            return Err(WatermarkError::NonPrintablePayload { length: chars });
        }
    }

    Err(WatermarkError::InvalidLength(config.max_payload_chars + 1))
}

/// Counters describing one decode run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ScanStats {
    /// Alignments scanned
    pub offsets_scanned: usize,

    /// Total bits extracted across alignments
    pub bits_extracted: usize,

    /// Sync code occurrences
    pub sync_matches: usize,

    /// Matches dropped for an out-of-range length
    pub invalid_lengths: usize,

    /// Matches dropped because the stream ended first
    pub incomplete: usize,

    /// Matches dropped for a non-printable byte before the terminator
    pub non_printable: usize,

    /// Candidates collected
    pub candidates: usize,

    /// Distinct declared lengths among the candidates
    pub groups: usize,

    /// Groups whose consensus was not printable
    pub groups_rejected: usize,
}

impl ScanStats {
    /// Share of sync matches that became candidates, as a percentage
    pub fn candidate_rate(&self) -> f64 {
        if self.sync_matches == 0 {
            0.0
        } else {
            (self.candidates as f64 / self.sync_matches as f64) * 100.0
        }
    }

    fn record_rejection(&mut self, err: &WatermarkError) {
        match err {
            WatermarkError::InvalidLength(_) => self.invalid_lengths += 1,
            WatermarkError::NonPrintablePayload { .. } => self.non_printable += 1,
            _ => self.incomplete += 1,
        }
    }
}

/// Collect candidates from one bitstream
pub fn scan_bitstream(
    stream: &OffsetBitstream,
    config: &WatermarkConfig,
    stats: &mut ScanStats,
) -> Vec<Candidate> {
    let sync = config.sync_bits();
    let offset = stream.offset();
    let mut candidates = Vec::new();

    for position in find_sync(&stream.bits, &sync) {
        stats.sync_matches += 1;
        match read_candidate(&stream.bits, position, offset, config) {
            Ok(candidate) => {
                #[cfg(feature = "logging")]
                trace!(
                    "Candidate of length {} at offset {:?} bit {}",
                    candidate.declared_length,
                    offset,
                    position
                );
                candidates.push(candidate);
            }
            Err(e) => {
                #[cfg(feature = "logging")]
                trace!("Discarding sync at offset {:?} bit {}: {}", offset, position, e);
                stats.record_rejection(&e);
            }
        }
    }

    stats.candidates += candidates.len();
    candidates
}

/// Collect candidates across all alignments of `plane`, with statistics
pub fn scan_plane(
    plane: &Plane,
    config: &WatermarkConfig,
) -> Result<(Vec<Candidate>, ScanStats), WatermarkError> {
    let streams = extract_offsets(plane, config)?;
    let mut stats = ScanStats {
        offsets_scanned: streams.len(),
        bits_extracted: streams.iter().map(|s| s.bits.len()).sum(),
        ..Default::default()
    };

    let mut candidates = Vec::new();
    for stream in &streams {
        candidates.extend(scan_bitstream(stream, config, &mut stats));
    }

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: {} sync matches, {} candidates over {} alignments",
        stats.sync_matches, stats.candidates, stats.offsets_scanned
    );

    Ok((candidates, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::embed;
    use crate::encoder::{bytes_to_bits, encode_packet};

    fn stream(bits: Vec<u8>) -> OffsetBitstream {
        OffsetBitstream {
            grid: BlockGrid::new(8 * bits.len(), 8, 8, 0, 0),
            bits,
        }
    }

    #[test]
    fn test_find_sync_allows_overlaps() {
        let bits = [1, 0, 1, 0, 1, 0, 1];
        assert_eq!(find_sync(&bits, &[1, 0, 1]), vec![0, 2, 4]);
        assert!(find_sync(&bits, &[1, 1]).is_empty());
        assert!(find_sync(&[1], &[1, 0]).is_empty());
    }

    #[test]
    fn test_scan_clean_stream() {
        let config = WatermarkConfig::default();
        let mut bits = encode_packet("HI", &config).unwrap();
        bits.extend(encode_packet("HI", &config).unwrap());

        let mut stats = ScanStats::default();
        let candidates = scan_bitstream(&stream(bits), &config, &mut stats);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].declared_length, 2);
        assert_eq!(candidates[0].bits, bytes_to_bits(b"HI"));
        assert_eq!(candidates[1].position, 36);
        assert_eq!(stats.sync_matches, 2);
    }

    #[test]
    fn test_length_sanity_rejected() {
        let config = WatermarkConfig::default();
        for length in [0u8, 51, 200] {
            let mut bits = config.sync_bits();
            bits.extend(bytes_to_bits(&[length]));
            bits.extend(vec![0; 8 * 255]);

            let mut stats = ScanStats::default();
            let candidates = scan_bitstream(&stream(bits), &config, &mut stats);
            assert!(candidates.is_empty(), "length {} produced a candidate", length);
            assert_eq!(stats.invalid_lengths, 1);
        }
    }

    #[test]
    fn test_truncated_match_is_incomplete() {
        let config = WatermarkConfig::default();
        let mut bits = encode_packet("HELLO", &config).unwrap();
        bits.truncate(bits.len() - 3);

        let mut stats = ScanStats::default();
        assert!(scan_bitstream(&stream(bits), &config, &mut stats).is_empty());
        assert_eq!(stats.incomplete, 1);
    }

    #[test]
    fn test_terminated_framing() {
        let config = WatermarkConfig::builder()
            .framing(Framing::Terminated)
            .build()
            .unwrap();
        let bits = encode_packet("Yo!", &config).unwrap();

        let mut stats = ScanStats::default();
        let candidates = scan_bitstream(&stream(bits), &config, &mut stats);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].declared_length, 3);
        assert_eq!(candidates[0].bits, bytes_to_bits(b"Yo!"));
    }

    #[test]
    fn test_terminated_rejects_unprintable_and_empty() {
        let config = WatermarkConfig::builder()
            .framing(Framing::Terminated)
            .build()
            .unwrap();

        let mut bits = config.sync_bits();
        bits.extend(bytes_to_bits(b"A\x07B\x00"));
        let mut stats = ScanStats::default();
        assert!(scan_bitstream(&stream(bits), &config, &mut stats).is_empty());
        assert_eq!(stats.non_printable, 1);

        let mut bits = config.sync_bits();
        bits.extend(bytes_to_bits(b"\x00"));
        let mut stats = ScanStats::default();
        assert!(scan_bitstream(&stream(bits), &config, &mut stats).is_empty());
        assert_eq!(stats.invalid_lengths, 1);
    }

    #[test]
    fn test_aligned_only_scans_one_offset() {
        let config = WatermarkConfig::builder().aligned_only().build().unwrap();
        let plane = Plane::filled(32, 32, 128.0);
        assert_eq!(search_grids(&plane, &config).len(), 1);

        let exhaustive = WatermarkConfig::default();
        assert_eq!(search_grids(&plane, &exhaustive).len(), 64);
    }

    #[test]
    fn test_offset_zero_reproduces_packet() {
        let config = WatermarkConfig::default();
        let plane = Plane::filled(64, 64, 128.0);
        let marked = embed(&plane, "HI", &config).unwrap();
        let packet = encode_packet("HI", &config).unwrap();

        let streams = extract_offsets(&marked, &config).unwrap();
        assert_eq!(streams.len(), 64);
        assert_eq!(streams[0].offset(), (0, 0));
        let expected: Vec<u8> = (0..64).map(|i| packet[i % packet.len()]).collect();
        assert_eq!(streams[0].bits, expected);
    }

    #[test]
    fn test_scan_plane_rejects_invalid_config() {
        let config = WatermarkConfig {
            block_size: 0,
            ..Default::default()
        };
        let plane = Plane::filled(32, 32, 128.0);
        assert!(matches!(
            scan_plane(&plane, &config),
            Err(WatermarkError::InvalidConfig(_))
        ));
    }
}
