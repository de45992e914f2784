//! Payload decoding
//!
//! These functions turn already-unframed payload bits back into text. They
//! never look for sync codes; see [`crate::scanner`] for that.

use crate::constants::{is_printable, BITS_PER_CHAR};

/// Pack bits (MSB first) into bytes; a trailing partial byte is dropped
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(BITS_PER_CHAR)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1)))
        .collect()
}

/// Read `width` bits (MSB first) as an unsigned value
pub fn read_uint(bits: &[u8], width: usize) -> usize {
    bits.iter()
        .take(width)
        .fold(0usize, |acc, &b| (acc << 1) | (b & 1) as usize)
}

/// Decode payload bits, keeping only printable ASCII (32..=126)
///
/// Returns `None` if no printable character remains.
pub fn decode_payload(bits: &[u8]) -> Option<String> {
    let text: String = bits_to_bytes(bits)
        .into_iter()
        .filter(|b| is_printable(*b))
        .map(char::from)
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Decode payload bits only if every byte is printable ASCII
pub fn decode_strict(bits: &[u8]) -> Option<String> {
    if bits.is_empty() || bits.len() % BITS_PER_CHAR != 0 {
        return None;
    }

    let bytes = bits_to_bytes(bits);
    if bytes.iter().all(|b| is_printable(*b)) {
        Some(bytes.into_iter().map(char::from).collect())
    } else {
        None
    }
}
