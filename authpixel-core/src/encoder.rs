//! Packet encoding
//!
//! A packet is the bit sequence repeated across the image:
//!
//! - length-prefixed: `SYNC ‖ LENGTH (8 bits) ‖ PAYLOAD (8 bits/char)`
//! - terminated: `SYNC ‖ PAYLOAD (8 bits/char) ‖ 0x00`
//!
//! Bits are stored one per `u8` (values 0 and 1), most significant bit of
//! every byte first.

use crate::config::{Framing, OverflowPolicy, WatermarkConfig};
use crate::constants::{is_printable, BITS_PER_CHAR, TERMINATOR};
use crate::error::WatermarkError;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// Expand bytes into bits, MSB first
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * BITS_PER_CHAR);
    for &byte in bytes {
        for i in (0..BITS_PER_CHAR).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Check `text` against the configured limits and return the characters to embed
///
/// Applies the overflow policy: under [`OverflowPolicy::Truncate`] the text
/// is cut to `max_payload_chars`.
pub fn prepare_text<'a>(text: &'a str, config: &WatermarkConfig) -> Result<&'a str, WatermarkError> {
    if text.is_empty() {
        return Err(WatermarkError::EmptyPayload);
    }

    if let Some(bad) = text
        .chars()
        .find(|c| !c.is_ascii() || !is_printable(*c as u8))
    {
        return Err(WatermarkError::UnsupportedCharacter(bad));
    }

    // All ASCII from here on: one byte per char
    let max = config.max_payload_chars;
    if text.len() > max {
        match config.overflow {
            OverflowPolicy::Reject => {
                return Err(WatermarkError::PayloadTooLong {
                    length: text.len(),
                    max,
                })
            }
            OverflowPolicy::Truncate => {
                #[cfg(feature = "logging")]
                debug!("Truncating watermark text from {} to {} chars", text.len(), max);
                return Ok(&text[..max]);
            }
        }
    }

    Ok(text)
}

/// Framed bytes that follow the sync code
///
/// The layout is:
/// 1. Length (1 byte) and payload, for length-prefixed framing
/// 2. Payload and terminator (1 byte), for terminated framing
pub fn encode_body(text: &str, config: &WatermarkConfig) -> Result<Bytes, WatermarkError> {
    let text = prepare_text(text, config)?;
    let payload = text.as_bytes();

    let mut buf = BytesMut::with_capacity(payload.len() + 1);
    match config.framing {
        Framing::LengthPrefixed => {
            // prepare_text bounds the length by max_payload_chars <= 255
            buf.put_u8(payload.len() as u8);
            buf.put_slice(payload);
        }
        Framing::Terminated => {
            buf.put_slice(payload);
            buf.put_u8(TERMINATOR);
        }
    }

    Ok(buf.freeze())
}

/// Encode `text` into the packet bit sequence
pub fn encode_packet(text: &str, config: &WatermarkConfig) -> Result<Vec<u8>, WatermarkError> {
    config.validate()?;
    let body = encode_body(text, config)?;

    let mut bits = config.sync_bits();
    bits.extend(bytes_to_bits(&body));

    #[cfg(feature = "logging")]
    debug!(
        "Encoded packet: {} sync bits + {} body bytes = {} bits",
        config.sync_code.len(),
        body.len(),
        bits.len()
    );

    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<u8> {
        s.bytes().map(|b| b - b'0').collect()
    }

    #[test]
    fn test_encode_hi_length_prefixed() {
        let config = WatermarkConfig::default();
        let packet = encode_packet("HI", &config).unwrap();

        let expected = bits(concat!(
            "111000111000", // sync
            "00000010",     // length 2
            "01001000",     // 'H'
            "01001001",     // 'I'
        ));
        assert_eq!(packet, expected);
    }

    #[test]
    fn test_encode_terminated() {
        let config = WatermarkConfig::builder()
            .framing(Framing::Terminated)
            .sync_code("1011")
            .build()
            .unwrap();
        let packet = encode_packet("A", &config).unwrap();
        let expected = bits(concat!(
            "1011",     // sync
            "01000001", // 'A'
            "00000000", // terminator
        ));
        assert_eq!(packet, expected);
    }

    #[test]
    fn test_empty_text_rejected() {
        let config = WatermarkConfig::default();
        assert_eq!(encode_packet("", &config), Err(WatermarkError::EmptyPayload));
    }

    #[test]
    fn test_non_ascii_rejected() {
        let config = WatermarkConfig::default();
        assert_eq!(
            encode_packet("naïve", &config),
            Err(WatermarkError::UnsupportedCharacter('ï'))
        );
        assert_eq!(
            encode_packet("a\nb", &config),
            Err(WatermarkError::UnsupportedCharacter('\n'))
        );
    }

    #[test]
    fn test_overflow_policies() {
        let reject = WatermarkConfig::builder().max_payload_chars(4).build().unwrap();
        assert_eq!(
            encode_packet("abcdef", &reject),
            Err(WatermarkError::PayloadTooLong { length: 6, max: 4 })
        );

        let truncate = WatermarkConfig::builder()
            .max_payload_chars(4)
            .overflow(OverflowPolicy::Truncate)
            .build()
            .unwrap();
        let packet = encode_packet("abcdef", &truncate).unwrap();
        assert_eq!(packet.len(), truncate.packet_len(4));
        let body = encode_body("abcdef", &truncate).unwrap();
        assert_eq!(&body[..], b"\x04abcd");
    }

    #[test]
    fn test_bytes_to_bits_msb_first() {
        assert_eq!(bytes_to_bits(&[0x80, 0x01]), bits("1000000000000001"));
    }
}
