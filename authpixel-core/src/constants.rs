//! Constants and limits for the AuthPixel watermark format

/// Default synchronization pattern placed in front of every packet
pub const DEFAULT_SYNC_CODE: &str = "111000111000";

/// Default edge length of a transform block, in pixels
pub const DEFAULT_BLOCK_SIZE: usize = 8;

/// Default QIM quantization step applied to the carrier coefficient
pub const DEFAULT_QUANTIZATION_STEP: f64 = 35.0;

/// Default carrier coefficient `(row, col)` inside a block.
/// A mid-frequency cell for the DCT; inside the LL quadrant for Haar.
pub const DEFAULT_COEFFICIENT: (usize, usize) = (3, 3);

/// Default upper bound on payload characters; also the sanity bound
/// applied to declared lengths while decoding
pub const DEFAULT_MAX_PAYLOAD_CHARS: usize = 50;

/// Width of the length field in bits
pub const LENGTH_FIELD_WIDTH: usize = 8;

/// Largest value the length field can carry
pub const MAX_LENGTH_FIELD_VALUE: usize = (1 << LENGTH_FIELD_WIDTH) - 1;

/// Smallest declared length accepted while decoding
pub const MIN_DECLARED_LENGTH: usize = 1;

/// Terminator byte closing a packet in terminated framing
pub const TERMINATOR: u8 = 0x00;

/// Bits per payload character
pub const BITS_PER_CHAR: usize = 8;

/// Lowest printable ASCII code
pub const PRINTABLE_MIN: u8 = 32;

/// Highest printable ASCII code
pub const PRINTABLE_MAX: u8 = 126;

/// Longest sync code accepted by configuration validation
pub const MAX_SYNC_CODE_LEN: usize = 64;

/// Returns true if `byte` is printable ASCII (32..=126)
#[inline]
pub const fn is_printable(byte: u8) -> bool {
    byte >= PRINTABLE_MIN && byte <= PRINTABLE_MAX
}
