//! Error types for AuthPixel operations

/// Errors that can occur while embedding or recovering a watermark
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WatermarkError {
    /// The plane cannot hold one full packet repetition
    #[error("Image too small: packet needs {required} blocks, grid has {available}")]
    InputTooSmall {
        /// Number of blocks the packet needs.
        required: usize,
        /// Number of blocks available at the default alignment.
        available: usize,
    },

    /// No sync + length + printable payload combination validated
    #[error("No watermark detected")]
    NoWatermarkFound,

    /// Declared length outside the accepted range (discarded while decoding)
    #[error("Declared length {0} outside the accepted range")]
    InvalidLength(usize),

    /// Consensus bytes of a candidate group are not printable (discarded while decoding)
    #[error("Consensus payload of length {length} is not printable ASCII")]
    NonPrintablePayload {
        /// Declared length of the rejected group.
        length: usize,
    },

    /// Sync match too close to the end of a bitstream (discarded while decoding)
    #[error("Incomplete candidate: expected {expected} bits, got {actual}")]
    IncompleteCandidate {
        /// Bits needed after the sync code.
        expected: usize,
        /// Bits left in the stream.
        actual: usize,
    },

    /// Nothing to embed
    #[error("Watermark text is empty")]
    EmptyPayload,

    /// Text longer than the configured maximum under the reject policy
    #[error("Watermark text has {length} characters, maximum is {max}")]
    PayloadTooLong {
        /// Character count of the rejected text.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Character without a printable 8-bit ASCII code
    #[error("Unsupported character {0:?}: only printable ASCII can be embedded")]
    UnsupportedCharacter(char),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
