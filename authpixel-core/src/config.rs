//! Watermark configuration
//!
//! A [`WatermarkConfig`] is an immutable value passed into every embed and
//! decode call. Both sides must use the same configuration; nothing about
//! it is stored in the image.

use crate::constants::{
    is_printable, DEFAULT_BLOCK_SIZE, DEFAULT_COEFFICIENT, DEFAULT_MAX_PAYLOAD_CHARS,
    DEFAULT_QUANTIZATION_STEP, DEFAULT_SYNC_CODE, MAX_LENGTH_FIELD_VALUE, MAX_SYNC_CODE_LEN,
};
use crate::error::WatermarkError;
use crate::transform::BlockTransform;
use serde::{Deserialize, Serialize};

/// Transform domain the carrier coefficient lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Orthonormal 2D DCT-II
    #[default]
    Dct,
    /// Single-level orthonormal 2D Haar wavelet
    Haar,
}

impl TransformKind {
    /// Build the transform for blocks of `block_size × block_size`
    ///
    /// Fails if the size is below 2, or odd for the Haar transform.
    pub fn build(&self, block_size: usize) -> Result<Box<dyn BlockTransform>, WatermarkError> {
        if block_size < 2 {
            return Err(invalid(format!(
                "block_size must be at least 2, got {}",
                block_size
            )));
        }

        match self {
            TransformKind::Dct => Ok(Box::new(crate::dct::Dct::new(block_size))),
            TransformKind::Haar if block_size % 2 != 0 => Err(invalid(format!(
                "haar transform needs an even block_size, got {}",
                block_size
            ))),
            TransformKind::Haar => Ok(Box::new(crate::haar::Haar::new(block_size))),
        }
    }
}

/// How the payload is delimited inside a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// `SYNC ‖ LENGTH ‖ PAYLOAD`
    #[default]
    LengthPrefixed,
    /// `SYNC ‖ PAYLOAD ‖ 0x00`
    Terminated,
}

/// What to do with text longer than `max_payload_chars`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Fail with [`WatermarkError::PayloadTooLong`]
    #[default]
    Reject,
    /// Keep the first `max_payload_chars` characters
    Truncate,
}

/// Parameters shared by the embedder and the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Edge length of a transform block in pixels
    pub block_size: usize,

    /// QIM quantization step
    pub quantization_step: f64,

    /// Sync pattern as a string of `0`/`1`
    pub sync_code: String,

    /// Maximum payload characters; decoded lengths above it are rejected
    pub max_payload_chars: usize,

    /// Carrier coefficient `(row, col)` inside the transformed block
    pub coefficient: (usize, usize),

    /// Transform domain
    pub transform: TransformKind,

    /// Packet framing
    pub framing: Framing,

    /// Handling of oversize text
    pub overflow: OverflowPolicy,

    /// Scan every pixel offset while decoding; `false` only scans `(0, 0)`
    pub exhaustive_search: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            quantization_step: DEFAULT_QUANTIZATION_STEP,
            sync_code: DEFAULT_SYNC_CODE.to_string(),
            max_payload_chars: DEFAULT_MAX_PAYLOAD_CHARS,
            coefficient: DEFAULT_COEFFICIENT,
            transform: TransformKind::default(),
            framing: Framing::default(),
            overflow: OverflowPolicy::default(),
            exhaustive_search: true,
        }
    }
}

impl WatermarkConfig {
    /// Start a builder from the defaults
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check every field for consistency
    pub fn validate(&self) -> Result<(), WatermarkError> {
        self.transform.build(self.block_size)?;

        if !self.quantization_step.is_finite() || self.quantization_step <= 0.0 {
            return Err(invalid(format!(
                "quantization_step must be positive, got {}",
                self.quantization_step
            )));
        }

        let (row, col) = self.coefficient;
        if row >= self.block_size || col >= self.block_size {
            return Err(invalid(format!(
                "coefficient ({}, {}) outside a {}x{} block",
                row, col, self.block_size, self.block_size
            )));
        }
        if self.coefficient == (0, 0) {
            return Err(invalid("coefficient (0, 0) is the block mean".to_string()));
        }

        if self.sync_code.is_empty() || self.sync_code.len() > MAX_SYNC_CODE_LEN {
            return Err(invalid(format!(
                "sync_code must have 1..={} bits, got {}",
                MAX_SYNC_CODE_LEN,
                self.sync_code.len()
            )));
        }
        if let Some(bad) = self.sync_code.chars().find(|c| *c != '0' && *c != '1') {
            return Err(invalid(format!("sync_code contains {:?}", bad)));
        }
        if !self.sync_code.contains('1') {
            return Err(invalid("sync_code must contain at least one 1".to_string()));
        }

        if self.max_payload_chars == 0 || self.max_payload_chars > MAX_LENGTH_FIELD_VALUE {
            return Err(invalid(format!(
                "max_payload_chars must be in 1..={}, got {}",
                MAX_LENGTH_FIELD_VALUE, self.max_payload_chars
            )));
        }

        Ok(())
    }

    /// Sync code as a bit vector
    pub fn sync_bits(&self) -> Vec<u8> {
        self.sync_code
            .bytes()
            .map(|b| if b == b'1' { 1 } else { 0 })
            .collect()
    }

    /// Transform implementation for this configuration, after validation
    pub fn transform(&self) -> Result<Box<dyn BlockTransform>, WatermarkError> {
        self.validate()?;
        self.transform.build(self.block_size)
    }

    /// Number of packet bits for a payload of `chars` characters
    pub fn packet_len(&self, chars: usize) -> usize {
        let framing_bits = match self.framing {
            Framing::LengthPrefixed => crate::constants::LENGTH_FIELD_WIDTH,
            Framing::Terminated => crate::constants::BITS_PER_CHAR,
        };
        self.sync_code.len() + framing_bits + chars * crate::constants::BITS_PER_CHAR
    }

    /// True if `text` only contains characters the packet can carry
    pub fn is_encodable(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii() && is_printable(c as u8))
    }
}

fn invalid(msg: String) -> WatermarkError {
    WatermarkError::InvalidConfig(msg)
}

/// Builder for [`WatermarkConfig`]
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: WatermarkConfig,
}

impl ConfigBuilder {
    /// Create a builder seeded with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block edge length
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Set the quantization step
    pub fn quantization_step(mut self, step: f64) -> Self {
        self.config.quantization_step = step;
        self
    }

    /// Set the sync code (string of `0`/`1`)
    pub fn sync_code(mut self, code: impl Into<String>) -> Self {
        self.config.sync_code = code.into();
        self
    }

    /// Set the maximum payload length
    pub fn max_payload_chars(mut self, max: usize) -> Self {
        self.config.max_payload_chars = max;
        self
    }

    /// Set the carrier coefficient
    pub fn coefficient(mut self, row: usize, col: usize) -> Self {
        self.config.coefficient = (row, col);
        self
    }

    /// Select the transform domain
    pub fn transform(mut self, kind: TransformKind) -> Self {
        self.config.transform = kind;
        self
    }

    /// Select the packet framing
    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    /// Select the overflow policy
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow = policy;
        self
    }

    /// Restrict decoding to the `(0, 0)` alignment
    pub fn aligned_only(mut self) -> Self {
        self.config.exhaustive_search = false;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<WatermarkConfig, WatermarkError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WatermarkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync_bits(), vec![1, 1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 0]);
        assert_eq!(config.packet_len(2), 12 + 8 + 16);
    }

    #[test]
    fn test_builder() {
        let config = WatermarkConfig::builder()
            .block_size(16)
            .quantization_step(40.0)
            .sync_code("10110011")
            .max_payload_chars(20)
            .transform(TransformKind::Haar)
            .framing(Framing::Terminated)
            .build()
            .unwrap();

        assert_eq!(config.block_size, 16);
        assert_eq!(config.sync_bits().len(), 8);
        // sync + payload + terminator byte
        assert_eq!(config.packet_len(3), 8 + 24 + 8);
    }

    #[test]
    fn test_rejects_bad_sync_code() {
        let result = WatermarkConfig::builder().sync_code("1102").build();
        assert!(matches!(result, Err(WatermarkError::InvalidConfig(_))));

        let result = WatermarkConfig::builder().sync_code("0000").build();
        assert!(matches!(result, Err(WatermarkError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_coefficient_outside_block() {
        let result = WatermarkConfig::builder()
            .block_size(4)
            .coefficient(4, 1)
            .build();
        assert!(matches!(result, Err(WatermarkError::InvalidConfig(_))));
    }

    #[test]
    fn test_transform_build_rejects_bad_sizes() {
        assert!(matches!(
            TransformKind::Dct.build(0),
            Err(WatermarkError::InvalidConfig(_))
        ));
        assert!(matches!(
            TransformKind::Haar.build(5),
            Err(WatermarkError::InvalidConfig(_))
        ));
        assert_eq!(TransformKind::Haar.build(4).unwrap().block_size(), 4);

        let config = WatermarkConfig {
            block_size: 0,
            ..Default::default()
        };
        assert!(config.transform().is_err());
    }

    #[test]
    fn test_rejects_odd_haar_block() {
        let result = WatermarkConfig::builder()
            .block_size(7)
            .transform(TransformKind::Haar)
            .build();
        assert!(matches!(result, Err(WatermarkError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_max_chars_beyond_length_field() {
        let result = WatermarkConfig::builder().max_payload_chars(256).build();
        assert!(matches!(result, Err(WatermarkError::InvalidConfig(_))));
    }

    #[test]
    fn test_json_uses_defaults_for_missing_fields() {
        let config: WatermarkConfig =
            serde_json::from_str(r#"{"quantization_step": 40.0, "transform": "haar"}"#).unwrap();
        assert_eq!(config.quantization_step, 40.0);
        assert_eq!(config.transform, TransformKind::Haar);
        assert_eq!(config.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(config.framing, Framing::LengthPrefixed);
    }

    #[test]
    fn test_encodable_text() {
        assert!(WatermarkConfig::is_encodable("Hello, World! ~"));
        assert!(!WatermarkConfig::is_encodable("tab\there"));
        assert!(!WatermarkConfig::is_encodable("café"));
    }
}
