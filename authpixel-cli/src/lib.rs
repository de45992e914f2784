//! Library entry for authpixel-cli used by integration tests.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use authpixel_core::{Framing, OverflowPolicy, TransformKind, WatermarkConfig};
use std::fs;

/// Transform domain selectable on the command line
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum TransformArg {
    /// 8x8 style DCT
    Dct,
    /// Single-level Haar wavelet
    Haar,
}

impl From<TransformArg> for TransformKind {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::Dct => TransformKind::Dct,
            TransformArg::Haar => TransformKind::Haar,
        }
    }
}

/// Packet framing selectable on the command line
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum FramingArg {
    /// Sync, 8-bit length, payload
    Length,
    /// Sync, payload, zero byte
    Terminator,
}

impl From<FramingArg> for Framing {
    fn from(arg: FramingArg) -> Self {
        match arg {
            FramingArg::Length => Framing::LengthPrefixed,
            FramingArg::Terminator => Framing::Terminated,
        }
    }
}

/// Watermark settings shared by every subcommand
///
/// Values from `--config` are loaded first; individual flags override them.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct ConfigArgs {
    /// JSON file with a full or partial watermark configuration
    #[arg(long = "config")]
    pub config_file: Option<String>,

    /// Block edge length in pixels
    #[arg(long)]
    pub block_size: Option<usize>,

    /// Quantization step
    #[arg(long)]
    pub step: Option<f64>,

    /// Sync code as a string of 0 and 1
    #[arg(long)]
    pub sync: Option<String>,

    /// Maximum payload length in characters
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Transform domain
    #[arg(long, value_enum)]
    pub transform: Option<TransformArg>,

    /// Packet framing
    #[arg(long, value_enum)]
    pub framing: Option<FramingArg>,

    /// Truncate text longer than the maximum instead of failing
    #[arg(long)]
    pub truncate: bool,

    /// Only try the grid alignment at (0, 0) when decoding
    #[arg(long)]
    pub aligned_only: bool,
}

impl ConfigArgs {
    /// Build and validate the effective configuration
    pub fn resolve(&self) -> Result<WatermarkConfig> {
        let mut config = match &self.config_file {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("Failed to parse config file: {}", path))?
            }
            None => WatermarkConfig::default(),
        };

        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(step) = self.step {
            config.quantization_step = step;
        }
        if let Some(sync) = &self.sync {
            config.sync_code = sync.clone();
        }
        if let Some(max) = self.max_chars {
            config.max_payload_chars = max;
        }
        if let Some(transform) = self.transform {
            config.transform = transform.into();
        }
        if let Some(framing) = self.framing {
            config.framing = framing.into();
        }
        if self.truncate {
            config.overflow = OverflowPolicy::Truncate;
        }
        if self.aligned_only {
            config.exhaustive_search = false;
        }

        config.validate().context("Invalid watermark configuration")?;
        Ok(config)
    }
}
