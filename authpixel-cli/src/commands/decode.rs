use anyhow::{Context, Result};
use authpixel_core::{
    decode_with_stats, luma::luma_plane, ConsensusResult, ScanStats, WatermarkConfig,
    WatermarkError,
};
use colored::*;
use serde::Serialize;
use std::fs;
use tracing::info;

use super::load_rgb;

#[derive(Serialize)]
struct DecodeReport<'a> {
    input: &'a str,
    result: Option<&'a ConsensusResult>,
    stats: &'a ScanStats,
}

/// Decode `input`, returning the recovered text if any
pub fn execute(input: &str, output: Option<&str>, config: &WatermarkConfig) -> Result<Option<String>> {
    info!("Decoding: {}", input);

    let img = load_rgb(input)?;
    let (result, stats) = decode_with_stats(&luma_plane(&img), config);

    let result = match result {
        Ok(found) => Some(found),
        Err(WatermarkError::NoWatermarkFound) => None,
        Err(e) => return Err(e).with_context(|| format!("Failed to decode {}", input)),
    };

    match &result {
        Some(found) => {
            println!("{} Watermark: {}", "✓".green(), found.text.bold());
            println!("Support:           {} candidates", found.support);
            println!("Agreement:         {:.2}%", found.agreement * 100.0);
        }
        None => println!("{} No watermark detected", "✗".red()),
    }

    if let Some(output_path) = output {
        let report = DecodeReport {
            input,
            result: result.as_ref(),
            stats: &stats,
        };
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize decode report")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Decode report written to: {}", output_path);
    }

    Ok(result.map(|found| found.text))
}
