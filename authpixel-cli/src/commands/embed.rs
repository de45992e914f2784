use anyhow::{Context, Result};
use authpixel_core::{
    capacity, embed, embed_image, embedder::carried_bit_errors, luma::luma_plane,
    OverflowPolicy, WatermarkConfig,
};
use colored::*;
use tracing::{info, warn};

use super::load_rgb;

pub fn execute(input: &str, output: &str, text: &str, config: &WatermarkConfig) -> Result<()> {
    info!("Embedding into: {}", input);

    let img = load_rgb(input)?;
    let (width, height) = img.dimensions();
    info!("Image size: {}x{}", width, height);

    let chars = text.chars().count();
    let max = capacity(width as usize, height as usize, config)?;
    if chars > config.max_payload_chars && config.overflow == OverflowPolicy::Truncate {
        warn!(
            "Text truncated from {} to {} characters",
            chars, config.max_payload_chars
        );
    }

    let marked = embed_image(&img, text, config)
        .with_context(|| format!("Failed to embed watermark into {}", input))?;

    // What the file will actually carry after 8-bit clamping
    let expected = embed(&luma_plane(&img), text, config)?;
    let damaged = carried_bit_errors(&expected, &luma_plane(&marked), config)?;

    marked
        .save(output)
        .with_context(|| format!("Failed to write output image: {}", output))?;

    info!("Watermarked image written to: {}", output);
    println!(
        "{} Embedded {} characters into {}",
        "✓".green(),
        chars.min(config.max_payload_chars),
        output
    );
    println!("Capacity:          {} characters", max);
    if damaged > 0 {
        println!(
            "{} {} blocks lost their bit to clipping in saturated areas",
            "!".yellow(),
            damaged
        );
    }

    Ok(())
}
