use anyhow::Result;
use authpixel_core::{capacity, types::BlockGrid, WatermarkConfig};
use tracing::info;

use super::load_rgb;

/// Report how much text `input` can carry; returns the character count
pub fn execute(input: &str, config: &WatermarkConfig) -> Result<usize> {
    info!("Measuring capacity of: {}", input);

    let img = load_rgb(input)?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let max = capacity(width, height, config)?;
    let grid = BlockGrid::aligned(width, height, config.block_size);

    println!("\n=== Capacity ===");
    println!("Image size:        {}x{}", width, height);
    println!("Block grid:        {}x{} ({} blocks)", grid.rows, grid.cols, grid.total_blocks());
    println!("Packet overhead:   {} bits", config.packet_len(0));
    if max == 0 {
        println!("Max text length:   0 (image too small)");
    } else {
        println!(
            "Max text length:   {} characters ({} copies at that length)",
            max,
            grid.total_blocks() / config.packet_len(max)
        );
    }

    Ok(max)
}
