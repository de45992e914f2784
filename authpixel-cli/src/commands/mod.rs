pub mod capacity;
pub mod decode;
pub mod embed;
pub mod scan;

use anyhow::{Context, Result};
use image::RgbImage;

/// Open any supported image file as 8-bit RGB
pub(crate) fn load_rgb(path: &str) -> Result<RgbImage> {
    let img = image::open(path).with_context(|| format!("Failed to read input image: {}", path))?;
    Ok(img.to_rgb8())
}
