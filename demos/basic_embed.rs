//! Basic embedding example

use authpixel_core::{capacity, decode_image, embed_image, WatermarkConfig};
use image::{Rgb, RgbImage};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("AuthPixel Basic Embedding Example\n");

    let config = WatermarkConfig::default();

    // A synthetic gradient stands in for a photo
    let img = RgbImage::from_fn(256, 192, |x, y| {
        Rgb([(x % 256) as u8, (y * 255 / 191) as u8, 128])
    });

    let (w, h) = img.dimensions();
    println!(
        "Image {}x{} holds up to {} characters",
        w,
        h,
        capacity(w as usize, h as usize, &config)?
    );

    let text = "(c) AuthPixel demo";
    let marked = embed_image(&img, text, &config)?;
    marked.save("example_output.png")?;
    println!("Embedded {:?} and wrote example_output.png", text);

    let reloaded = image::open("example_output.png")?.to_rgb8();
    let result = decode_image(&reloaded, &config)?;
    println!(
        "Recovered {:?} from {} copies ({:.1}% agreement)",
        result.text,
        result.support,
        result.agreement * 100.0
    );

    println!("Use 'authpixel decode --input example_output.png' to read it back");
    Ok(())
}
