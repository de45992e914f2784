//! Recovering a watermark after the image was shifted and cropped

use authpixel_core::{decode_with_stats, embed, Plane, WatermarkConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("AuthPixel Shifted Recovery Example\n");

    let config = WatermarkConfig::default();
    let original = Plane::from_fn(160, 160, |x, y| ((3 * x + 5 * y) % 200 + 20) as f64);
    let marked = embed(&original, "Pixel", &config)?;

    // Pad 5 pixels on top and left, then drop the first 11 rows
    let shift = 5;
    let crop = 11;
    let width = marked.width() + shift;
    let height = marked.height() + shift - crop;
    let damaged = Plane::from_fn(width, height, |x, y| {
        let (sx, sy) = (x, y + crop);
        if sx < shift || sy < shift {
            128.0
        } else {
            marked.get(sx - shift, sy - shift).round().clamp(0.0, 255.0)
        }
    });

    println!("Original: {}x{}", marked.width(), marked.height());
    println!("Damaged:  {}x{} (shifted by {}, cropped {} rows)", width, height, shift, crop);

    let (result, stats) = decode_with_stats(&damaged, &config);

    println!("\nScan statistics:");
    println!("  Alignments scanned: {}", stats.offsets_scanned);
    println!("  Bits extracted:     {}", stats.bits_extracted);
    println!("  Sync matches:       {}", stats.sync_matches);
    println!("  Candidates:         {}", stats.candidates);
    println!("  Candidate rate:     {:.1}%", stats.candidate_rate());

    let result = result?;
    println!(
        "\nRecovered {:?} from {} copies ({:.1}% agreement)",
        result.text,
        result.support,
        result.agreement * 100.0
    );

    Ok(())
}
