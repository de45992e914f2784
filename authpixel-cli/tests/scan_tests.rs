use std::fs;
use tempfile::tempdir;

use authpixel_cli::commands::{embed, scan};
use authpixel_core::WatermarkConfig;
use image::{Rgb, RgbImage};

/// Helper: embed `text` into a textured PNG and return the marked path
fn create_marked_png(dir: &std::path::Path, text: &str) -> String {
    let plain = dir.join("plain.png");
    RgbImage::from_fn(128, 128, |x, y| {
        let v = ((3 * x + 5 * y) % 200 + 20) as u8;
        Rgb([v, v, v])
    })
    .save(&plain)
    .unwrap();

    let marked = dir.join("marked.png");
    embed::execute(
        plain.to_str().unwrap(),
        marked.to_str().unwrap(),
        text,
        &WatermarkConfig::default(),
    )
    .unwrap();
    marked.to_str().unwrap().to_string()
}

#[test]
fn test_scan_report() {
    let td = tempdir().unwrap();
    let input = create_marked_png(td.path(), "Pixel");
    let output_path = td.path().join("groups.json");

    scan::execute(
        &input,
        Some(output_path.to_str().unwrap()),
        false,
        &WatermarkConfig::default(),
    )
    .unwrap();

    assert!(output_path.exists());
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    assert_eq!(report["winner"], "Pixel");
    assert_eq!(report["stats"]["offsets_scanned"], 64);

    let groups = report["groups"].as_array().unwrap();
    assert!(!groups.is_empty());
    assert!(groups.iter().any(|g| g["text"] == "Pixel" && g["declared_length"] == 5));
}

#[test]
fn test_scan_stats_only() {
    let td = tempdir().unwrap();
    let input = create_marked_png(td.path(), "Pixel");
    let output_path = td.path().join("unused.json");

    scan::execute(
        &input,
        Some(output_path.to_str().unwrap()),
        true,
        &WatermarkConfig::default(),
    )
    .unwrap();

    // Stats only: nothing written
    assert!(!output_path.exists());
}

#[test]
fn test_scan_unmarked_image() {
    let td = tempdir().unwrap();
    let path = td.path().join("gray.png");
    RgbImage::from_pixel(64, 64, Rgb([128, 128, 128]))
        .save(&path)
        .unwrap();
    let output_path = td.path().join("groups.json");

    scan::execute(
        path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        false,
        &WatermarkConfig::default(),
    )
    .unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert!(report["winner"].is_null());
}
