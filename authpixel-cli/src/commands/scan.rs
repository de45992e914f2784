use anyhow::{Context, Result};
use authpixel_core::{
    consensus::{evaluate_candidates, select_winner, GroupVerdict},
    luma::luma_plane,
    scanner::{scan_plane, ScanStats},
    WatermarkConfig,
};
use serde::Serialize;
use std::fs;
use tracing::info;

use super::load_rgb;

#[derive(Serialize)]
struct ScanReport {
    stats: ScanStats,
    groups: Vec<GroupVerdict>,
    winner: Option<String>,
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    stats_only: bool,
    config: &WatermarkConfig,
) -> Result<()> {
    info!("Scanning image: {}", input);

    let img = load_rgb(input)?;
    info!("Image size: {}x{}", img.width(), img.height());

    let (candidates, mut stats) = scan_plane(&luma_plane(&img), config)
        .with_context(|| format!("Failed to scan {}", input))?;
    let groups = evaluate_candidates(candidates, &mut stats);
    let winner = select_winner(&groups).ok().map(|found| found.text);

    // Print statistics
    println!("\n=== Scan Results ===");
    println!("Alignments scanned: {}", stats.offsets_scanned);
    println!("Bits extracted:     {}", stats.bits_extracted);
    println!("Sync matches:       {}", stats.sync_matches);
    println!("Invalid lengths:    {}", stats.invalid_lengths);
    println!("Incomplete:         {}", stats.incomplete);
    println!("Non-printable:      {}", stats.non_printable);
    println!("Candidates:         {}", stats.candidates);
    println!("Candidate rate:     {:.2}%", stats.candidate_rate());
    println!("Length groups:      {} ({} rejected)", stats.groups, stats.groups_rejected);
    println!();

    if stats_only {
        return Ok(());
    }

    let report = ScanReport {
        stats,
        groups,
        winner,
    };

    if let Some(output_path) = output {
        // Write to JSON file
        let json = serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize scan report")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Scan report written to: {}", output_path);
    } else {
        println!("=== Candidate Groups ===");
        for group in &report.groups {
            println!(
                "Length {:>2} @ offset {:?}: {} candidates, {:.1}% agreement, {}",
                group.declared_length,
                group.first_offset,
                group.support,
                group.agreement * 100.0,
                group.text.as_deref().unwrap_or("<not printable>")
            );
        }
        match &report.winner {
            Some(text) => println!("\nWinner: {}", text),
            None => println!("\nNo watermark detected"),
        }
    }

    Ok(())
}
