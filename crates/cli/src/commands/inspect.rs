use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::container::parse_container;
use crate::printing::{human_bytes, ratio_percent};

#[derive(Debug, Serialize)]
struct Report {
    file: String,
    pixel_width: u32,
    bits_per_pixel: u16,
    top_down: bool,
    palette_entries: usize,
    row_stride: u32,
    row_count: u32,
    blank_rows: usize,
    encoded_rows: usize,
    payload_bytes: usize,
    raw_bytes: u64,
    container_bytes: u64,
    ratio_percent: f64,
}

pub fn inspect_container(path: &Path, format: &str) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let container = parse_container(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let meta = &container.meta;
    let artifact = &container.artifact;
    let raw_bytes = artifact.row_stride as u64 * artifact.row_count as u64;
    let report = Report {
        file: path.display().to_string(),
        pixel_width: meta.pixel_width,
        bits_per_pixel: meta.bits_per_pixel,
        top_down: meta.top_down,
        palette_entries: meta.palette.len(),
        row_stride: artifact.row_stride,
        row_count: artifact.row_count,
        blank_rows: artifact.blank_rows(),
        encoded_rows: artifact.present_rows(),
        payload_bytes: artifact.payload.len(),
        raw_bytes,
        container_bytes: data.len() as u64,
        ratio_percent: ratio_percent(data.len() as u64, raw_bytes),
    };

    match format {
        "pretty" => print_pretty(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => bail!("unknown format: {other}. Available: pretty, json"),
    }

    Ok(())
}

fn print_pretty(report: &Report) {
    println!("\n📦 Container: {}", report.file);
    println!("{}", "=".repeat(50));
    println!(
        "Image: {} px wide, {} bpp, {} palette entries{}",
        report.pixel_width,
        report.bits_per_pixel,
        report.palette_entries,
        if report.top_down { ", top-down" } else { "" },
    );
    println!(
        "Raster: stride {} bytes, {} rows ({} blank, {} encoded)",
        report.row_stride, report.row_count, report.blank_rows, report.encoded_rows,
    );
    println!(
        "Payload: {} for {} raw ({:.1}% on disk)",
        human_bytes(report.payload_bytes as u64),
        human_bytes(report.raw_bytes),
        report.ratio_percent,
    );
}
