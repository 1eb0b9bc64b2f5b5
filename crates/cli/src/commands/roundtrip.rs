use anyhow::{anyhow, bail, ensure, Context, Result};
use barch_codec::CodecStrategy;
use std::fs;
use std::path::Path;

use crate::bmp::BmpImage;
use crate::commands::has_extension;
use crate::container::{encode_container, Container, RecoveryMeta};
use crate::printing::{human_bytes, ratio_percent};

/// Compress and decode in memory, verifying the codec restores the raster
/// byte-for-byte. Writes nothing.
pub fn verify_roundtrip(path: &Path, codec_name: &str) -> Result<()> {
    let strategy: CodecStrategy = codec_name.parse().map_err(|e: String| anyhow!(e))?;
    if !has_extension(path, "bmp") {
        bail!("incorrect file extension (use only .bmp or .barch)");
    }

    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image = BmpImage::parse(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let raster = image.to_raster();

    let artifact = strategy.encode(&raster);
    let restored = strategy
        .decode(&artifact)
        .context("round trip decode failed")?;
    ensure!(
        restored == raster,
        "round trip mismatch: decoded raster differs from input"
    );

    let container = Container {
        meta: RecoveryMeta {
            pixel_width: image.pixel_width,
            bits_per_pixel: 8,
            top_down: image.top_down,
            palette: image.palette,
        },
        artifact,
    };
    let packed_len = encode_container(&container).len() as u64;

    println!("✓ {} round-trips byte-for-byte", path.display());
    println!(
        "  {} → {} ({:.1}%), {} of {} rows blank",
        human_bytes(data.len() as u64),
        human_bytes(packed_len),
        ratio_percent(packed_len, data.len() as u64),
        container.artifact.blank_rows(),
        container.artifact.row_count,
    );

    Ok(())
}
