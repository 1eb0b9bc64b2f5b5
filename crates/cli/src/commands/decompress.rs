use anyhow::{bail, ensure, Context, Result};
use barch_codec::{Codec, RowRuns};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bmp::BmpImage;
use crate::commands::{finish_batch, has_extension, progress_bar};
use crate::container::parse_container;
use crate::printing::human_bytes;

pub fn decompress_files(files: &[PathBuf], force: bool) -> Result<()> {
    let pb = progress_bar(files.len());
    let outcomes: Vec<(&Path, Result<String>)> = files
        .par_iter()
        .map(|path| {
            let outcome = decompress_one(path, force);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            (path.as_path(), outcome)
        })
        .collect();
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    finish_batch(outcomes)
}

fn decompress_one(path: &Path, force: bool) -> Result<String> {
    if !has_extension(path, "barch") {
        bail!("incorrect file extension (use only .bmp or .barch)");
    }

    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let container = parse_container(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    ensure!(
        container.meta.bits_per_pixel == 8,
        "unsupported pixel format ({} bpp)",
        container.meta.bits_per_pixel
    );

    // All-or-nothing: a corrupt artifact leaves no output file behind.
    let raster = RowRuns
        .decode(&container.artifact)
        .context("artifact cannot be trusted")?;
    let image = BmpImage::from_raster(
        raster,
        container.meta.pixel_width,
        container.meta.top_down,
        container.meta.palette,
    )?;

    let out_path = unpacked_path(path);
    if out_path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            out_path.display()
        );
    }
    let bytes = image.to_bytes();
    fs::write(&out_path, &bytes)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    Ok(format!(
        "{} → {} ({} → {})",
        path.display(),
        out_path.display(),
        human_bytes(data.len() as u64),
        human_bytes(bytes.len() as u64),
    ))
}

/// `page_packed.barch` becomes `page_packed_unpacked.bmp` next to it.
fn unpacked_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    path.with_file_name(format!("{stem}_unpacked.bmp"))
}
