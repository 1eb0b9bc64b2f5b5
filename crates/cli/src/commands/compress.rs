use anyhow::{anyhow, bail, Context, Result};
use barch_codec::CodecStrategy;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bmp::BmpImage;
use crate::commands::{finish_batch, has_extension, progress_bar};
use crate::container::{encode_container, Container, RecoveryMeta};
use crate::printing::{human_bytes, ratio_percent};

pub fn compress_files(files: &[PathBuf], codec_name: &str, force: bool) -> Result<()> {
    let strategy: CodecStrategy = codec_name.parse().map_err(|e: String| anyhow!(e))?;

    let pb = progress_bar(files.len());
    let outcomes: Vec<(&Path, Result<String>)> = files
        .par_iter()
        .map(|path| {
            let outcome = compress_one(path, strategy, force);
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

fn compress_one(path: &Path, strategy: CodecStrategy, force: bool) -> Result<String> {
    if !has_extension(path, "bmp") {
        bail!("incorrect file extension (use only .bmp or .barch)");
    }

    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image = BmpImage::parse(&data)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let artifact = strategy.encode(&image.to_raster());
    let container = Container {
        meta: RecoveryMeta {
            pixel_width: image.pixel_width,
            bits_per_pixel: 8,
            top_down: image.top_down,
            palette: image.palette,
        },
        artifact,
    };

    let out_path = packed_path(path);
    if out_path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            out_path.display()
        );
    }
    let encoded = encode_container(&container);
    fs::write(&out_path, &encoded)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    Ok(format!(
        "{} → {} ({} → {}, {:.1}%)",
        path.display(),
        out_path.display(),
        human_bytes(data.len() as u64),
        human_bytes(encoded.len() as u64),
        ratio_percent(encoded.len() as u64, data.len() as u64),
    ))
}

/// `page.bmp` becomes `page_packed.barch` next to it.
fn packed_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    path.with_file_name(format!("{stem}_packed.barch"))
}
