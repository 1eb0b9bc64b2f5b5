use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::printing::human_bytes;

/// Extensions shown by the browser listing. PNGs show up so the user sees
/// them, but compress/decompress only accept .bmp and .barch.
const LISTED_EXTENSIONS: [&str; 3] = ["bmp", "barch", "png"];

pub fn list_directory(dir: &Path, watch: bool) -> Result<()> {
    if !watch {
        print_listing(&scan(dir)?, dir);
        return Ok(());
    }

    // Re-scan once a second, reprinting only when the listing changed.
    let mut last: Option<Vec<Entry>> = None;
    loop {
        let entries = scan(dir)?;
        if last.as_ref() != Some(&entries) {
            print_listing(&entries, dir);
            last = Some(entries);
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    size: u64,
}

fn scan(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !LISTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            continue;
        }
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: entry.metadata()?.len(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn print_listing(entries: &[Entry], dir: &Path) {
    if entries.is_empty() {
        println!("No image files found in {}", dir.display());
        return;
    }

    println!("\n🗂  {} image file(s) in {}:", entries.len(), dir.display());
    println!("{}", "=".repeat(50));
    for entry in entries {
        println!("  {:>10}  {}", human_bytes(entry.size), entry.name);
    }
}
