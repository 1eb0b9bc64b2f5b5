pub mod compress;
pub mod decompress;
pub mod inspect;
pub mod list;
pub mod roundtrip;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Progress bar for batch work; only worth showing for more than one file.
pub(crate) fn progress_bar(len: usize) -> Option<ProgressBar> {
    (len > 1).then(|| {
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    })
}

/// Print per-file outcomes in input order and fail the command if any file
/// failed.
pub(crate) fn finish_batch(outcomes: Vec<(&Path, Result<String>)>) -> Result<()> {
    let mut failures = 0;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(line) => println!("✓ {line}"),
            Err(e) => {
                failures += 1;
                eprintln!("✗ {}: {e:#}", path.display());
            }
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} file(s) failed");
    }
    Ok(())
}

/// True when `path` has the given extension, case-insensitively.
pub(crate) fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
}
