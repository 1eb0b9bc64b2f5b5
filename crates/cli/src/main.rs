mod bmp;
mod commands;
mod container;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{compress, decompress, inspect, list, roundtrip};

/// Barch: a packer for black-and-white scan images
///
/// Compresses 8-bit BMP images into .barch containers with a run code tuned
/// for pages dominated by white background and black ink, and restores them
/// byte-for-byte.
#[derive(Parser, Debug)]
#[command(name = "barch")]
#[command(author, version, about = "Packs 8-bit scan images into .barch containers", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress 8-bit BMP images into .barch containers.
    Compress {
        /// Input images (.bmp)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Encoding strategy (row-runs, parallel-row-runs)
        #[arg(long, default_value = "parallel-row-runs")]
        codec: String,

        /// Overwrite existing output files
        #[arg(long)]
        force: bool,
    },

    /// Restore BMP images from .barch containers.
    Decompress {
        /// Input containers (.barch)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Overwrite existing output files
        #[arg(long)]
        force: bool,
    },

    /// Compress and decode in memory, verifying a byte-for-byte round trip.
    Roundtrip {
        /// Input image (.bmp)
        file: PathBuf,

        /// Encoding strategy (row-runs, parallel-row-runs)
        #[arg(long, default_value = "parallel-row-runs")]
        codec: String,
    },

    /// Show the metadata stored in a .barch container.
    Inspect {
        /// Input container (.barch)
        file: PathBuf,

        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },

    /// List images and containers in a directory.
    List {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Keep scanning every second, reprinting when the listing changes
        #[arg(long)]
        watch: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Compress {
            files,
            codec,
            force,
        } => compress::compress_files(&files, &codec, force),
        Commands::Decompress { files, force } => decompress::decompress_files(&files, force),
        Commands::Roundtrip { file, codec } => roundtrip::verify_roundtrip(&file, &codec),
        Commands::Inspect { file, format } => inspect::inspect_container(&file, &format),
        Commands::List { dir, watch } => list::list_directory(&dir, watch),
    }
}
