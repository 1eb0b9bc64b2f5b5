//! Lossless run codec for 8-bit byte rasters.
//!
//! Compresses row-major byte buffers dominated by background (0xFF) and
//! foreground (0x00) values, as produced by black-and-white scan pages, and
//! reconstructs them byte-for-byte. Arbitrary byte content stays correct
//! through a literal fallback, just without the size win.

mod bitstream;
mod error;
mod raster;
mod strategies;
mod traits;

pub use bitstream::{BitReader, BitWriter};
pub use error::CodecError;
pub use raster::{CompressedRaster, Raster, BACKGROUND, FOREGROUND};
pub use strategies::{ParallelRowRuns, RowRuns};
pub use traits::Codec;

use serde::{Deserialize, Serialize};

/// Strategies for encoding rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecStrategy {
    /// Sequential row-by-row encoding.
    RowRuns,
    /// Row-parallel encoding on the rayon pool, bit-identical output.
    ParallelRowRuns,
}

impl CodecStrategy {
    /// Encode using the selected strategy.
    pub fn encode(&self, raster: &Raster) -> CompressedRaster {
        match self {
            CodecStrategy::RowRuns => RowRuns.encode(raster),
            CodecStrategy::ParallelRowRuns => ParallelRowRuns.encode(raster),
        }
    }

    /// Decode using the selected strategy.
    pub fn decode(&self, artifact: &CompressedRaster) -> Result<Raster, CodecError> {
        match self {
            CodecStrategy::RowRuns => RowRuns.decode(artifact),
            CodecStrategy::ParallelRowRuns => ParallelRowRuns.decode(artifact),
        }
    }
}

impl Default for CodecStrategy {
    fn default() -> Self {
        Self::ParallelRowRuns
    }
}

impl std::fmt::Display for CodecStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowRuns => write!(f, "row-runs"),
            Self::ParallelRowRuns => write!(f, "parallel-row-runs"),
        }
    }
}

impl std::str::FromStr for CodecStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "row-runs" => Ok(Self::RowRuns),
            "parallel-row-runs" => Ok(Self::ParallelRowRuns),
            _ => Err(format!(
                "Unknown codec strategy: {s}. Available: row-runs, parallel-row-runs"
            )),
        }
    }
}

/// Trait-object access when enum dispatch is not enough.
impl Codec for CodecStrategy {
    fn encode(&self, raster: &Raster) -> CompressedRaster {
        CodecStrategy::encode(self, raster)
    }

    fn decode(&self, artifact: &CompressedRaster) -> Result<Raster, CodecError> {
        CodecStrategy::decode(self, artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_round_trip() {
        let raster = Raster::new(
            6,
            3,
            vec![
                0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // blank row
                0x00, 0x00, 0x00, 0x00, 0x12, 0x34, // run + literal
                0x7F, 0x7F, 0x7F, 0x7F, 0xFF, 0x00, // literal fallback
            ],
        );

        for strategy in [CodecStrategy::RowRuns, CodecStrategy::ParallelRowRuns] {
            let encoded = strategy.encode(&raster);
            assert_eq!(encoded.row_presence, vec![false, true, true]);
            let decoded = strategy.decode(&encoded).expect("decoding failed");
            assert_eq!(decoded, raster);
        }
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [CodecStrategy::RowRuns, CodecStrategy::ParallelRowRuns] {
            let name = strategy.to_string();
            assert_eq!(name.parse::<CodecStrategy>().unwrap(), strategy);
        }
        assert!("lzw".parse::<CodecStrategy>().is_err());
    }
}
