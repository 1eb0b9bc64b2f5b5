use crate::error::CodecError;
use crate::raster::{CompressedRaster, Raster};

/// Core trait for raster codecs.
///
/// Every strategy must turn a raster into a compressed artifact and back:
/// 1. `encode`: infallible. Any byte content produces a valid (if sometimes
///    expanded) artifact.
/// 2. `decode`: all-or-nothing. A malformed artifact yields
///    [`CodecError::CorruptStream`], never a partial raster.
pub trait Codec {
    fn encode(&self, raster: &Raster) -> CompressedRaster;
    fn decode(&self, artifact: &CompressedRaster) -> Result<Raster, CodecError>;
}
