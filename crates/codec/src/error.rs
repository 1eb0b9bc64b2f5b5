use thiserror::Error;

/// Error type for codec operations.
///
/// Decoding is all-or-nothing: `CorruptStream` means the artifact cannot be
/// trusted and no partial raster is returned. Encoding never fails.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The tag stream was malformed or under-supplied bytes.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),
}
