use crate::bitstream::BitWriter;
use crate::error::CodecError;
use crate::raster::{CompressedRaster, Raster, BACKGROUND};
use crate::strategies::rowwise::{encode_row, RowRuns};
use crate::traits::Codec;
use rayon::prelude::*;

/// Strategy: row-parallel run encoding.
///
/// # How it works
///
/// Rows are independent on the encode side: each non-blank row becomes a
/// self-contained chunk of tag bits. The chunks are produced concurrently on
/// the rayon pool and then spliced into the output writer in strictly
/// increasing row order, since row index determines both the presence bitmap
/// position and the payload ordering. The result is bit-identical to
/// [`RowRuns`].
///
/// Decoding stays sequential: tag boundaries in the payload are
/// data-dependent, so a row's start offset is only known once the previous
/// row has been decoded. `decode` therefore delegates to [`RowRuns`].
///
/// # Why use this?
///
/// *   **Speed:** scan pages are tall; thousands of rows spread well across
///     cores.
/// *   **Overhead:** slightly slower for small rasters (pool setup and one
///     extra buffer per row).
pub struct ParallelRowRuns;

impl Codec for ParallelRowRuns {
    fn encode(&self, raster: &Raster) -> CompressedRaster {
        let rows: Vec<&[u8]> = raster.rows().collect();

        // None marks an all-background row; Some carries the row's bit chunk
        // and its exact bit length (the buffer is zero-padded to a byte).
        let chunks: Vec<Option<(Vec<u8>, usize)>> = rows
            .par_iter()
            .map(|row| {
                if row.iter().all(|&b| b == BACKGROUND) {
                    None
                } else {
                    let mut writer = BitWriter::new();
                    encode_row(row, &mut writer);
                    let bit_len = writer.bit_len();
                    Some((writer.finish(), bit_len))
                }
            })
            .collect();

        let mut row_presence = Vec::with_capacity(chunks.len());
        let mut writer = BitWriter::new();
        for chunk in &chunks {
            match chunk {
                None => row_presence.push(false),
                Some((bits, bit_len)) => {
                    row_presence.push(true);
                    writer.write_bits(bits, *bit_len);
                }
            }
        }

        CompressedRaster {
            row_stride: raster.row_stride,
            row_count: raster.row_count,
            row_presence,
            payload: writer.finish(),
        }
    }

    fn decode(&self, artifact: &CompressedRaster) -> Result<Raster, CodecError> {
        RowRuns.decode(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn noisy_page(stride: u32, rows: u32) -> Raster {
        let mut rng = rand::thread_rng();
        let bytes: Vec<u8> = (0..(stride * rows) as usize)
            .map(|_| match rng.gen_range(0..8) {
                0..=4 => 0xFF,
                5 => 0x00,
                _ => rng.gen(),
            })
            .collect();
        Raster::new(stride, rows, bytes)
    }

    #[test]
    fn parallel_output_matches_sequential() {
        for raster in [
            noisy_page(1, 64),
            noisy_page(5, 33),
            noisy_page(256, 100),
            Raster::new(4, 2, vec![0xFF; 8]),
            Raster::new(0, 3, Vec::new()),
        ] {
            let sequential = RowRuns.encode(&raster);
            let parallel = ParallelRowRuns.encode(&raster);
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn parallel_round_trip() {
        let raster = noisy_page(640, 480);
        let encoded = ParallelRowRuns.encode(&raster);
        let decoded = ParallelRowRuns.decode(&encoded).expect("decoding failed");
        assert_eq!(decoded, raster);
    }
}
