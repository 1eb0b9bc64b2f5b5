use crate::bitstream::{BitReader, BitWriter};
use crate::error::CodecError;
use crate::raster::{CompressedRaster, Raster, BACKGROUND, FOREGROUND};
use crate::traits::Codec;

/// A run tag always covers exactly this many identical bytes.
pub(crate) const RUN_LEN: usize = 4;

/// Prefix code identifying the next encoded unit.
///
/// `BackgroundRun` gets the single-bit code because all-white stretches
/// dominate scan pages; everything else pays a second bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    /// `0`: four bytes of [`BACKGROUND`].
    BackgroundRun,
    /// `10`: four bytes of [`FOREGROUND`].
    ForegroundRun,
    /// `11`, followed by 1..=4 raw bytes.
    Literal,
}

impl Tag {
    /// Code value, MSB-aligned in a byte.
    fn code(self) -> u8 {
        match self {
            Tag::BackgroundRun => 0x00,
            Tag::ForegroundRun => 0x80,
            Tag::Literal => 0xC0,
        }
    }

    fn bit_count(self) -> usize {
        match self {
            Tag::BackgroundRun => 1,
            Tag::ForegroundRun | Tag::Literal => 2,
        }
    }
}

fn write_tag(out: &mut BitWriter, tag: Tag) {
    out.write_bits(&[tag.code()], tag.bit_count());
}

fn write_literal(out: &mut BitWriter, bytes: &[u8]) {
    write_tag(out, Tag::Literal);
    out.write_bits(bytes, bytes.len() * 8);
}

/// Encode one non-blank row as a sequence of tagged chunks summing exactly
/// to the row length.
///
/// The cursor marks the start of the current chunk and the probe column
/// counts consecutive bytes equal to the chunk's first byte. Four matches
/// become a run tag (or a 4-byte literal for a non-extreme value); a
/// mismatch, or running out of row, flushes a literal of up to 4 bytes.
pub(crate) fn encode_row(row: &[u8], out: &mut BitWriter) {
    let mut start = 0usize;
    let mut reference = row[0];
    let mut matched = 0usize;
    let mut column = 0usize;

    while column < row.len() {
        if row[column] == reference {
            matched += 1;
            if matched == RUN_LEN {
                matched = 0;
                match reference {
                    FOREGROUND => write_tag(out, Tag::ForegroundRun),
                    BACKGROUND => write_tag(out, Tag::BackgroundRun),
                    _ => write_literal(out, &row[start..start + RUN_LEN]),
                }
                start += RUN_LEN;
                if start < row.len() {
                    reference = row[start];
                }
                column = start;
                continue;
            }
        } else {
            matched = 0;
            let end = (start + RUN_LEN).min(row.len());
            write_literal(out, &row[start..end]);
            start = end;
            if start < row.len() {
                reference = row[start];
            }
            column = start;
            continue;
        }

        if column == row.len() - 1 {
            // Trailing partial run: flush whatever the cursor still covers.
            write_literal(out, &row[start..]);
        }
        column += 1;
    }
}

fn read_tag(reader: &mut BitReader) -> Result<Tag, CodecError> {
    let first = reader
        .read_bit()
        .ok_or_else(|| CodecError::CorruptStream("stream ended before a tag code".into()))?;
    // A lone 0 bit is already the complete BackgroundRun code; only the
    // two-bit codes need a second read.
    if !first {
        return Ok(Tag::BackgroundRun);
    }
    let second = reader
        .read_bit()
        .ok_or_else(|| CodecError::CorruptStream("stream ended inside a tag code".into()))?;
    Ok(if second {
        Tag::Literal
    } else {
        Tag::ForegroundRun
    })
}

/// Shared decode path: the payload is a single sequential bit stream, so
/// both strategies decode through here.
pub(crate) fn decode_rows(artifact: &CompressedRaster) -> Result<Raster, CodecError> {
    if artifact.row_presence.len() != artifact.row_count as usize {
        return Err(CodecError::CorruptStream(format!(
            "presence bitmap has {} entries for {} rows",
            artifact.row_presence.len(),
            artifact.row_count
        )));
    }

    let stride = artifact.row_stride as usize;
    let expected = stride * artifact.row_count as usize;
    let mut reader = BitReader::new(&artifact.payload);
    let mut bytes = Vec::with_capacity(expected);

    for &present in &artifact.row_presence {
        if !present {
            bytes.resize(bytes.len() + stride, BACKGROUND);
            continue;
        }

        let mut row_bytes = 0usize;
        while row_bytes < stride && !reader.at_end() {
            match read_tag(&mut reader)? {
                // Run tags always contribute their full 4 bytes, even past
                // the row budget; the tally check below catches the
                // inconsistency.
                Tag::BackgroundRun => {
                    bytes.resize(bytes.len() + RUN_LEN, BACKGROUND);
                    row_bytes += RUN_LEN;
                }
                Tag::ForegroundRun => {
                    bytes.resize(bytes.len() + RUN_LEN, FOREGROUND);
                    row_bytes += RUN_LEN;
                }
                Tag::Literal => {
                    let want = RUN_LEN.min(stride - row_bytes);
                    for _ in 0..want {
                        // A zero-filled partial byte must never count as
                        // produced, or trailing truncation could slip past
                        // the tally check.
                        if reader.remaining_bits() < 8 {
                            break;
                        }
                        bytes.push(reader.read_byte());
                        row_bytes += 1;
                    }
                }
            }
        }
    }

    if bytes.len() != expected {
        return Err(CodecError::CorruptStream(format!(
            "decoded {} bytes, expected {}",
            bytes.len(),
            expected
        )));
    }

    Ok(Raster {
        row_stride: artifact.row_stride,
        row_count: artifact.row_count,
        bytes,
    })
}

/// Strategy: sequential row-by-row run encoding, the reference
/// implementation.
pub struct RowRuns;

impl Codec for RowRuns {
    fn encode(&self, raster: &Raster) -> CompressedRaster {
        let mut writer = BitWriter::new();
        let mut row_presence = Vec::with_capacity(raster.row_count as usize);

        for row in raster.rows() {
            if row.iter().all(|&b| b == BACKGROUND) {
                row_presence.push(false);
            } else {
                row_presence.push(true);
                encode_row(row, &mut writer);
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
        decode_rows(artifact)
    }
}
