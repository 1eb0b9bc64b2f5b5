//! The `.barch` on-disk container.
//!
//! Wraps a compressed raster together with the recovery metadata needed to
//! rebuild the original BMP: true pixel width (distinct from the padded row
//! stride), bit depth, row direction, and the color palette. The codec crate
//! only defines the in-memory artifact; this layout is owned by the tool.
//!
//! All integers are little-endian:
//!
//! ```text
//! magic            4  b"BARC"
//! version          2
//! pixel_width      4
//! bits_per_pixel   2
//! top_down         1
//! palette_len      2  entries
//! palette          4 * palette_len  (BGRA)
//! row_stride       4
//! row_count        4
//! presence         row_count.div_ceil(8)  (MSB-first, one bit per row)
//! payload_len      4
//! payload          payload_len
//! ```

use anyhow::{ensure, Context, Result};
use barch_codec::{BitReader, BitWriter, CompressedRaster};

pub const MAGIC: &[u8; 4] = b"BARC";
pub const FORMAT_VERSION: u16 = 1;

/// Image recovery metadata stored alongside the compressed raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryMeta {
    pub pixel_width: u32,
    pub bits_per_pixel: u16,
    pub top_down: bool,
    pub palette: Vec<[u8; 4]>,
}

/// A parsed `.barch` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub meta: RecoveryMeta,
    pub artifact: CompressedRaster,
}

pub fn encode_container(container: &Container) -> Vec<u8> {
    let meta = &container.meta;
    let artifact = &container.artifact;

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&meta.pixel_width.to_le_bytes());
    out.extend_from_slice(&meta.bits_per_pixel.to_le_bytes());
    out.push(meta.top_down as u8);
    out.extend_from_slice(&(meta.palette.len() as u16).to_le_bytes());
    for entry in &meta.palette {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(&artifact.row_stride.to_le_bytes());
    out.extend_from_slice(&artifact.row_count.to_le_bytes());
    let mut presence = BitWriter::new();
    for &present in &artifact.row_presence {
        presence.write_bits(&[if present { 0x80 } else { 0x00 }], 1);
    }
    out.extend_from_slice(&presence.finish());
    out.extend_from_slice(&(artifact.payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&artifact.payload);
    out
}

pub fn parse_container(data: &[u8]) -> Result<Container> {
    let mut cursor = data;

    let magic = take(&mut cursor, 4)?;
    ensure!(magic == MAGIC, "not a barch container (bad magic)");
    let version = take_u16(&mut cursor)?;
    ensure!(
        version == FORMAT_VERSION,
        "unsupported container version {version}"
    );

    let pixel_width = take_u32(&mut cursor)?;
    let bits_per_pixel = take_u16(&mut cursor)?;
    let top_down = take_u8(&mut cursor)? != 0;
    let palette_len = take_u16(&mut cursor)? as usize;
    ensure!(palette_len <= 256, "palette has {palette_len} entries");
    let mut palette = Vec::with_capacity(palette_len);
    for _ in 0..palette_len {
        let entry = take(&mut cursor, 4)?;
        palette.push([entry[0], entry[1], entry[2], entry[3]]);
    }

    let row_stride = take_u32(&mut cursor)?;
    let row_count = take_u32(&mut cursor)? as usize;
    let presence_bytes = take(&mut cursor, row_count.div_ceil(8))?;
    let mut bits = BitReader::new(presence_bytes);
    let mut row_presence = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        row_presence.push(bits.read_bit().context("presence bitmap exhausted")?);
    }

    let payload_len = take_u32(&mut cursor)? as usize;
    let payload = take(&mut cursor, payload_len)?.to_vec();
    ensure!(
        cursor.is_empty(),
        "{} trailing bytes after payload",
        cursor.len()
    );

    Ok(Container {
        meta: RecoveryMeta {
            pixel_width,
            bits_per_pixel,
            top_down,
            palette,
        },
        artifact: CompressedRaster {
            row_stride,
            row_count: row_count as u32,
            row_presence,
            payload,
        },
    })
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    ensure!(
        cursor.len() >= n,
        "container truncated ({} bytes left, {n} needed)",
        cursor.len()
    );
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}

fn take_u8(cursor: &mut &[u8]) -> Result<u8> {
    Ok(take(cursor, 1)?[0])
}

fn take_u16(cursor: &mut &[u8]) -> Result<u16> {
    let b = take(cursor, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn take_u32(cursor: &mut &[u8]) -> Result<u32> {
    let b = take(cursor, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_container() -> Container {
        Container {
            meta: RecoveryMeta {
                pixel_width: 6,
                bits_per_pixel: 8,
                top_down: true,
                palette: vec![[0, 0, 0, 0], [255, 255, 255, 0]],
            },
            artifact: CompressedRaster {
                row_stride: 8,
                row_count: 3,
                row_presence: vec![true, false, true],
                payload: vec![0xA0, 0x55],
            },
        }
    }

    #[test]
    fn encode_parse_round_trip() {
        let container = sample_container();
        let parsed = parse_container(&encode_container(&container)).expect("parse failed");
        assert_eq!(parsed, container);
    }

    #[test]
    fn round_trips_many_rows() {
        // Presence bitmap longer than one byte, with a non-multiple of 8.
        let mut container = sample_container();
        container.artifact.row_count = 11;
        container.artifact.row_presence =
            vec![true, false, true, true, false, false, true, false, true, true, false];
        let parsed = parse_container(&encode_container(&container)).expect("parse failed");
        assert_eq!(parsed, container);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_container(&sample_container());
        bytes[0] = b'X';
        let err = parse_container(&bytes).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = encode_container(&sample_container());
        bytes[4] = 99;
        let err = parse_container(&bytes).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn rejects_any_truncation() {
        let bytes = encode_container(&sample_container());
        for len in 0..bytes.len() {
            assert!(
                parse_container(&bytes[..len]).is_err(),
                "truncation to {len} bytes went undetected"
            );
        }
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut bytes = encode_container(&sample_container());
        bytes.push(0x00);
        let err = parse_container(&bytes).unwrap_err();
        assert!(err.to_string().contains("trailing"));
    }
}
