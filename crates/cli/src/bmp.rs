//! Minimal reader/writer for uncompressed 8-bit palettized BMP files.
//!
//! Only the subset the packer needs: BITMAPFILEHEADER, a 40-byte (or
//! larger) BITMAPINFOHEADER, a BGRA palette, and an uncompressed 8 bpp
//! pixel array. Rows are padded to 4-byte boundaries in the file, and that
//! padded size is exactly the stride the codec compresses, so stride and
//! pixel width genuinely differ for most images.

use anyhow::{ensure, Result};
use barch_codec::Raster;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;

/// Row size of an 8 bpp BMP: pixel bytes padded to a 4-byte boundary.
pub fn bmp_stride(pixel_width: u32) -> u32 {
    (pixel_width + 3) & !3
}

/// An 8-bit palettized BMP held in codec-ready form.
///
/// `pixels` keeps rows exactly as stored in the file (bottom-up unless
/// `top_down`), padded to `row_stride` bytes. The codec neither knows nor
/// cares about row direction, so it is preserved as metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpImage {
    pub pixel_width: u32,
    pub row_count: u32,
    pub top_down: bool,
    pub palette: Vec<[u8; 4]>,
    pub row_stride: u32,
    pub pixels: Vec<u8>,
}

impl BmpImage {
    pub fn parse(data: &[u8]) -> Result<Self> {
        ensure!(
            data.len() >= FILE_HEADER_LEN + INFO_HEADER_LEN,
            "file too short for BMP headers"
        );
        ensure!(&data[0..2] == b"BM", "not a BMP file (missing BM signature)");

        let data_offset = read_u32(data, 10) as usize;
        let header_size = read_u32(data, 14) as usize;
        ensure!(
            header_size >= INFO_HEADER_LEN,
            "unsupported BMP info header (size {header_size})"
        );

        let width = read_i32(data, 18);
        let height = read_i32(data, 22);
        let planes = read_u16(data, 26);
        let bpp = read_u16(data, 28);
        let compression = read_u32(data, 30);
        ensure!(planes == 1, "bad BMP plane count {planes}");
        ensure!(bpp == 8, "only 8-bit BMPs are supported (got {bpp} bpp)");
        ensure!(compression == 0, "only uncompressed BMPs are supported");
        ensure!(width > 0 && height != 0, "bad BMP dimensions {width}x{height}");

        let colors_used = read_u32(data, 46) as usize;
        let palette_len = if colors_used == 0 { 256 } else { colors_used };
        ensure!(
            palette_len <= 256,
            "BMP palette has {palette_len} entries"
        );
        let palette_offset = FILE_HEADER_LEN + header_size;
        ensure!(
            data.len() >= palette_offset + 4 * palette_len,
            "BMP truncated inside palette"
        );
        let palette: Vec<[u8; 4]> = data[palette_offset..palette_offset + 4 * palette_len]
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();

        let top_down = height < 0;
        let pixel_width = width as u32;
        let row_count = height.unsigned_abs();
        let row_stride = bmp_stride(pixel_width);
        let pixels_len = row_stride as usize * row_count as usize;
        ensure!(
            data.len() >= data_offset + pixels_len,
            "BMP truncated inside pixel data"
        );
        let pixels = data[data_offset..data_offset + pixels_len].to_vec();

        Ok(Self {
            pixel_width,
            row_count,
            top_down,
            palette,
            row_stride,
            pixels,
        })
    }

    /// Serialize to the canonical layout this tool writes: 40-byte info
    /// header, palette, pixel data, no gaps.
    pub fn to_bytes(&self) -> Vec<u8> {
        let data_offset = FILE_HEADER_LEN + INFO_HEADER_LEN + 4 * self.palette.len();
        let image_size = self.pixels.len();
        let file_size = data_offset + image_size;
        let height = if self.top_down {
            -(self.row_count as i32)
        } else {
            self.row_count as i32
        };

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
        out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
        out.extend_from_slice(&(self.pixel_width as i32).to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
        out.extend_from_slice(&(image_size as u32).to_le_bytes());
        out.extend_from_slice(&2835i32.to_le_bytes()); // 72 dpi
        out.extend_from_slice(&2835i32.to_le_bytes());
        out.extend_from_slice(&(self.palette.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for entry in &self.palette {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(&self.pixels);
        out
    }

    /// Hand the padded pixel rows to the codec.
    pub fn to_raster(&self) -> Raster {
        Raster::new(self.row_stride, self.row_count, self.pixels.clone())
    }

    /// Rebuild an image from a decoded raster plus recovery metadata.
    pub fn from_raster(
        raster: Raster,
        pixel_width: u32,
        top_down: bool,
        palette: Vec<[u8; 4]>,
    ) -> Result<Self> {
        ensure!(
            bmp_stride(pixel_width) == raster.row_stride,
            "pixel width {pixel_width} does not fit row stride {}",
            raster.row_stride
        );
        Ok(Self {
            pixel_width,
            row_count: raster.row_count,
            top_down,
            palette,
            row_stride: raster.row_stride,
            pixels: raster.bytes,
        })
    }
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    read_u32(data, offset) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grayscale_palette() -> Vec<[u8; 4]> {
        (0..=255u8).map(|v| [v, v, v, 0]).collect()
    }

    fn sample_image(pixel_width: u32, row_count: u32, top_down: bool) -> BmpImage {
        let stride = bmp_stride(pixel_width);
        let pixels: Vec<u8> = (0..stride * row_count).map(|i| (i % 251) as u8).collect();
        BmpImage {
            pixel_width,
            row_count,
            top_down,
            palette: grayscale_palette(),
            row_stride: stride,
            pixels,
        }
    }

    #[test]
    fn stride_is_padded_to_four_bytes() {
        assert_eq!(bmp_stride(1), 4);
        assert_eq!(bmp_stride(3), 4);
        assert_eq!(bmp_stride(4), 4);
        assert_eq!(bmp_stride(5), 8);
        assert_eq!(bmp_stride(640), 640);
    }

    #[test]
    fn write_parse_round_trip() {
        for (w, h, top_down) in [(3u32, 2u32, false), (640, 480, false), (5, 7, true)] {
            let image = sample_image(w, h, top_down);
            let parsed = BmpImage::parse(&image.to_bytes()).expect("parse failed");
            assert_eq!(parsed, image);
        }
    }

    #[test]
    fn rejects_non_bmp() {
        assert!(BmpImage::parse(b"PNG whatever this is").is_err());
    }

    #[test]
    fn rejects_wrong_depth() {
        let mut bytes = sample_image(4, 4, false).to_bytes();
        bytes[28] = 24; // bpp field
        let err = BmpImage::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("8-bit"));
    }

    #[test]
    fn rejects_truncated_pixels() {
        let mut bytes = sample_image(16, 16, false).to_bytes();
        bytes.truncate(bytes.len() - 10);
        let err = BmpImage::parse(&bytes).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn raster_round_trip_preserves_rows() {
        let image = sample_image(5, 3, false);
        let raster = image.to_raster();
        assert_eq!(raster.row_stride, 8);
        let rebuilt = BmpImage::from_raster(
            raster,
            image.pixel_width,
            image.top_down,
            image.palette.clone(),
        )
        .expect("rebuild failed");
        assert_eq!(rebuilt, image);
    }

    #[test]
    fn from_raster_checks_stride() {
        let raster = Raster::new(8, 2, vec![0; 16]);
        // Width 640 needs stride 640, not 8.
        assert!(BmpImage::from_raster(raster, 640, false, Vec::new()).is_err());
    }
}
