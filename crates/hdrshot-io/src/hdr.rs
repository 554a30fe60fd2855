//! Radiance HDR (RGBE) reader.
//!
//! ```text
//! #?RADIANCE
//! FORMAT=32-bit_rle_rgbe
//! EXPOSURE=1.0
//!
//! -Y <height> +X <width>
//! <scanlines>
//! ```
//!
//! Scanlines are either flat RGBE quads or new-style RLE, marked per line by
//! `02 02 <width-hi> <width-lo>` and stored as four planes (R, G, B, E).
//! Decoded samples are linear Rec.709 scRGB floats.

use crate::error::eof_as_truncated;
use crate::{IoError, IoResult};
use hdrshot_core::cicp::{PRIMARIES_BT709, TRANSFER_LINEAR};
use hdrshot_core::error::checked_sample_count;
use hdrshot_core::{ChannelLayout, DecodedImage, Samples};
use std::io::{BufRead, Cursor, Read};
use tracing::debug;

const HDR_MAGIC: &str = "#?";

/// Widths outside this range cannot carry the RLE marker.
const RLE_MIN_WIDTH: usize = 8;
const RLE_MAX_WIDTH: usize = 0x7fff;
const RLE_MAX_RUN: usize = 127;

/// Parsed header fields.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrHeader {
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// `FORMAT=` value.
    pub format: String,
    /// `EXPOSURE=` value, recorded but never applied.
    pub exposure: Option<f32>,
    /// Program identifier after `#?`.
    pub program: String,
    /// Rows are stored bottom-up (`+Y`).
    pub flip_y: bool,
    /// Columns are stored right-to-left (`-X`).
    pub flip_x: bool,
}

/// Decodes a Radiance file held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    let mut reader = Cursor::new(bytes);
    let header = read_header(&mut reader)?;
    if header.format.to_lowercase().contains("xyze") {
        return Err(IoError::UnsupportedFeature(format!(
            "Radiance format {}",
            header.format
        )));
    }
    debug!(
        width = header.width,
        height = header.height,
        format = %header.format,
        "Radiance header"
    );

    let quads = checked_sample_count(header.width, header.height, 4)?;
    let width = header.width as usize;
    let height = header.height as usize;
    let remaining = bytes.len().saturating_sub(reader.position() as usize);
    if height.saturating_mul(min_scanline_bytes(width)) > remaining {
        return Err(IoError::InvalidFile(format!(
            "HDR size line {}x{} needs more than the {remaining} bytes left",
            header.width, header.height
        )));
    }
    let rgbe = read_pixels(&mut reader, width, height, quads)?;

    let mut data = vec![0.0f32; quads / 4 * 3];
    for y in 0..height {
        let src_y = if header.flip_y { height - 1 - y } else { y };
        for x in 0..width {
            let src_x = if header.flip_x { width - 1 - x } else { x };
            let q = (src_y * width + src_x) * 4;
            let rgb = rgbe_to_f32(rgbe[q], rgbe[q + 1], rgbe[q + 2], rgbe[q + 3]);
            let o = (y * width + x) * 3;
            data[o..o + 3].copy_from_slice(&rgb);
        }
    }

    Ok(
        DecodedImage::new(header.width, header.height, ChannelLayout::Rgb, Samples::F32(data))?
            .with_tags(Some(TRANSFER_LINEAR), Some(PRIMARIES_BT709)),
    )
}

/// Reads the text header up to and including the size line.
pub fn read_header<R: BufRead>(reader: &mut R) -> IoResult<HdrHeader> {
    let mut line = String::new();
    read_text_line(reader, &mut line)?;
    let magic_line = trim_line(&line);
    if !magic_line.starts_with(HDR_MAGIC) {
        return Err(IoError::InvalidFile("HDR magic not found".into()));
    }
    let program = magic_line.trim_start_matches(HDR_MAGIC).to_string();

    let mut format = "32-bit_rle_rgbe".to_string();
    let mut exposure = None;

    loop {
        line.clear();
        if read_text_line(reader, &mut line)? == 0 {
            return Err(IoError::InvalidFile("missing HDR size line".into()));
        }
        let line = trim_line(&line);

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('+') || line.starts_with('-') {
            let (width, height, flip_y, flip_x) = parse_resolution(line).ok_or_else(|| {
                IoError::InvalidFile(format!("invalid HDR size line: {line:?}"))
            })?;
            return Ok(HdrHeader {
                width,
                height,
                format,
                exposure,
                program,
                flip_y,
                flip_x,
            });
        }

        if let Some((key, value)) = line.split_once('=') {
            match key.trim().to_uppercase().as_str() {
                "FORMAT" => format = value.trim().to_string(),
                "EXPOSURE" => exposure = value.trim().parse::<f32>().ok(),
                _ => {}
            }
        }
    }
}

/// Header lines are ASCII; invalid UTF-8 is replaced rather than rejected.
fn read_text_line<R: BufRead>(reader: &mut R, line: &mut String) -> IoResult<usize> {
    let mut raw = Vec::new();
    let n = reader.read_until(b'\n', &mut raw)?;
    line.push_str(&String::from_utf8_lossy(&raw));
    Ok(n)
}

/// Smallest encoding of one scanline: RLE runs of 127 in two bytes per
/// channel, or flat quads when the width cannot carry the RLE marker.
fn min_scanline_bytes(width: usize) -> usize {
    if rle_capable(width) {
        4 + 4 * 2 * width.div_ceil(RLE_MAX_RUN)
    } else {
        width.saturating_mul(4)
    }
}

fn rle_capable(width: usize) -> bool {
    (RLE_MIN_WIDTH..=RLE_MAX_WIDTH).contains(&width)
}

fn read_pixels<R: Read>(reader: &mut R, width: usize, height: usize, quads: usize) -> IoResult<Vec<u8>> {
    let truncated = eof_as_truncated("HDR scanline data");
    let mut rgbe = vec![0u8; quads];
    let rle_capable = rle_capable(width);

    for y in 0..height {
        let line = &mut rgbe[y * width * 4..(y + 1) * width * 4];
        let mut head = [0u8; 4];
        reader.read_exact(&mut head).map_err(&truncated)?;

        let is_rle = rle_capable && head[0] == 2 && head[1] == 2 && head[2] & 0x80 == 0;
        if is_rle {
            decode_rle_scanline(reader, width, line, head)?;
        } else {
            line[..4].copy_from_slice(&head);
            reader.read_exact(&mut line[4..]).map_err(&truncated)?;
        }
    }
    Ok(rgbe)
}

fn decode_rle_scanline<R: Read>(
    reader: &mut R,
    width: usize,
    out: &mut [u8],
    header: [u8; 4],
) -> IoResult<()> {
    let truncated = eof_as_truncated("HDR RLE scanline");
    let encoded_width = ((header[2] as usize) << 8) | (header[3] as usize);
    if encoded_width != width {
        return Err(IoError::InvalidFile(format!(
            "HDR RLE width mismatch: {encoded_width} != {width}"
        )));
    }

    let mut channel = vec![0u8; width];
    for c in 0..4 {
        let mut idx = 0usize;
        while idx < width {
            let mut count = [0u8; 1];
            reader.read_exact(&mut count).map_err(&truncated)?;
            let count = count[0] as usize;
            if count > 128 {
                let run = count - 128;
                if idx + run > width {
                    return Err(IoError::InvalidFile("HDR RLE run overflows scanline".into()));
                }
                let mut value = [0u8; 1];
                reader.read_exact(&mut value).map_err(&truncated)?;
                channel[idx..idx + run].fill(value[0]);
                idx += run;
            } else {
                if count == 0 || idx + count > width {
                    return Err(IoError::InvalidFile("HDR RLE literal overflows scanline".into()));
                }
                reader
                    .read_exact(&mut channel[idx..idx + count])
                    .map_err(&truncated)?;
                idx += count;
            }
        }

        for x in 0..width {
            out[x * 4 + c] = channel[x];
        }
    }

    Ok(())
}

/// Converts one RGBE quad to linear floats.
///
/// `scale = 2^(E - 128 - 8)`; `E == 0` is black.
#[inline]
pub fn rgbe_to_f32(r: u8, g: u8, b: u8, e: u8) -> [f32; 3] {
    if e == 0 {
        return [0.0; 3];
    }
    let f = 2.0_f32.powi(e as i32 - 136);
    [r as f32 * f, g as f32 * f, b as f32 * f]
}

/// Parses `[-+]Y <h> [-+]X <w>` into (width, height, flip_y, flip_x).
fn parse_resolution(line: &str) -> Option<(u32, u32, bool, bool)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return None;
    }
    let flip_y = match parts[0] {
        "-Y" => false,
        "+Y" => true,
        _ => return None,
    };
    let flip_x = match parts[2] {
        "+X" => false,
        "-X" => true,
        _ => return None,
    };
    let height: u32 = parts[1].parse().ok()?;
    let width: u32 = parts[3].parse().ok()?;
    if width > 0 && height > 0 {
        Some((width, height, flip_y, flip_x))
    } else {
        None
    }
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(&['\r', '\n'][..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn header(size_line: &str) -> Vec<u8> {
        format!("#?RADIANCE\nFORMAT=32-bit_rle_rgbe\nEXPOSURE=2.0\n\n{size_line}\n").into_bytes()
    }

    #[test]
    fn parse_resolution_line() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2, false, false)));
        assert_eq!(parse_resolution("+Y 5 -X 4"), Some((4, 5, true, true)));
        assert_eq!(parse_resolution("+X 4 -Y 5"), None);
        assert_eq!(parse_resolution("-Y 0 +X 4"), None);
        assert_eq!(parse_resolution("-Y two +X 4"), None);
    }

    #[test]
    fn known_vector_flat_scanline() {
        let mut bytes = header("-Y 1 +X 1");
        bytes.extend_from_slice(&[128, 64, 32, 130]);
        let img = decode(&bytes).unwrap();
        assert_eq!((img.width, img.height), (1, 1));
        let rgb = img.rgb(0);
        assert_relative_eq!(rgb[0], 2.0);
        assert_relative_eq!(rgb[1], 1.0);
        assert_relative_eq!(rgb[2], 0.5);
        assert_eq!(img.transfer, Some(TRANSFER_LINEAR));
    }

    #[test]
    fn exposure_recorded_not_applied() {
        let mut bytes = header("-Y 1 +X 1");
        bytes.extend_from_slice(&[128, 64, 32, 130]);
        let h = read_header(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(h.exposure, Some(2.0));
        assert_eq!(decode(&bytes).unwrap().rgb(0)[0], 2.0);
    }

    #[test]
    fn rle_scanline() {
        let width = 8;
        let mut bytes = header("-Y 1 +X 8");
        bytes.extend_from_slice(&[2, 2, 0, 8]);
        // R: run of 8 x 128
        bytes.extend_from_slice(&[128 + 8, 128]);
        // G: literal 8 bytes
        bytes.push(8);
        bytes.extend_from_slice(&[0, 16, 32, 48, 64, 80, 96, 112]);
        // B: two runs
        bytes.extend_from_slice(&[128 + 4, 0, 128 + 4, 255]);
        // E: run of 129
        bytes.extend_from_slice(&[128 + 8, 129]);
        let img = decode(&bytes).unwrap();
        assert_eq!(img.width as usize, width);
        let scale = 2f32.powi(129 - 136);
        assert_relative_eq!(img.rgb(0)[0], 128.0 * scale);
        assert_relative_eq!(img.rgb(3)[1], 48.0 * scale);
        assert_relative_eq!(img.rgb(5)[2], 255.0 * scale);
        assert_eq!(img.rgb(1)[2], 0.0);
    }

    #[test]
    fn bottom_up_rows_are_flipped() {
        let mut bytes = header("+Y 2 +X 1");
        bytes.extend_from_slice(&[128, 128, 128, 129, 128, 128, 128, 130]);
        let img = decode(&bytes).unwrap();
        assert!(img.rgb(0)[0] > img.rgb(1)[0]);
    }

    #[test]
    fn zero_exponent_is_black() {
        assert_eq!(rgbe_to_f32(255, 255, 255, 0), [0.0; 3]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(decode(b"P6\n1 1\n"), Err(IoError::InvalidFile(_))));
        let bad_size = header("-Y 1 X 1");
        assert!(matches!(decode(&bad_size), Err(IoError::InvalidFile(_))));
        let truncated = header("-Y 2 +X 1");
        assert!(matches!(decode(&truncated), Err(IoError::InvalidFile(_))));
        let xyze = b"#?RADIANCE\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 1\n\0\0\0\0".to_vec();
        assert!(matches!(decode(&xyze), Err(IoError::UnsupportedFeature(_))));
    }

    #[test]
    fn rle_overflow_rejected() {
        let mut bytes = header("-Y 1 +X 8");
        bytes.extend_from_slice(&[2, 2, 0, 8, 128 + 9, 1]);
        bytes.extend_from_slice(&[0; 8]);
        assert!(matches!(decode(&bytes), Err(IoError::InvalidFile(m)) if m.contains("run")));
    }

    #[test]
    fn size_line_past_usize_is_error() {
        let mut bytes = header("-Y 4294967295 +X 4294967295");
        bytes.extend_from_slice(&[128, 64, 32, 130]);
        assert!(matches!(decode(&bytes), Err(IoError::Core(_))));
    }

    #[test]
    fn size_line_larger_than_data_is_error() {
        for size in ["-Y 200000 +X 200000", "-Y 100000 +X 1000", "-Y 3 +X 5"] {
            let mut bytes = header(size);
            bytes.extend_from_slice(&[128, 64, 32, 130].repeat(8));
            assert!(
                matches!(decode(&bytes), Err(IoError::InvalidFile(m)) if m.contains("bytes left")),
                "{size}"
            );
        }
    }

    #[test]
    fn minimal_rle_encoding_is_accepted() {
        // 254 pixels per channel in two runs of 127
        let mut bytes = header("-Y 1 +X 254");
        bytes.extend_from_slice(&[2, 2, 0, 254]);
        for v in [128u8, 128, 128, 129] {
            bytes.extend_from_slice(&[128 + 127, v, 128 + 127, v]);
        }
        assert_eq!(bytes.len() - header("-Y 1 +X 254").len(), min_scanline_bytes(254));
        let img = decode(&bytes).unwrap();
        assert_eq!(img.rgb(253), [1.0, 1.0, 1.0]);
    }
}
