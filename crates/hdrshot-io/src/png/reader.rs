//! PNG chunk walker and decoder.

use super::{crc, filter, kind, ColorType, PNG_SIGNATURE};
use crate::{zlib, IoError, IoResult};
use byteorder::{BigEndian, ByteOrder};
use hdrshot_core::{ChannelLayout, Cicp, DecodedImage, Samples};
use tracing::{debug, trace};

/// One chunk, borrowed from the file.
#[derive(Debug, Clone, Copy)]
pub struct PngChunk<'a> {
    /// Chunk type.
    pub kind: [u8; 4],
    /// Chunk data.
    pub data: &'a [u8],
    /// Offset of the chunk's length field.
    pub offset: usize,
}

impl PngChunk<'_> {
    /// Total encoded size: length, type, data and CRC.
    pub fn encoded_len(&self) -> usize {
        self.data.len() + 12
    }
}

/// Iterator over the chunks of a PNG, checking lengths and CRCs.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = IoResult<PngChunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.bytes.len() {
            return None;
        }
        let offset = self.pos;
        let rest = &self.bytes[offset..];
        if rest.len() < 12 {
            self.done = true;
            return Some(Err(IoError::truncated("PNG chunk header")));
        }
        let len = BigEndian::read_u32(&rest[0..4]) as usize;
        let tag = [rest[4], rest[5], rest[6], rest[7]];
        let Some(data) = rest.get(8..8 + len) else {
            self.done = true;
            return Some(Err(IoError::truncated("PNG chunk")));
        };
        let Some(stored) = rest.get(8 + len..12 + len) else {
            self.done = true;
            return Some(Err(IoError::truncated("PNG chunk CRC")));
        };
        if BigEndian::read_u32(stored) != crc::chunk_crc(&tag, data) {
            self.done = true;
            return Some(Err(IoError::InvalidFile(format!(
                "PNG chunk {} has a bad CRC",
                String::from_utf8_lossy(&tag)
            ))));
        }
        self.pos = offset + 12 + len;
        if tag == kind::IEND {
            self.done = true;
        }
        Some(Ok(PngChunk {
            kind: tag,
            data,
            offset,
        }))
    }
}

/// Walks the chunks after the signature.
pub fn chunks(bytes: &[u8]) -> IoResult<ChunkIter<'_>> {
    if bytes.len() < 8 || bytes[..8] != PNG_SIGNATURE {
        return Err(IoError::InvalidFile("PNG signature not found".into()));
    }
    Ok(ChunkIter {
        bytes,
        pos: 8,
        done: false,
    })
}

/// Header-level facts about a PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: u8,
    /// Colour type.
    pub color_type: ColorType,
    /// Adam7 interlacing.
    pub interlaced: bool,
    /// cICP tag, if present.
    pub cicp: Option<Cicp>,
}

fn parse_ihdr(data: &[u8]) -> IoResult<PngInfo> {
    if data.len() != 13 {
        return Err(IoError::InvalidFile(format!("IHDR is {} bytes", data.len())));
    }
    let color_type = ColorType::from_byte(data[9])
        .ok_or_else(|| IoError::InvalidFile(format!("PNG colour type {}", data[9])))?;
    Ok(PngInfo {
        width: BigEndian::read_u32(&data[0..4]),
        height: BigEndian::read_u32(&data[4..8]),
        bit_depth: data[8],
        color_type,
        interlaced: data[12] != 0,
        cicp: None,
    })
}

/// Reads IHDR and cICP without touching image data.
pub fn read_info(bytes: &[u8]) -> IoResult<PngInfo> {
    let mut iter = chunks(bytes)?;
    let first = iter
        .next()
        .ok_or_else(|| IoError::MissingData("PNG has no chunks".into()))??;
    if first.kind != kind::IHDR {
        return Err(IoError::InvalidFile("first PNG chunk is not IHDR".into()));
    }
    let mut info = parse_ihdr(first.data)?;
    for chunk in iter {
        let chunk = chunk?;
        if chunk.kind == kind::CICP {
            info.cicp = Cicp::from_bytes(chunk.data);
        } else if chunk.kind == kind::IDAT {
            break;
        }
    }
    Ok(info)
}

/// Decodes an 8- or 16-bit RGB/RGBA PNG.
///
/// Samples are returned unconverted as [`Samples::U8`] or [`Samples::U16`];
/// the cICP tag, when present, is carried in the record's tags.
pub fn decode(bytes: &[u8]) -> IoResult<DecodedImage> {
    let mut info = None;
    let mut idat = Vec::new();
    for chunk in chunks(bytes)? {
        let chunk = chunk?;
        trace!(kind = %String::from_utf8_lossy(&chunk.kind), len = chunk.data.len(), "PNG chunk");
        match chunk.kind {
            kind::IHDR => info = Some(parse_ihdr(chunk.data)?),
            kind::CICP => {
                if let Some(info) = info.as_mut() {
                    info.cicp = Cicp::from_bytes(chunk.data);
                }
            }
            kind::IDAT => idat.extend_from_slice(chunk.data),
            _ => {}
        }
    }
    let info = info.ok_or_else(|| IoError::MissingData("PNG IHDR chunk".into()))?;
    if idat.is_empty() {
        return Err(IoError::MissingData("PNG IDAT chunk".into()));
    }

    let layout = match info.color_type {
        ColorType::Rgb => ChannelLayout::Rgb,
        ColorType::Rgba => ChannelLayout::Rgba,
        other => {
            return Err(IoError::UnsupportedFeature(format!("PNG colour type {other:?}")));
        }
    };
    if info.bit_depth != 8 && info.bit_depth != 16 {
        return Err(IoError::UnsupportedFeature(format!(
            "PNG bit depth {}",
            info.bit_depth
        )));
    }
    if info.interlaced {
        return Err(IoError::UnsupportedFeature("interlaced PNG".into()));
    }

    let bytes_per_sample = info.bit_depth as usize / 8;
    let bpp = layout.channels() * bytes_per_sample;
    let width = info.width as usize;
    let height = info.height as usize;
    let row_bytes = width
        .checked_mul(bpp)
        .ok_or_else(|| IoError::InvalidFile("PNG width overflows".into()))?;
    let expected = height
        .checked_mul(row_bytes + 1)
        .ok_or_else(|| IoError::InvalidFile("PNG size overflows".into()))?;
    if expected > zlib::max_inflated_len(idat.len()) {
        return Err(IoError::InvalidFile(format!(
            "PNG declares {}x{} but holds only {} bytes of image data",
            info.width,
            info.height,
            idat.len()
        )));
    }

    let raw = zlib::inflate(&idat, Some(expected))?;
    let pixels = filter::unfilter(&raw, height, row_bytes, bpp)?;
    debug!(
        width = info.width,
        height = info.height,
        bit_depth = info.bit_depth,
        cicp = ?info.cicp,
        "PNG decoded"
    );

    let samples = if info.bit_depth == 16 {
        Samples::U16(pixels.chunks_exact(2).map(BigEndian::read_u16).collect())
    } else {
        Samples::U8(pixels)
    };
    let image = DecodedImage::new(info.width, info.height, layout, samples)?;
    Ok(match info.cicp {
        Some(c) => image.with_tags(Some(c.transfer), Some(c.primaries)),
        None => image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::writer::write_chunk;

    fn ihdr(width: u32, height: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&width.to_be_bytes());
        d.extend_from_slice(&height.to_be_bytes());
        d.extend_from_slice(&[depth, color, 0, 0, interlace]);
        d
    }

    fn png_with(ihdr_data: &[u8], raw: &[u8]) -> Vec<u8> {
        let mut out = PNG_SIGNATURE.to_vec();
        write_chunk(&mut out, kind::IHDR, ihdr_data);
        write_chunk(&mut out, kind::IDAT, &zlib::compress_zlib(raw));
        write_chunk(&mut out, kind::IEND, &[]);
        out
    }

    #[test]
    fn test_sub_filtered_8bit() {
        // 2x1 RGB, Sub filter: second pixel stored as a difference
        let raw = [1u8, 10, 20, 30, 5, 5, 5];
        let png = png_with(&ihdr(2, 1, 8, 2, 0), &raw);
        let img = decode(&png).unwrap();
        assert_eq!(img.samples, Samples::U8(vec![10, 20, 30, 15, 25, 35]));
        assert_eq!(img.transfer, None);
    }

    #[test]
    fn test_bad_crc() {
        let mut png = png_with(&ihdr(1, 1, 8, 2, 0), &[0, 1, 2, 3]);
        let last = png.len() - 13;
        png[last] ^= 0xFF;
        assert!(matches!(decode(&png), Err(IoError::InvalidFile(_))));
    }

    #[test]
    fn test_unsupported_variants() {
        let gray = png_with(&ihdr(1, 1, 8, 0, 0), &[0, 1]);
        assert!(matches!(decode(&gray), Err(IoError::UnsupportedFeature(_))));
        let interlaced = png_with(&ihdr(1, 1, 8, 2, 1), &[0, 1, 2, 3]);
        assert!(matches!(decode(&interlaced), Err(IoError::UnsupportedFeature(_))));
        assert!(matches!(decode(b"GIF89a"), Err(IoError::InvalidFile(_))));
    }

    #[test]
    fn test_huge_ihdr_is_rejected() {
        let png = png_with(&ihdr(200_000, 200_000, 16, 6, 0), &[0; 8]);
        assert!(png.len() < 80);
        assert!(matches!(decode(&png), Err(IoError::InvalidFile(m)) if m.contains("200000x200000")));
    }

    #[test]
    fn test_short_image_data() {
        // IHDR says four rows, IDAT inflates to one
        let png = png_with(&ihdr(4, 4, 8, 2, 0), &[0; 13]);
        assert!(matches!(decode(&png), Err(IoError::DecodeError(_))));

        let full = png_with(&ihdr(4, 4, 8, 2, 0), &[0; 52]);
        assert!(decode(&full).is_ok());
        for cut in [8, 20, 33, full.len() - 13] {
            assert!(decode(&full[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_read_info_stops_before_data() {
        let png = png_with(&ihdr(640, 480, 16, 6, 0), &[0; 8]);
        let info = read_info(&png).unwrap();
        assert_eq!((info.width, info.height, info.bit_depth), (640, 480, 16));
        assert_eq!(info.color_type, ColorType::Rgba);
        assert_eq!(info.cicp, None);
    }
}
