//! PNG encoder and cICP re-injection.

use super::{crc, kind, reader, ColorType, AFTER_IHDR, PNG_SIGNATURE};
use crate::{zlib, IoError, IoResult};
use hdrshot_core::{Cicp, Samples};
use tracing::debug;

/// Appends one chunk: length, type, data, CRC-32(type and data).
pub fn write_chunk(out: &mut Vec<u8>, kind: [u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(&kind);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc::chunk_crc(&kind, data).to_be_bytes());
}

/// Encodes interleaved RGB or RGBA samples.
///
/// [`Samples::U8`] writes 8-bit, [`Samples::U16`] writes 16-bit big-endian.
/// Float samples are rejected; quantize them first.
///
/// # Example
///
/// ```rust
/// use hdrshot_core::{Cicp, Samples};
/// use hdrshot_io::png::{self, ColorType};
///
/// let samples = Samples::U16(vec![0, 32768, 65535]);
/// let bytes = png::encode_png(&samples, 1, 1, ColorType::Rgb, Some(Cicp::BT2020_PQ)).unwrap();
/// assert_eq!(&bytes[37..41], b"cICP");
/// ```
pub fn encode_png(
    samples: &Samples,
    width: u32,
    height: u32,
    color_type: ColorType,
    cicp: Option<Cicp>,
) -> IoResult<Vec<u8>> {
    if !matches!(color_type, ColorType::Rgb | ColorType::Rgba) {
        return Err(IoError::EncodeError(format!(
            "PNG colour type {color_type:?} is not written"
        )));
    }
    let channels = color_type.channels();
    let expected = hdrshot_core::error::checked_sample_count(width, height, channels)?;
    if samples.len() != expected {
        return Err(IoError::EncodeError(format!(
            "expected {expected} samples for {width}x{height}x{channels}, got {}",
            samples.len()
        )));
    }

    let row_samples = width as usize * channels;
    let (bit_depth, raw) = match samples {
        Samples::U8(v) => {
            let mut raw = Vec::with_capacity(height as usize * (row_samples + 1));
            for row in v.chunks_exact(row_samples) {
                raw.push(0);
                raw.extend_from_slice(row);
            }
            (8u8, raw)
        }
        Samples::U16(v) => {
            let mut raw = Vec::with_capacity(height as usize * (row_samples * 2 + 1));
            for row in v.chunks_exact(row_samples) {
                raw.push(0);
                for s in row {
                    raw.extend_from_slice(&s.to_be_bytes());
                }
            }
            (16u8, raw)
        }
        other => {
            return Err(IoError::EncodeError(format!(
                "{} samples cannot be written to PNG",
                other.kind_name()
            )));
        }
    };

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[bit_depth, color_type.to_byte(), 0, 0, 0]);

    let idat = zlib::wrap(&zlib::compress(&raw), &raw);

    let mut out = Vec::with_capacity(idat.len() + 64);
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, kind::IHDR, &ihdr);
    if let Some(c) = cicp {
        write_chunk(&mut out, kind::CICP, &c.to_bytes());
    }
    write_chunk(&mut out, kind::IDAT, &idat);
    write_chunk(&mut out, kind::IEND, &[]);

    debug!(width, height, bit_depth, bytes = out.len(), cicp = ?cicp, "PNG encoded");
    Ok(out)
}

/// Re-tags an existing PNG.
///
/// Any cICP chunk is dropped and a new one is placed directly after IHDR
/// (byte offset 33). All other chunks are copied through untouched.
pub fn inject_cicp(png: &[u8], cicp: Cicp) -> IoResult<Vec<u8>> {
    let mut iter = reader::chunks(png)?;
    let ihdr = iter
        .next()
        .ok_or_else(|| IoError::MissingData("PNG has no chunks".into()))??;
    if ihdr.kind != kind::IHDR || ihdr.offset + ihdr.encoded_len() != AFTER_IHDR {
        return Err(IoError::InvalidFile("PNG does not start with a 13-byte IHDR".into()));
    }

    let mut out = Vec::with_capacity(png.len() + 16);
    out.extend_from_slice(&png[..AFTER_IHDR]);
    write_chunk(&mut out, kind::CICP, &cicp.to_bytes());
    for chunk in iter {
        let chunk = chunk?;
        if chunk.kind == kind::CICP {
            continue;
        }
        out.extend_from_slice(&png[chunk.offset..chunk.offset + chunk.encoded_len()]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{decode, read_info};

    #[test]
    fn test_rgba16_roundtrip() {
        let data: Vec<u16> = (0..4 * 5 * 3).map(|i| (i as u16).wrapping_mul(4099)).collect();
        let samples = Samples::U16(data);
        let png = encode_png(&samples, 5, 3, ColorType::Rgba, None).unwrap();
        let img = decode(&png).unwrap();
        assert_eq!(img.samples, samples);
        assert_eq!((img.width, img.height), (5, 3));
    }

    #[test]
    fn test_big_endian_samples() {
        let png = encode_png(&Samples::U16(vec![0x1234, 0, 0]), 1, 1, ColorType::Rgb, None).unwrap();
        // zlib header of IDAT follows IHDR (33) + length/type (8)
        assert_eq!(&png[41..43], &zlib::ZLIB_HEADER);
        let img = decode(&png).unwrap();
        assert_eq!(img.samples, Samples::U16(vec![0x1234, 0, 0]));
    }

    #[test]
    fn test_chunk_order_with_cicp() {
        let png = encode_png(&Samples::U8(vec![1, 2, 3]), 1, 1, ColorType::Rgb, Some(Cicp::BT2020_PQ))
            .unwrap();
        let kinds: Vec<[u8; 4]> = reader::chunks(&png).unwrap().map(|c| c.unwrap().kind).collect();
        assert_eq!(kinds, vec![kind::IHDR, kind::CICP, kind::IDAT, kind::IEND]);
        let img = decode(&png).unwrap();
        assert_eq!(img.transfer, Some(16));
        assert_eq!(img.primaries, Some(9));
    }

    #[test]
    fn test_rejects_float_and_bad_count() {
        let f = Samples::F32(vec![0.0; 3]);
        assert!(encode_png(&f, 1, 1, ColorType::Rgb, None).is_err());
        let short = Samples::U8(vec![0; 5]);
        assert!(encode_png(&short, 1, 2, ColorType::Rgb, None).is_err());
    }

    #[test]
    fn test_inject_after_ihdr() {
        let plain = encode_png(&Samples::U16(vec![7; 6]), 2, 1, ColorType::Rgb, None).unwrap();
        let tagged = inject_cicp(&plain, Cicp::BT2020_PQ).unwrap();
        assert_eq!(tagged.len(), plain.len() + 16);
        assert_eq!(&tagged[AFTER_IHDR + 4..AFTER_IHDR + 8], b"cICP");
        assert_eq!(&tagged[AFTER_IHDR + 8..AFTER_IHDR + 12], &[9, 16, 0, 1]);
        // every chunk still checks out
        assert!(reader::chunks(&tagged).unwrap().all(|c| c.is_ok()));
        assert_eq!(read_info(&tagged).unwrap().cicp, Some(Cicp::BT2020_PQ));
        assert_eq!(decode(&tagged).unwrap().samples, Samples::U16(vec![7; 6]));
    }

    #[test]
    fn test_inject_replaces_existing() {
        let srgb = encode_png(&Samples::U8(vec![0; 3]), 1, 1, ColorType::Rgb, Some(Cicp::SRGB)).unwrap();
        let tagged = inject_cicp(&srgb, Cicp::BT2020_PQ).unwrap();
        assert_eq!(tagged.len(), srgb.len());
        let n = reader::chunks(&tagged)
            .unwrap()
            .filter(|c| c.as_ref().map(|c| c.kind == kind::CICP).unwrap_or(false))
            .count();
        assert_eq!(n, 1);
        assert_eq!(read_info(&tagged).unwrap().cicp, Some(Cicp::BT2020_PQ));
    }
}
