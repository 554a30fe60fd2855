//! Header-only SDR rejection probe.
//!
//! A fast reject before committing to a full conversion: an 8-bit PNG, or
//! an AVIF whose transfer is BT.709/sRGB or absent, is detectably SDR.
//! Formats without a cheap SDR signal always pass.

use crate::avif;
use crate::detect::Format;
use crate::isobmff;
use crate::png::{IHDR_BIT_DEPTH_OFFSET, PNG_SIGNATURE};
use std::fmt;

/// Bytes of a PNG the probe reads (signature and IHDR).
pub const PNG_PROBE_BYTES: usize = 33;

/// Bytes of an AVIF the probe reads.
pub const AVIF_PROBE_BYTES: usize = 50 * 1024;

/// Why a file was judged SDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdrReason {
    /// PNG with 8-bit (or lower) samples.
    EightBitPng(u8),
    /// AVIF tagged with an SDR transfer.
    SdrTransfer(u8),
    /// AVIF without an `nclx` colour box.
    UntaggedAvif,
}

impl fmt::Display for SdrReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdrReason::EightBitPng(bits) => write!(f, "{bits}-bit PNG"),
            SdrReason::SdrTransfer(t) => write!(f, "AVIF with SDR transfer {t}"),
            SdrReason::UntaggedAvif => f.write_str("AVIF without a colour tag"),
        }
    }
}

/// Probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Treat as HDR and convert.
    Hdr,
    /// Detectably SDR.
    Sdr(SdrReason),
}

impl Verdict {
    /// True for [`Verdict::Sdr`].
    pub fn is_sdr(&self) -> bool {
        matches!(self, Verdict::Sdr(_))
    }
}

/// Bytes the probe needs from the start of a file of `format`.
pub fn probe_len(format: Format) -> usize {
    match format {
        Format::Png => PNG_PROBE_BYTES,
        Format::Avif => AVIF_PROBE_BYTES,
        _ => 0,
    }
}

/// Judges a file from its leading bytes.
///
/// `head` may be the whole file; only [`probe_len`] bytes are examined.
pub fn probe(format: Format, head: &[u8]) -> Verdict {
    match format {
        Format::Png => probe_png(head),
        Format::Avif => probe_avif(head),
        _ => Verdict::Hdr,
    }
}

fn probe_png(head: &[u8]) -> Verdict {
    if head.len() < PNG_PROBE_BYTES || head[..8] != PNG_SIGNATURE || &head[12..16] != b"IHDR" {
        return Verdict::Hdr;
    }
    let bits = head[IHDR_BIT_DEPTH_OFFSET];
    if bits <= 8 {
        Verdict::Sdr(SdrReason::EightBitPng(bits))
    } else {
        Verdict::Hdr
    }
}

fn probe_avif(head: &[u8]) -> Verdict {
    let boxes = isobmff::walk_limited(head, AVIF_PROBE_BYTES);
    match avif::metadata_from_boxes(&boxes).cicp {
        None => Verdict::Sdr(SdrReason::UntaggedAvif),
        Some(c) if hdrshot_core::cicp::is_sdr_transfer(c.transfer) => {
            Verdict::Sdr(SdrReason::SdrTransfer(c.transfer))
        }
        Some(_) => Verdict::Hdr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{encode_png, ColorType};
    use hdrshot_core::Samples;

    #[test]
    fn test_png_bit_depth() {
        let sdr = encode_png(&Samples::U8(vec![0; 3]), 1, 1, ColorType::Rgb, None).unwrap();
        assert_eq!(probe(Format::Png, &sdr[..33]), Verdict::Sdr(SdrReason::EightBitPng(8)));
        let hdr = encode_png(&Samples::U16(vec![0; 3]), 1, 1, ColorType::Rgb, None).unwrap();
        assert_eq!(probe(Format::Png, &hdr), Verdict::Hdr);
        assert_eq!(probe(Format::Png, &hdr[..20]), Verdict::Hdr);
    }

    #[test]
    fn test_always_hdr_formats() {
        for f in [Format::Exr, Format::Hdr, Format::Jxr] {
            assert_eq!(probe(f, &[]), Verdict::Hdr);
            assert_eq!(probe_len(f), 0);
        }
    }

    #[test]
    fn test_untagged_avif_is_sdr() {
        assert!(probe(Format::Avif, b"\0\0\0\x10ftypavif\0\0\0\0").is_sdr());
    }
}
