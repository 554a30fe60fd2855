//! AVIF colour metadata.
//!
//! Reads the `colr`/`nclx`, `pixi`, `clli`, `mdcv` and `ispe` properties
//! found by the [`isobmff`](crate::isobmff) walker, and patches the `nclx`
//! tag of an already encoded file in place.
//!
//! Metadata parsing never fails: a missing or malformed box is reported as
//! an absent field.

use crate::isobmff::{self, BoxKind, IsoBox};
use crate::{IoError, IoResult};
use byteorder::{BigEndian, ByteOrder};
use hdrshot_core::cicp::is_sdr_transfer;
use hdrshot_core::{Cicp, LuminanceStats};

/// Content light level (`clli`), in cd/m2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLight {
    /// Brightest pixel of the content (MaxCLL).
    pub max_cll: u16,
    /// Brightest frame average (MaxFALL).
    pub max_fall: u16,
}

/// Mastering display luminance range (`mdcv`), in cd/m2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteringDisplay {
    /// Display peak luminance.
    pub max_luminance: f64,
    /// Display black level.
    pub min_luminance: f64,
}

/// Colour metadata of an AVIF file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AvifMetadata {
    /// First `nclx` colour box.
    pub cicp: Option<Cicp>,
    /// Bits per channel from `pixi`.
    pub bit_depth: Option<u8>,
    /// Content light level.
    pub content_light: Option<ContentLight>,
    /// Mastering display range.
    pub mastering: Option<MasteringDisplay>,
    /// Image size from `ispe`.
    pub dimensions: Option<(u32, u32)>,
}

impl AvifMetadata {
    /// True when the transfer is absent or an SDR curve.
    pub fn is_sdr(&self) -> bool {
        self.cicp.is_none_or(|c| is_sdr_transfer(c.transfer))
    }

    /// Luminance statistics declared by the container, if any.
    ///
    /// MaxCLL comes from `clli`, the luminance range from `mdcv` (falling
    /// back to MaxCLL), the average from MaxFALL.
    pub fn luminance_hint(&self) -> Option<LuminanceStats> {
        if self.content_light.is_none() && self.mastering.is_none() {
            return None;
        }
        let max_cll = self.content_light.map(|c| c.max_cll as f64);
        let max_luminance = self
            .mastering
            .map(|m| m.max_luminance)
            .or(max_cll)
            .unwrap_or(0.0);
        Some(LuminanceStats {
            max_cll: max_cll.unwrap_or(max_luminance),
            max_luminance,
            avg_luminance: self.content_light.map_or(0.0, |c| c.max_fall as f64),
            min_luminance: self.mastering.map_or(0.0, |m| m.min_luminance),
            bit_depth: self.bit_depth.unwrap_or(0),
            transfer: self.cicp.map_or(0, |c| c.transfer),
        })
    }
}

/// Parses an `nclx` colour box payload.
///
/// ```text
/// "nclx" | primaries:u16 | transfer:u16 | matrix:u16 | full_range:1 reserved:7
/// ```
pub fn parse_nclx(payload: &[u8]) -> Option<Cicp> {
    if payload.len() < 11 || &payload[..4] != b"nclx" {
        return None;
    }
    let code = |at: usize| u8::try_from(BigEndian::read_u16(&payload[at..at + 2])).ok();
    Some(Cicp::new(
        code(4)?,
        code(6)?,
        code(8)?,
        payload[10] & 0x80 != 0,
    ))
}

fn parse_pixi(payload: &[u8]) -> Option<u8> {
    // version/flags, channel count, then bits per channel
    let channels = *payload.get(4)?;
    if channels == 0 {
        return None;
    }
    payload.get(5).copied()
}

fn parse_clli(payload: &[u8]) -> Option<ContentLight> {
    if payload.len() < 4 {
        return None;
    }
    Some(ContentLight {
        max_cll: BigEndian::read_u16(&payload[0..2]),
        max_fall: BigEndian::read_u16(&payload[2..4]),
    })
}

/// The two luminance fields close the box whatever the primaries prefix
/// (16 bytes of u16 pairs, or 24 with a version/flags or wider layout).
fn parse_mdcv(payload: &[u8]) -> Option<MasteringDisplay> {
    if payload.len() < 24 {
        return None;
    }
    let tail = &payload[payload.len() - 8..];
    Some(MasteringDisplay {
        max_luminance: BigEndian::read_u32(&tail[0..4]) as f64 * 0.0001,
        min_luminance: BigEndian::read_u32(&tail[4..8]) as f64 * 0.0001,
    })
}

fn parse_ispe(payload: &[u8]) -> Option<(u32, u32)> {
    if payload.len() < 12 {
        return None;
    }
    Some((
        BigEndian::read_u32(&payload[4..8]),
        BigEndian::read_u32(&payload[8..12]),
    ))
}

/// Collects metadata from the boxes of a walk; the first box of each kind
/// wins.
pub fn metadata_from_boxes(boxes: &[IsoBox<'_>]) -> AvifMetadata {
    let mut meta = AvifMetadata::default();
    for b in boxes {
        match b.kind {
            BoxKind::Colr if meta.cicp.is_none() => meta.cicp = parse_nclx(b.payload),
            BoxKind::Pixi if meta.bit_depth.is_none() => meta.bit_depth = parse_pixi(b.payload),
            BoxKind::Clli if meta.content_light.is_none() => {
                meta.content_light = parse_clli(b.payload)
            }
            BoxKind::Mdcv if meta.mastering.is_none() => meta.mastering = parse_mdcv(b.payload),
            BoxKind::Ispe if meta.dimensions.is_none() => meta.dimensions = parse_ispe(b.payload),
            _ => {}
        }
    }
    meta
}

/// Reads colour metadata from the head of an AVIF file.
pub fn read_metadata(bytes: &[u8]) -> AvifMetadata {
    metadata_from_boxes(&isobmff::walk(bytes))
}

/// Rewrites every `nclx` colour box in place.
///
/// Returns the number of boxes patched. A file without any `nclx` box has
/// lost its tag and is reported as [`IoError::MissingData`].
pub fn set_nclx(avif: &mut [u8], cicp: Cicp) -> IoResult<usize> {
    let targets: Vec<usize> = isobmff::walk(avif)
        .iter()
        .filter(|b| b.kind == BoxKind::Colr && parse_nclx(b.payload).is_some())
        .map(|b| b.payload_offset)
        .collect();
    if targets.is_empty() {
        return Err(IoError::MissingData("AVIF has no nclx colour box".into()));
    }
    for &at in &targets {
        BigEndian::write_u16(&mut avif[at + 4..at + 6], cicp.primaries as u16);
        BigEndian::write_u16(&mut avif[at + 6..at + 8], cicp.transfer as u16);
        BigEndian::write_u16(&mut avif[at + 8..at + 10], cicp.matrix as u16);
        avif[at + 10] = (avif[at + 10] & 0x7F) | if cicp.full_range { 0x80 } else { 0 };
    }
    Ok(targets.len())
}
