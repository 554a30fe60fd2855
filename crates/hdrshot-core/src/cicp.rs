//! Coding-independent code points (ITU-T H.273).
//!
//! A cICP tag is four bytes: colour primaries, transfer characteristics,
//! matrix coefficients and the full-range flag. PNG carries it as a `cICP`
//! chunk, ISOBMFF/AVIF as a `colr` box of subtype `nclx`.
//!
//! Any re-encode that does not explicitly preserve the tag loses it, so
//! writers in `hdrshot-io` re-inject it after every encode.

use serde::Serialize;

/// Colour primaries code for BT.709 / sRGB.
pub const PRIMARIES_BT709: u8 = 1;
/// Colour primaries code for BT.2020 / BT.2100.
pub const PRIMARIES_BT2020: u8 = 9;
/// Colour primaries code for SMPTE EG 432-1 (Display P3).
pub const PRIMARIES_P3_D65: u8 = 12;

/// Transfer characteristics code for BT.709.
pub const TRANSFER_BT709: u8 = 1;
/// Transfer characteristics code for linear light.
pub const TRANSFER_LINEAR: u8 = 8;
/// Transfer characteristics code for IEC 61966-2-1 (sRGB).
pub const TRANSFER_SRGB: u8 = 13;
/// Transfer characteristics code for SMPTE ST 2084 (PQ).
pub const TRANSFER_PQ: u8 = 16;
/// Transfer characteristics code for ARIB STD-B67 (HLG).
pub const TRANSFER_HLG: u8 = 18;

/// Matrix coefficients code for identity (RGB).
pub const MATRIX_IDENTITY: u8 = 0;

/// A cICP tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cicp {
    /// Colour primaries code point
    pub primaries: u8,
    /// Transfer characteristics code point
    pub transfer: u8,
    /// Matrix coefficients code point
    pub matrix: u8,
    /// Full-range flag
    pub full_range: bool,
}

impl Cicp {
    /// BT.2020 primaries, PQ transfer, RGB, full range: the canonical HDR tag.
    pub const BT2020_PQ: Self = Self::new(PRIMARIES_BT2020, TRANSFER_PQ, MATRIX_IDENTITY, true);

    /// sRGB primaries and transfer, RGB, full range.
    pub const SRGB: Self = Self::new(PRIMARIES_BT709, TRANSFER_SRGB, MATRIX_IDENTITY, true);

    /// Creates a tag from its code points.
    #[inline]
    pub const fn new(primaries: u8, transfer: u8, matrix: u8, full_range: bool) -> Self {
        Self {
            primaries,
            transfer,
            matrix,
            full_range,
        }
    }

    /// Parses the 4-byte PNG `cICP` payload.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [p, t, m, r, ..] => Some(Self::new(*p, *t, *m, *r != 0)),
            _ => None,
        }
    }

    /// Serializes to the 4-byte PNG `cICP` payload.
    #[inline]
    pub const fn to_bytes(&self) -> [u8; 4] {
        [
            self.primaries,
            self.transfer,
            self.matrix,
            self.full_range as u8,
        ]
    }

    /// True when the transfer is PQ.
    #[inline]
    pub const fn is_pq(&self) -> bool {
        self.transfer == TRANSFER_PQ
    }

    /// True when the primaries are BT.2020.
    #[inline]
    pub const fn is_bt2020(&self) -> bool {
        self.primaries == PRIMARIES_BT2020
    }
}

/// True for transfer codes that identify standard dynamic range content.
///
/// Used by the pre-import probe: BT.709 (1) and sRGB (13) are SDR.
#[inline]
pub const fn is_sdr_transfer(transfer: u8) -> bool {
    matches!(transfer, TRANSFER_BT709 | TRANSFER_SRGB)
}

impl std::fmt::Display for Cicp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.primaries, self.transfer, self.matrix, self.full_range as u8
        )
    }
}
