//! Statistics records emitted alongside output bytes.
//!
//! Both records are produced by the same per-pixel loop that builds the
//! output buffer. They ride on the conversion result as optional fields,
//! so a consumer never needs a second full decode to obtain them.

use serde::Serialize;

/// Gamut coverage as percentages of classified pixels.
///
/// Every classified pixel lands in exactly one bucket (the narrowest
/// containing hull), so the fields sum to 100 up to rounding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GamutCoverage {
    /// Pixels inside Rec.709.
    pub rec709: f64,
    /// Pixels inside Display P3 but outside Rec.709.
    pub p3: f64,
    /// Pixels inside BT.2020 but outside P3.
    pub bt2020: f64,
    /// Pixels inside ACES AP1 but outside BT.2020.
    pub ap1: f64,
    /// Pixels inside ACES AP0 but outside AP1.
    pub ap0: f64,
    /// Pixels outside every tested hull.
    pub beyond: f64,
}

impl GamutCoverage {
    /// Builds percentages from bucket counts ordered
    /// `[rec709, p3, bt2020, ap1, ap0, beyond]`.
    ///
    /// An empty population reports 100% Rec.709.
    pub fn from_counts(counts: [u64; 6]) -> Self {
        let total: u64 = counts.iter().sum();
        if total == 0 {
            return Self {
                rec709: 100.0,
                ..Self::default()
            };
        }
        let pct = |n: u64| n as f64 * 100.0 / total as f64;
        Self {
            rec709: pct(counts[0]),
            p3: pct(counts[1]),
            bt2020: pct(counts[2]),
            ap1: pct(counts[3]),
            ap0: pct(counts[4]),
            beyond: pct(counts[5]),
        }
    }

    /// Sum of all buckets.
    pub fn total(&self) -> f64 {
        self.rec709 + self.p3 + self.bt2020 + self.ap1 + self.ap0 + self.beyond
    }
}

/// Luminance statistics in cd/m2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LuminanceStats {
    /// Peak single-channel light level (MaxCLL).
    pub max_cll: f64,
    /// Peak pixel luminance.
    pub max_luminance: f64,
    /// Mean pixel luminance.
    pub avg_luminance: f64,
    /// Minimum pixel luminance.
    pub min_luminance: f64,
    /// Bit depth of the encoded output.
    pub bit_depth: u8,
    /// Transfer characteristic code point of the encoded output.
    pub transfer: u8,
}
