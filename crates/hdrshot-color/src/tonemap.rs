//! ICtCp tone-mapping.
//!
//! A Reinhard-style curve applied to ICtCp intensity, with chroma scaled so
//! saturation stays visually matched under compression:
//!
//! ```text
//! Lc = content peak (PQ), Ld = SDR white (PQ of 1.5 scRGB)
//! a  = Ld / Lc^2
//! b  = 1 / Ld
//! Y_out = Y_in * (1 + a * Y_in) / (1 + b * Y_in)
//!
//! I0 = Y_in^1.18
//! I1 = I0 * max(Y_out / Y_in, 0)
//! s  = min(I0 / I1, I1 / I0)
//! ```
//!
//! The curve maps `Lc` onto `Ld` and is the identity when `Lc == Ld`.

use crate::ictcp::{ictcp_to_rec709, rec709_to_ictcp};
use hdrshot_transfer::pq::SDR_WHITE_PQ;

/// Exponent of the chroma-matching intensity term.
pub const CHROMA_EXPONENT: f64 = 1.18;

/// Smallest content peak accepted; keeps `a` finite.
const MIN_PEAK_PQ: f64 = 1e-6;

/// Tone-mapper with the curve coefficients for one content peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapper {
    peak_pq: f64,
    target_pq: f64,
    a: f64,
    b: f64,
}

impl ToneMapper {
    /// Creates a mapper for content peaking at `peak_pq` (PQ code value).
    pub fn new(peak_pq: f64) -> Self {
        let lc = if peak_pq.is_finite() {
            peak_pq.max(MIN_PEAK_PQ)
        } else {
            1.0
        };
        let ld = *SDR_WHITE_PQ;
        Self {
            peak_pq: lc,
            target_pq: ld,
            a: ld / (lc * lc),
            b: 1.0 / ld,
        }
    }

    /// Content peak in PQ.
    pub fn peak_pq(&self) -> f64 {
        self.peak_pq
    }

    /// SDR target peak in PQ.
    pub fn target_pq(&self) -> f64 {
        self.target_pq
    }

    /// The intensity curve alone.
    #[inline]
    pub fn curve(&self, y_in: f64) -> f64 {
        let y = y_in.max(0.0);
        y * (1.0 + self.a * y) / (1.0 + self.b * y)
    }

    /// Maps linear Rec.709 HDR to linear Rec.709 SDR (scRGB units).
    pub fn map(&self, rgb: [f64; 3]) -> [f64; 3] {
        let [i, ct, cp] = rec709_to_ictcp(rgb);
        let y_in = i.max(0.0);
        if y_in == 0.0 || !y_in.is_finite() {
            return [0.0; 3];
        }
        let y_out = self.curve(y_in);

        let i0 = y_in.powf(CHROMA_EXPONENT);
        let i1 = i0 * (y_out / y_in).max(0.0);
        let scale = if i0 == 0.0 || i1 == 0.0 {
            0.0
        } else {
            (i0 / i1).min(i1 / i0)
        };

        ictcp_to_rec709([i1, ct * scale, cp * scale]).map(|c| c.max(0.0))
    }
}

/// Tone-maps one pixel for content peaking at `peak_pq`.
///
/// Building a [`ToneMapper`] once per image avoids recomputing the curve
/// coefficients per pixel.
#[inline]
pub fn tonemap(rgb: [f64; 3], peak_pq: f64) -> [f64; 3] {
    ToneMapper::new(peak_pq).map(rgb)
}
