//! SMPTE ST 2084 Perceptual Quantizer (PQ).
//!
//! # Range
//!
//! - Encoded: [0, 1], 1.0 = 10,000 cd/m2
//! - Linear: scRGB, 1.0 = 80 cd/m2, so encoded 1.0 = linear 125
//!
//! # Reference
//!
//! SMPTE ST 2084:2014

use lazy_static::lazy_static;

/// scRGB value of PQ code 1.0 (10,000 / 80).
pub const MAX_PQ: f64 = 125.0;

/// scRGB value of the SDR reference white used as tone-map target (120 cd/m2).
pub const SDR_WHITE_SCRGB: f64 = 1.5;

const N: f64 = 2610.0 / 4096.0 / 4.0;
const M: f64 = 2523.0 / 4096.0 * 128.0;
const C1: f64 = 3424.0 / 4096.0;
const C2: f64 = 2413.0 / 4096.0 * 32.0;
const C3: f64 = 2392.0 / 4096.0 * 32.0;

const DENOM_EPSILON: f64 = 1e-10;

lazy_static! {
    /// PQ code of [`SDR_WHITE_SCRGB`].
    pub static ref SDR_WHITE_PQ: f64 = oetf(SDR_WHITE_SCRGB);
}

/// PQ OETF: encodes linear scRGB to a PQ code value.
///
/// Negative and NaN input encode to 0.
///
/// # Example
///
/// ```rust
/// use hdrshot_transfer::pq::oetf;
///
/// // 125 scRGB = 10,000 cd/m2
/// assert!((oetf(125.0) - 1.0).abs() < 1e-12);
/// ```
#[inline]
pub fn oetf(linear: f64) -> f64 {
    let y = linear.max(0.0) / MAX_PQ;
    if y == 0.0 {
        return 0.0;
    }
    let yn = y.powf(N);
    ((C1 + C2 * yn) / (1.0 + C3 * yn)).powf(M)
}

/// PQ EOTF: decodes a PQ code value to linear scRGB.
///
/// The denominator is floored at 1e-10 so codes at the top of the range
/// never divide by zero.
#[inline]
pub fn eotf(code: f64) -> f64 {
    let e = code.max(0.0).powf(1.0 / M);
    let num = (e - C1).max(0.0);
    let den = (C2 - C3 * e).max(DENOM_EPSILON);
    (num / den).powf(1.0 / N) * MAX_PQ
}

/// Encodes absolute luminance in cd/m2.
#[inline]
pub fn oetf_nits(nits: f64) -> f64 {
    oetf(nits / 80.0)
}

/// Decodes to absolute luminance in cd/m2.
#[inline]
pub fn eotf_nits(code: f64) -> f64 {
    eotf(code) * 80.0
}

/// Applies [`oetf`] per channel.
#[inline]
pub fn oetf_rgb(rgb: [f64; 3]) -> [f64; 3] {
    [oetf(rgb[0]), oetf(rgb[1]), oetf(rgb[2])]
}

/// Applies [`eotf`] per channel.
#[inline]
pub fn eotf_rgb(rgb: [f64; 3]) -> [f64; 3] {
    [eotf(rgb[0]), eotf(rgb[1]), eotf(rgb[2])]
}
