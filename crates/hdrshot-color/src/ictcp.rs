//! Rec.709 <-> ICtCp.
//!
//! ```text
//! RGB709 -> LMS -> PQ(LMS) -> ICtCp
//! ```
//!
//! LMS is clamped to non-negative light before PQ encoding. For inputs that
//! are already non-negative every LMS component is too, so the pair is an
//! exact inverse there.

use hdrshot_primaries::MATRICES;
use hdrshot_transfer::pq;

/// Converts linear Rec.709 (scRGB) to ICtCp.
#[inline]
pub fn rec709_to_ictcp(rgb: [f64; 3]) -> [f64; 3] {
    let lms = MATRICES.bt709_to_lms * rgb;
    MATRICES.lms_pq_to_ictcp * pq::oetf_rgb(lms)
}

/// Converts ICtCp back to linear Rec.709 (scRGB).
#[inline]
pub fn ictcp_to_rec709(ictcp: [f64; 3]) -> [f64; 3] {
    let lms_pq = MATRICES.ictcp_to_lms_pq * ictcp;
    MATRICES.lms_to_bt709 * pq::eotf_rgb(lms_pq)
}
