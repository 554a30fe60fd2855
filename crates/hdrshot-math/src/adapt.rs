//! Chromatic adaptation.
//!
//! ACES AP0/AP1 use a D60-ish white, everything else here is D65. Converting
//! Rec.709 into an ACES basis goes through a Bradford adaptation so that
//! Rec.709 white lands on ACES white and the gamut tests stay meaningful.

use crate::Mat3;
use tracing::error;

/// Bradford chromatic adaptation matrix (XYZ to sharpened cone space).
///
/// # Reference
///
/// Lam, K.M. (1985). Metamerism and Colour Constancy.
pub const BRADFORD: Mat3 = Mat3::from_rows([
    [0.8951, 0.2664, -0.1614],
    [-0.7502, 1.7135, 0.0367],
    [0.0389, -0.0685, 1.0296],
]);

/// Computes an XYZ-to-XYZ adaptation matrix from `src_white` to `dst_white`.
///
/// Both white points are XYZ with Y = 1. The inverse cone matrix is computed
/// rather than tabulated, so `adapt * src_white == dst_white` holds to
/// floating-point precision.
///
/// # Example
///
/// ```rust
/// use hdrshot_math::{adapt_matrix, BRADFORD};
///
/// let d65 = [0.95047, 1.0, 1.08883];
/// let d60 = [0.95265, 1.0, 1.00883];
/// let m = adapt_matrix(BRADFORD, d65, d60);
/// let w = m * d65;
/// assert!((w[2] - d60[2]).abs() < 1e-12);
/// ```
pub fn adapt_matrix(method: Mat3, src_white: [f64; 3], dst_white: [f64; 3]) -> Mat3 {
    let Some(method_inv) = method.inverse() else {
        error!(?method, "cone response matrix is singular; adaptation falls back to identity");
        return Mat3::IDENTITY;
    };
    let src_cone = method * src_white;
    let dst_cone = method * dst_white;
    let scale = Mat3::diagonal([
        dst_cone[0] / src_cone[0],
        dst_cone[1] / src_cone[1],
        dst_cone[2] / src_cone[2],
    ]);
    method_inv * scale * method
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_method_is_identity() {
        let singular = Mat3::from_rows([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        let m = adapt_matrix(singular, [0.95047, 1.0, 1.08883], [0.95265, 1.0, 1.00883]);
        assert_eq!(m, Mat3::IDENTITY);
    }

    #[test]
    fn test_same_white_is_identity() {
        let w = [0.95047, 1.0, 1.08883];
        let m = adapt_matrix(BRADFORD, w, w);
        assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-12);
    }
}
