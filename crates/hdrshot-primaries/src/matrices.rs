//! Precomposed conversion matrices.
//!
//! Chained transforms are multiplied once here so per-pixel loops do a single
//! 3x3 multiply, e.g. `bt709_to_lms = xyz_to_lms * bt709_to_xyz`. The table
//! is built on first use and never mutated afterwards, so it can be shared
//! across threads without synchronization.
//!
//! Every forward/inverse pair is checked at construction: the round trip of
//! a set of probe colors must close to better than 1e-10 relative.

use crate::{rgb_to_rgb_matrix, rgb_to_xyz_matrix, ACES_AP0, ACES_AP1, DISPLAY_P3, REC2020, REC709};
use hdrshot_math::Mat3;
use lazy_static::lazy_static;
use tracing::error;

/// BT.2100 LMS from Rec.2020 RGB (integer form over 4096).
pub const BT2020_TO_LMS: Mat3 = Mat3::from_rows([
    [1688.0 / 4096.0, 2146.0 / 4096.0, 262.0 / 4096.0],
    [683.0 / 4096.0, 2951.0 / 4096.0, 462.0 / 4096.0],
    [99.0 / 4096.0, 309.0 / 4096.0, 3688.0 / 4096.0],
]);

/// BT.2100 ICtCp from PQ-encoded LMS (integer form over 4096).
pub const LMS_PQ_TO_ICTCP: Mat3 = Mat3::from_rows([
    [2048.0 / 4096.0, 2048.0 / 4096.0, 0.0],
    [6610.0 / 4096.0, -13613.0 / 4096.0, 7003.0 / 4096.0],
    [17933.0 / 4096.0, -17390.0 / 4096.0, -543.0 / 4096.0],
]);

/// Relative round-trip tolerance enforced at construction.
pub const ROUNDTRIP_TOLERANCE: f64 = 1e-10;

/// The read-only matrix table.
#[derive(Debug, Clone)]
pub struct ColorMatrices {
    /// Identity, for sources already in Rec.709.
    pub identity: Mat3,
    /// Rec.709 to Rec.2020.
    pub bt709_to_bt2020: Mat3,
    /// Rec.2020 to Rec.709.
    pub bt2020_to_bt709: Mat3,
    /// Rec.709 to CIE XYZ (D65).
    pub bt709_to_xyz: Mat3,
    /// CIE XYZ (D65) to Rec.709.
    pub xyz_to_bt709: Mat3,
    /// CIE XYZ to BT.2100 LMS.
    pub xyz_to_lms: Mat3,
    /// BT.2100 LMS to CIE XYZ.
    pub lms_to_xyz: Mat3,
    /// Rec.709 to LMS (`xyz_to_lms * bt709_to_xyz`).
    pub bt709_to_lms: Mat3,
    /// LMS to Rec.709 (`xyz_to_bt709 * lms_to_xyz`).
    pub lms_to_bt709: Mat3,
    /// PQ-encoded LMS to ICtCp.
    pub lms_pq_to_ictcp: Mat3,
    /// ICtCp to PQ-encoded LMS.
    pub ictcp_to_lms_pq: Mat3,
    /// Rec.709 to Display P3.
    pub bt709_to_p3: Mat3,
    /// Display P3 to Rec.709.
    pub p3_to_bt709: Mat3,
    /// Rec.709 to ACES AP1 (Bradford adapted).
    pub bt709_to_ap1: Mat3,
    /// Rec.709 to ACES AP0 (Bradford adapted).
    pub bt709_to_ap0: Mat3,
}

lazy_static! {
    /// Shared matrix table.
    pub static ref MATRICES: ColorMatrices = ColorMatrices::build();
}

impl ColorMatrices {
    /// Derives every matrix from primaries and composes the chains.
    pub fn build() -> Self {
        let bt709_to_xyz = rgb_to_xyz_matrix(&REC709);
        let xyz_to_bt709 = invert(&bt709_to_xyz);
        let xyz_to_bt2020 = invert(&rgb_to_xyz_matrix(&REC2020));
        let xyz_to_lms = BT2020_TO_LMS * xyz_to_bt2020;
        let lms_to_xyz = invert(&xyz_to_lms);

        let bt709_to_bt2020 = rgb_to_rgb_matrix(&REC709, &REC2020);
        let bt709_to_p3 = rgb_to_rgb_matrix(&REC709, &DISPLAY_P3);

        let m = Self {
            identity: Mat3::IDENTITY,
            bt709_to_bt2020,
            bt2020_to_bt709: invert(&bt709_to_bt2020),
            bt709_to_xyz,
            xyz_to_bt709,
            xyz_to_lms,
            lms_to_xyz,
            bt709_to_lms: xyz_to_lms * bt709_to_xyz,
            lms_to_bt709: xyz_to_bt709 * lms_to_xyz,
            lms_pq_to_ictcp: LMS_PQ_TO_ICTCP,
            ictcp_to_lms_pq: invert(&LMS_PQ_TO_ICTCP),
            bt709_to_p3,
            p3_to_bt709: invert(&bt709_to_p3),
            bt709_to_ap1: rgb_to_rgb_matrix(&REC709, &ACES_AP1),
            bt709_to_ap0: rgb_to_rgb_matrix(&REC709, &ACES_AP0),
        };
        let worst = m.max_roundtrip_error();
        if worst.is_nan() || worst >= ROUNDTRIP_TOLERANCE {
            error!(worst, tolerance = ROUNDTRIP_TOLERANCE, "matrix round trip self check failed");
        }
        m
    }

    /// Largest relative round-trip error over every forward/inverse pair.
    pub fn max_roundtrip_error(&self) -> f64 {
        let pairs = [
            (&self.bt709_to_bt2020, &self.bt2020_to_bt709),
            (&self.bt709_to_xyz, &self.xyz_to_bt709),
            (&self.xyz_to_lms, &self.lms_to_xyz),
            (&self.bt709_to_lms, &self.lms_to_bt709),
            (&self.lms_pq_to_ictcp, &self.ictcp_to_lms_pq),
            (&self.bt709_to_p3, &self.p3_to_bt709),
        ];
        let probes = [
            [1.0, 1.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.25, 7.5, 0.003],
            [10.0, 0.5, 2.0],
        ];
        let mut worst: f64 = 0.0;
        for (fwd, inv) in pairs {
            for p in probes {
                let back = inv * (fwd * p);
                let scale = p.iter().fold(0.0_f64, |a, v| a.max(v.abs()));
                for c in 0..3 {
                    worst = worst.max((back[c] - p[c]).abs() / scale);
                }
            }
        }
        worst
    }

    /// Matrices between two D65-white RGB spaces, or into adapted ACES.
    ///
    /// Each of these maps RGB white to RGB white, so their rows sum to 1.
    pub fn rgb_matrices(&self) -> [(&'static str, &Mat3); 6] {
        [
            ("bt709_to_bt2020", &self.bt709_to_bt2020),
            ("bt2020_to_bt709", &self.bt2020_to_bt709),
            ("bt709_to_p3", &self.bt709_to_p3),
            ("p3_to_bt709", &self.p3_to_bt709),
            ("bt709_to_ap1", &self.bt709_to_ap1),
            ("bt709_to_ap0", &self.bt709_to_ap0),
        ]
    }
}

fn invert(m: &Mat3) -> Mat3 {
    m.inverse().unwrap_or_else(|| {
        error!(matrix = ?m, "singular conversion matrix; using identity");
        Mat3::IDENTITY
    })
}
