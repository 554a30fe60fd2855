//! # hdrshot-primaries
//!
//! Color primaries, white points, and the precomposed matrices the pipeline
//! runs per pixel.
//!
//! # Included Color Spaces
//!
//! | Color Space | Gamut Size | Role here |
//! |-------------|------------|-----------|
//! | Rec.709 | Small | Working space of every decoder |
//! | Display P3 | Medium | Gamut classification tier |
//! | Rec.2020 | Large | Canonical HDR output primaries |
//! | ACES AP1 | Large | Gamut classification tier |
//! | ACES AP0 | Very Large | Outermost classification tier |
//!
//! # Usage
//!
//! ```rust
//! use hdrshot_primaries::MATRICES;
//!
//! let bt2020 = MATRICES.bt709_to_bt2020 * [1.0, 0.0, 0.0];
//! assert!(bt2020.iter().all(|c| *c > 0.0));
//! ```
//!
//! Matrices are derived from chromaticities in `f64` at first use and then
//! shared read-only; see [`matrices`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod matrices;

pub use matrices::{ColorMatrices, MATRICES};

use hdrshot_math::{adapt_matrix, Mat3, BRADFORD};

/// RGB color space primaries definition (CIE xy).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primaries {
    /// Red primary (x, y) chromaticity
    pub r: (f64, f64),
    /// Green primary (x, y) chromaticity
    pub g: (f64, f64),
    /// Blue primary (x, y) chromaticity
    pub b: (f64, f64),
    /// White point (x, y) chromaticity
    pub w: (f64, f64),
    /// Color space name
    pub name: &'static str,
}

impl Primaries {
    /// White point as XYZ (Y=1).
    #[inline]
    pub fn white_xyz(&self) -> [f64; 3] {
        xy_to_xyz(self.w.0, self.w.1)
    }
}

/// D65 white point chromaticity.
pub const D65_XY: (f64, f64) = (0.31270, 0.32900);

/// ACES white point chromaticity (~D60).
pub const ACES_XY: (f64, f64) = (0.32168, 0.33767);

/// Rec.709 / sRGB primaries (D65).
pub const REC709: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.3000, 0.6000),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Rec.709",
};

/// Display P3 primaries (D65).
pub const DISPLAY_P3: Primaries = Primaries {
    r: (0.6800, 0.3200),
    g: (0.2650, 0.6900),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Display P3",
};

/// Rec.2020 primaries (D65).
pub const REC2020: Primaries = Primaries {
    r: (0.7080, 0.2920),
    g: (0.1700, 0.7970),
    b: (0.1310, 0.0460),
    w: D65_XY,
    name: "Rec.2020",
};

/// ACES AP1 primaries (ACES white).
pub const ACES_AP1: Primaries = Primaries {
    r: (0.7130, 0.2930),
    g: (0.1650, 0.8300),
    b: (0.1280, 0.0440),
    w: ACES_XY,
    name: "ACES AP1",
};

/// ACES AP0 primaries (ACES white).
pub const ACES_AP0: Primaries = Primaries {
    r: (0.7347, 0.2653),
    g: (0.0000, 1.0000),
    b: (0.0001, -0.0770),
    w: ACES_XY,
    name: "ACES AP0",
};

/// RGB spaces a sample buffer may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RgbSpace {
    /// Rec.709 / sRGB primaries.
    Rec709,
    /// Display P3 primaries.
    DisplayP3,
    /// Rec.2020 primaries.
    Rec2020,
}

impl RgbSpace {
    /// Primaries of this space.
    pub const fn primaries(self) -> &'static Primaries {
        match self {
            Self::Rec709 => &REC709,
            Self::DisplayP3 => &DISPLAY_P3,
            Self::Rec2020 => &REC2020,
        }
    }

    /// Maps a cICP colour-primaries code point.
    ///
    /// Unknown codes return `None`; callers fall back to Rec.709.
    pub const fn from_cicp(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Rec709),
            9 => Some(Self::Rec2020),
            12 => Some(Self::DisplayP3),
            _ => None,
        }
    }

    /// Precomposed matrix into linear Rec.709.
    pub fn to_rec709(self) -> &'static Mat3 {
        match self {
            Self::Rec709 => &MATRICES.identity,
            Self::DisplayP3 => &MATRICES.p3_to_bt709,
            Self::Rec2020 => &MATRICES.bt2020_to_bt709,
        }
    }
}

/// Converts xy chromaticity to XYZ (with Y=1).
pub fn xy_to_xyz(x: f64, y: f64) -> [f64; 3] {
    if y.abs() < 1e-12 {
        [0.0; 3]
    } else {
        [x / y, 1.0, (1.0 - x - y) / y]
    }
}

/// Computes the RGB to XYZ matrix for a set of primaries.
///
/// # Algorithm
///
/// 1. Convert xy chromaticities to XYZ (with Y=1)
/// 2. Solve for per-primary scale so RGB (1,1,1) maps to the white point
/// 3. Scale the primary columns
pub fn rgb_to_xyz_matrix(primaries: &Primaries) -> Mat3 {
    let r = xy_to_xyz(primaries.r.0, primaries.r.1);
    let g = xy_to_xyz(primaries.g.0, primaries.g.1);
    let b = xy_to_xyz(primaries.b.0, primaries.b.1);
    let w = primaries.white_xyz();

    let m = Mat3::from_cols([r, g, b]);
    let s = m.inverse().unwrap_or(Mat3::IDENTITY) * w;

    Mat3::from_cols([
        [r[0] * s[0], r[1] * s[0], r[2] * s[0]],
        [g[0] * s[1], g[1] * s[1], g[2] * s[1]],
        [b[0] * s[2], b[1] * s[2], b[2] * s[2]],
    ])
}

/// Computes the XYZ to RGB matrix for a set of primaries.
pub fn xyz_to_rgb_matrix(primaries: &Primaries) -> Mat3 {
    rgb_to_xyz_matrix(primaries)
        .inverse()
        .unwrap_or(Mat3::IDENTITY)
}

/// Computes an RGB to RGB matrix through XYZ.
///
/// When the white points differ a Bradford adaptation is inserted, so
/// source white always maps to destination white (every row sums to 1).
pub fn rgb_to_rgb_matrix(src: &Primaries, dst: &Primaries) -> Mat3 {
    let to_xyz = rgb_to_xyz_matrix(src);
    let from_xyz = xyz_to_rgb_matrix(dst);
    if src.w == dst.w {
        from_xyz * to_xyz
    } else {
        let adapt = adapt_matrix(BRADFORD, src.white_xyz(), dst.white_xyz());
        from_xyz * adapt * to_xyz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rec709_matrix() {
        let m = rgb_to_xyz_matrix(&REC709);
        assert_abs_diff_eq!(m.m[0][0], 0.4124564, epsilon = 1e-4);
        assert_abs_diff_eq!(m.m[1][0], 0.2126729, epsilon = 1e-4);
        assert_abs_diff_eq!(m.m[1][1], 0.7151522, epsilon = 1e-4);
    }

    #[test]
    fn test_white_y_is_one() {
        for p in [REC709, DISPLAY_P3, REC2020, ACES_AP1, ACES_AP0] {
            let white = rgb_to_xyz_matrix(&p) * [1.0, 1.0, 1.0];
            assert_abs_diff_eq!(white[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rgb_to_rgb_identity() {
        let m = rgb_to_rgb_matrix(&REC2020, &REC2020);
        assert!(m.max_abs_diff(&Mat3::IDENTITY) < 1e-12);
    }

    #[test]
    fn test_from_cicp() {
        assert_eq!(RgbSpace::from_cicp(9), Some(RgbSpace::Rec2020));
        assert_eq!(RgbSpace::from_cicp(1), Some(RgbSpace::Rec709));
        assert_eq!(RgbSpace::from_cicp(2), None);
    }
}
