//! Nested gamut classification.
//!
//! A pixel is moved into linear Rec.709, then into each candidate space in
//! turn. Narrowest first: Rec.709, P3, BT.2020, AP1, AP0. The first space
//! where all three channels are non-negative contains it; a negative
//! channel means the chromaticity lies outside that space's triangle.
//!
//! Pixels below [`NEAR_BLACK_LUMA`] are always Rec.709: chromaticity is
//! meaningless at the noise floor.

use hdrshot_core::{luminance_rec709, GamutCoverage};
use hdrshot_math::Mat3;
use hdrshot_primaries::{RgbSpace, MATRICES};
use serde::Serialize;

/// Luma below which a pixel counts as Rec.709 (FP16 positive-normal floor).
pub const NEAR_BLACK_LUMA: f64 = 0.0005;

/// Relative slack on the sign test, absorbing matrix round-off.
pub const GAMUT_EPSILON: f64 = 1e-9;

/// Narrowest hull containing a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gamut {
    /// Inside Rec.709.
    Rec709,
    /// Inside Display P3.
    P3,
    /// Inside BT.2020.
    Bt2020,
    /// Inside ACES AP1.
    Ap1,
    /// Inside ACES AP0.
    Ap0,
    /// Outside every tested hull.
    Beyond,
}

impl Gamut {
    /// Bucket index used by [`GamutAccumulator`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Rec709 => 0,
            Self::P3 => 1,
            Self::Bt2020 => 2,
            Self::Ap1 => 3,
            Self::Ap0 => 4,
            Self::Beyond => 5,
        }
    }
}

#[inline]
fn inside(rgb: [f64; 3], tol: f64) -> bool {
    rgb.iter().all(|c| *c >= -tol)
}

/// Classifies a linear Rec.709 pixel.
pub fn classify_rec709(rgb: [f64; 3]) -> Gamut {
    let rgb = crate::finite_or_zero(rgb);
    if luminance_rec709(rgb) < NEAR_BLACK_LUMA {
        return Gamut::Rec709;
    }
    let magnitude = rgb.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    let tol = GAMUT_EPSILON * magnitude;
    if inside(rgb, tol) {
        return Gamut::Rec709;
    }
    let tiers: [(&Mat3, Gamut); 4] = [
        (&MATRICES.bt709_to_p3, Gamut::P3),
        (&MATRICES.bt709_to_bt2020, Gamut::Bt2020),
        (&MATRICES.bt709_to_ap1, Gamut::Ap1),
        (&MATRICES.bt709_to_ap0, Gamut::Ap0),
    ];
    for (m, gamut) in tiers {
        if inside(m * rgb, tol) {
            return gamut;
        }
    }
    Gamut::Beyond
}

/// Classifies a linear pixel expressed in `source` primaries.
pub fn classify(rgb: [f64; 3], source: RgbSpace) -> Gamut {
    classify_rec709(source.to_rec709() * crate::finite_or_zero(rgb))
}

/// Counts classified pixels per bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct GamutAccumulator {
    counts: [u64; 6],
}

impl GamutAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies and counts one linear Rec.709 pixel.
    #[inline]
    pub fn add_rec709(&mut self, rgb: [f64; 3]) -> Gamut {
        let g = classify_rec709(rgb);
        self.add(g);
        g
    }

    /// Counts an already classified pixel.
    #[inline]
    pub fn add(&mut self, gamut: Gamut) {
        self.counts[gamut.index()] += 1;
    }

    /// Pixels counted so far.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Raw counts, ordered as [`Gamut::index`].
    pub fn counts(&self) -> [u64; 6] {
        self.counts
    }

    /// Coverage percentages.
    pub fn coverage(&self) -> GamutCoverage {
        GamutCoverage::from_counts(self.counts)
    }
}
