//! Luminance statistics accumulator.
//!
//! Fed from the same per-pixel loop that builds the output buffer.

use hdrshot_core::{luminance_rec709, LuminanceStats, SCRGB_WHITE_NITS};

/// Running MaxCLL, max, mean and min luminance.
#[derive(Debug, Clone, Copy)]
pub struct LuminanceAccumulator {
    max_cll: f64,
    max_lum: f64,
    min_lum: f64,
    sum_lum: f64,
    count: u64,
}

impl LuminanceAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            max_cll: 0.0,
            max_lum: 0.0,
            min_lum: f64::INFINITY,
            sum_lum: 0.0,
            count: 0,
        }
    }

    /// Adds one linear Rec.709 pixel in scRGB units (1.0 = 80 cd/m2).
    #[inline]
    pub fn add_scrgb(&mut self, rgb: [f64; 3]) {
        self.add_nits(rgb.map(|c| c * SCRGB_WHITE_NITS));
    }

    /// Adds one linear Rec.709 pixel in cd/m2.
    ///
    /// Negative and non-finite channels count as 0.
    #[inline]
    pub fn add_nits(&mut self, rgb: [f64; 3]) {
        let rgb = crate::finite_or_zero(rgb).map(|c| c.max(0.0));
        let lum = luminance_rec709(rgb);
        self.max_cll = self.max_cll.max(rgb[0].max(rgb[1]).max(rgb[2]));
        self.max_lum = self.max_lum.max(lum);
        self.min_lum = self.min_lum.min(lum);
        self.sum_lum += lum;
        self.count += 1;
    }

    /// Pixels added.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Final record, tagged with the output's bit depth and transfer.
    ///
    /// An empty accumulator reports zeros.
    pub fn finish(&self, bit_depth: u8, transfer: u8) -> LuminanceStats {
        let (avg, min) = if self.count == 0 {
            (0.0, 0.0)
        } else {
            (self.sum_lum / self.count as f64, self.min_lum)
        };
        LuminanceStats {
            max_cll: self.max_cll,
            max_luminance: self.max_lum,
            avg_luminance: avg,
            min_luminance: min,
            bit_depth,
            transfer,
        }
    }
}

impl Default for LuminanceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stats() {
        let mut acc = LuminanceAccumulator::new();
        acc.add_scrgb([1.0, 1.0, 1.0]);
        acc.add_scrgb([10.0, 0.0, 0.0]);
        acc.add_scrgb([0.0, 0.0, 0.0]);
        let s = acc.finish(16, 16);
        assert_relative_eq!(s.max_cll, 800.0, epsilon = 1e-9);
        assert_relative_eq!(s.max_luminance, 170.11120, epsilon = 1e-6);
        assert_eq!(s.min_luminance, 0.0);
        assert_relative_eq!(s.avg_luminance, (80.0 + 170.1112) / 3.0, epsilon = 1e-6);
        assert_eq!(s.bit_depth, 16);
    }

    #[test]
    fn test_empty() {
        let s = LuminanceAccumulator::new().finish(16, 16);
        assert_eq!(s.max_luminance, 0.0);
        assert_eq!(s.min_luminance, 0.0);
        assert_eq!(s.avg_luminance, 0.0);
    }
}
