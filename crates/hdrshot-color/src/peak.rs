//! Percentile peak estimation.
//!
//! Per-pixel Rec.709 luminance is PQ encoded into a 65536-bin histogram.
//! Walking down from the top bin, the first bin where the accumulated share
//! reaches `100 - percentile` percent is the peak. A handful of specular
//! outliers therefore cannot drag the tone curve down.
//!
//! The result is floored at SDR white so near-SDR content never tone-maps
//! below its own white point.

use hdrshot_core::luminance_rec709;
use hdrshot_transfer::pq::{self, SDR_WHITE_PQ};

/// Number of histogram bins.
pub const HISTOGRAM_BINS: usize = 65536;

/// Default percentile used for the tone-map peak.
pub const DEFAULT_PERCENTILE: f64 = 99.94;

/// Streaming PQ luminance histogram.
#[derive(Debug, Clone)]
pub struct PeakHistogram {
    bins: Vec<u32>,
    total: u64,
}

impl PeakHistogram {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self {
            bins: vec![0; HISTOGRAM_BINS],
            total: 0,
        }
    }

    /// Adds one pixel of linear Rec.709 scRGB.
    #[inline]
    pub fn add_rgb(&mut self, rgb: [f64; 3]) {
        self.add_luminance(luminance_rec709(rgb));
    }

    /// Adds one linear luminance value (scRGB).
    #[inline]
    pub fn add_luminance(&mut self, y: f64) {
        let code = pq::oetf(y.max(0.0));
        let bin = (code.clamp(0.0, 1.0) * (HISTOGRAM_BINS - 1) as f64).round() as usize;
        self.bins[bin] = self.bins[bin].saturating_add(1);
        self.total += 1;
    }

    /// Number of pixels added.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Peak PQ code at `percentile`, floored at SDR white.
    ///
    /// An empty histogram reports the floor.
    pub fn estimate(&self, percentile: f64) -> f64 {
        let floor = *SDR_WHITE_PQ;
        if self.total == 0 {
            return floor;
        }
        let tail = (100.0 - percentile).clamp(0.0, 100.0);
        let total = self.total as f64;
        let mut cumulative = 0.0;
        let mut peak_bin = 0;
        for (i, &count) in self.bins.iter().enumerate().rev() {
            cumulative += count as f64 * 100.0 / total;
            if cumulative >= tail && count > 0 {
                peak_bin = i;
                break;
            }
        }
        let peak = peak_bin as f64 / (HISTOGRAM_BINS - 1) as f64;
        peak.max(floor)
    }
}

impl Default for PeakHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak of interleaved linear Rec.709 RGB samples at the default percentile.
///
/// # Example
///
/// ```rust
/// use hdrshot_color::estimate_peak;
/// use hdrshot_transfer::pq::SDR_WHITE_PQ;
///
/// let black = vec![0.0f32; 3 * 64];
/// assert_eq!(estimate_peak(&black), *SDR_WHITE_PQ);
/// ```
pub fn estimate_peak(samples: &[f32]) -> f64 {
    estimate_peak_with_percentile(samples, DEFAULT_PERCENTILE)
}

/// Peak of interleaved linear Rec.709 RGB samples at `percentile`.
pub fn estimate_peak_with_percentile(samples: &[f32], percentile: f64) -> f64 {
    let mut hist = PeakHistogram::new();
    for px in samples.chunks_exact(3) {
        hist.add_rgb(crate::finite_or_zero([px[0] as f64, px[1] as f64, px[2] as f64]));
    }
    hist.estimate(percentile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_black_is_floor() {
        let samples = vec![0.0f32; 3 * 10_000];
        assert_eq!(estimate_peak(&samples), *SDR_WHITE_PQ);
    }

    #[test]
    fn test_empty_is_floor() {
        assert_eq!(estimate_peak(&[]), *SDR_WHITE_PQ);
    }

    #[test]
    fn test_single_outlier_rejected() {
        // 1 of 10,000 pixels at PQ 1.0 is 0.01%, below the 0.06% tail
        let mut samples = vec![0.0f32; 3 * 10_000];
        samples[0] = 125.0;
        samples[1] = 125.0;
        samples[2] = 125.0;
        let peak = estimate_peak(&samples);
        assert_eq!(peak, *SDR_WHITE_PQ);
    }

    #[test]
    fn test_bright_content_above_floor() {
        let samples = vec![40.0f32; 3 * 1000];
        let peak = estimate_peak(&samples);
        let expected = pq::oetf(40.0);
        assert!((peak - expected).abs() < 2.0 / HISTOGRAM_BINS as f64);
        assert!(peak > *SDR_WHITE_PQ);
    }

    #[test]
    fn test_percentile_picks_tail() {
        // 1% of pixels at 100 scRGB, the rest at 10
        let mut hist = PeakHistogram::new();
        for i in 0..10_000 {
            let y = if i < 100 { 100.0 } else { 10.0 };
            hist.add_luminance(y);
        }
        assert!((hist.estimate(DEFAULT_PERCENTILE) - pq::oetf(100.0)).abs() < 1e-4);
        assert!((hist.estimate(98.0) - pq::oetf(10.0)).abs() < 1e-4);
        assert_eq!(hist.total(), 10_000);
    }

    #[test]
    fn test_nan_samples_ignored() {
        let samples = vec![f32::NAN; 3 * 10];
        assert_eq!(estimate_peak(&samples), *SDR_WHITE_PQ);
    }
}
