//! # hdrshot-color
//!
//! The per-pixel analysis and tone-mapping stages of the HDR pipeline.
//!
//! - [`ictcp`] - Rec.709 <-> ICtCp through PQ-encoded LMS
//! - [`tonemap`] - Reinhard-style curve in ICtCp intensity with matched chroma
//! - [`peak`] - 65536-bin PQ histogram, percentile peak
//! - [`gamut`] - Nested hull classifier and coverage accumulator
//! - [`luminance`] - MaxCLL / max / average / min luminance accumulator
//!
//! Inputs are linear Rec.709 in scRGB units (1.0 = 80 cd/m2) unless a
//! function says otherwise. Nothing in this crate returns an error:
//! negative light and non-finite values are clamped where they occur.
//!
//! # Example
//!
//! ```rust
//! use hdrshot_color::{estimate_peak, ToneMapper};
//!
//! let samples = vec![0.5f32, 0.5, 0.5, 40.0, 30.0, 20.0];
//! let peak = estimate_peak(&samples);
//! let mapper = ToneMapper::new(peak);
//! let sdr = mapper.map([40.0, 30.0, 20.0]);
//! assert!(sdr.iter().all(|c| *c >= 0.0));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod gamut;
pub mod ictcp;
pub mod luminance;
pub mod peak;
pub mod tonemap;

pub use gamut::{classify, classify_rec709, Gamut, GamutAccumulator};
pub use ictcp::{ictcp_to_rec709, rec709_to_ictcp};
pub use luminance::LuminanceAccumulator;
pub use peak::{estimate_peak, estimate_peak_with_percentile, PeakHistogram, DEFAULT_PERCENTILE};
pub use tonemap::{tonemap, ToneMapper};

/// Replaces NaN and infinities with 0.
#[inline]
pub fn finite_or_zero(rgb: [f64; 3]) -> [f64; 3] {
    rgb.map(|c| if c.is_finite() { c } else { 0.0 })
}
